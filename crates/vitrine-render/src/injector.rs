//! Page injection with animation refresh and settle fallback.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use vitrine_core::{BoxedError, ContentBlock};

use crate::dom::{Document, Element};
use crate::renderer::MOTION_ATTR;
use crate::{RichTextRenderer, TRACING_TARGET_INJECT};

/// A page shared between concurrent population routines.
pub type Page = Arc<RwLock<Document>>;

/// Result of a call into the animation subsystem.
pub type RefreshResult = Result<(), BoxedError>;

/// Attribute marking elements injected but not yet settled.
const INJECTED_ATTR: &str = "data-injected";

/// Class forcing an animated element into its final, visible state.
const SETTLED_CLASS: &str = "aos-animate";

/// Delay between the first refresh pair and the final refresh.
const REFRESH_DELAY: Duration = Duration::from_millis(80);

/// Delay before settling when no animation subsystem is present.
const FALLBACK_DELAY: Duration = Duration::from_millis(20);

/// Longest wait for the animation subsystem before settling anyway.
const SETTLE_DEADLINE: Duration = Duration::from_millis(100);

/// Scroll animation subsystem notified after content is injected.
#[async_trait::async_trait]
pub trait MotionRefresher: Send + Sync {
    /// Recomputes animation trigger positions.
    async fn refresh(&self) -> RefreshResult;

    /// Re-scans the page for newly added animated elements.
    async fn refresh_hard(&self) -> RefreshResult;
}

/// Failure to inject content.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// No element with the target id exists on the page.
    #[error("Injection target not found: #{id}")]
    TargetNotFound { id: String },
}

/// Awaitable completion of the settle step.
///
/// Dropping the handle does not cancel the settle step.
#[derive(Debug)]
pub struct SettleHandle {
    task: JoinHandle<usize>,
}

impl SettleHandle {
    /// Waits for the settle step and returns the number of elements settled.
    pub async fn settled(self) -> usize {
        match self.task.await {
            Ok(count) => count,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_INJECT,
                    error = %error,
                    "Settle task failed"
                );
                0
            }
        }
    }

    /// Returns `true` once the settle step has run.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Renders rich text into page containers.
#[derive(Clone)]
pub struct Injector {
    renderer: RichTextRenderer,
    refresher: Option<Arc<dyn MotionRefresher>>,
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("renderer", &self.renderer)
            .field("refresher", &self.refresher.is_some())
            .finish()
    }
}

impl Injector {
    /// Creates an injector without an animation subsystem.
    pub fn new(renderer: RichTextRenderer) -> Self {
        Self {
            renderer,
            refresher: None,
        }
    }

    /// Notifies `refresher` after each injection.
    #[must_use]
    pub fn with_refresher(mut self, refresher: Arc<dyn MotionRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Returns the renderer.
    pub fn renderer(&self) -> &RichTextRenderer {
        &self.renderer
    }

    /// Appends the rendered `blocks` to the element `target_id` of `page`.
    ///
    /// Animated elements are marked as injected and settled by a spawned
    /// task once the animation subsystem has been notified, or after a
    /// short delay without one. An animation subsystem that does not answer
    /// within 100 ms is left running and the content is settled anyway.
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::TargetNotFound`] if the page has no element
    /// with id `target_id`. The page is left unchanged.
    pub async fn inject(
        &self,
        page: &Page,
        target_id: &str,
        blocks: &[ContentBlock],
    ) -> Result<SettleHandle, InjectError> {
        let mut staging = Element::new("div");
        staging.append(self.renderer.render(blocks));

        let mut marked = 0usize;
        staging.for_each_descendant_mut(&mut |element| {
            if element.has_attr(MOTION_ATTR) {
                element.set_attr(INJECTED_ATTR, "1");
                marked += 1;
            }
        });

        {
            let mut document = page.write().await;
            let Some(target) = document.element_by_id_mut(target_id) else {
                tracing::warn!(
                    target: TRACING_TARGET_INJECT,
                    target_id = %target_id,
                    "Injection target not found"
                );
                return Err(InjectError::TargetNotFound {
                    id: target_id.to_owned(),
                });
            };
            target.append(staging.take_children());
        }

        tracing::debug!(
            target: TRACING_TARGET_INJECT,
            target_id = %target_id,
            blocks = blocks.len(),
            marked,
            refresher = self.refresher.is_some(),
            "Injected content"
        );

        let task = tokio::spawn(notify_then_settle(
            page.clone(),
            target_id.to_owned(),
            self.refresher.clone(),
        ));

        Ok(SettleHandle { task })
    }

    /// Boolean form of [`Injector::inject`]: `false` when the target is missing.
    ///
    /// The settle step still runs in the background.
    pub async fn inject_blocks(&self, page: &Page, target_id: &str, blocks: &[ContentBlock]) -> bool {
        self.inject(page, target_id, blocks).await.is_ok()
    }
}

async fn notify_then_settle(
    page: Page,
    target_id: String,
    refresher: Option<Arc<dyn MotionRefresher>>,
) -> usize {
    match refresher {
        Some(refresher) => {
            // Awaited for at most SETTLE_DEADLINE; a stalled notification keeps running detached.
            let mut notify = tokio::spawn(async move { notify(refresher.as_ref()).await });
            tokio::select! {
                joined = &mut notify => match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        tracing::warn!(
                            target: TRACING_TARGET_INJECT,
                            target_id = %target_id,
                            error = %error,
                            "Animation refresh failed, settling now"
                        );
                    }
                    Err(error) => {
                        tracing::warn!(
                            target: TRACING_TARGET_INJECT,
                            target_id = %target_id,
                            error = %error,
                            "Animation refresh aborted, settling now"
                        );
                    }
                },
                () = tokio::time::sleep(SETTLE_DEADLINE) => {
                    tracing::warn!(
                        target: TRACING_TARGET_INJECT,
                        target_id = %target_id,
                        deadline = ?SETTLE_DEADLINE,
                        "Animation refresh did not answer, settling now"
                    );
                }
            }
        }
        None => tokio::time::sleep(FALLBACK_DELAY).await,
    }

    settle(&page, &target_id).await
}

async fn notify(refresher: &dyn MotionRefresher) -> RefreshResult {
    refresher.refresh().await?;
    refresher.refresh_hard().await?;
    tokio::time::sleep(REFRESH_DELAY).await;
    refresher.refresh().await
}

/// Forces every still-marked element under the target into its settled state.
///
/// Idempotent: already settled elements carry no marker and are skipped.
pub(crate) async fn settle(page: &Page, target_id: &str) -> usize {
    let mut document = page.write().await;
    let Some(target) = document.element_by_id_mut(target_id) else {
        tracing::debug!(
            target: TRACING_TARGET_INJECT,
            target_id = %target_id,
            "Settle target disappeared"
        );
        return 0;
    };

    let mut settled = 0usize;
    target.for_each_descendant_mut(&mut |element| {
        if element.remove_attr(INJECTED_ATTR).is_some() {
            element.add_class(SETTLED_CLASS);
            settled += 1;
        }
    });

    tracing::debug!(
        target: TRACING_TARGET_INJECT,
        target_id = %target_id,
        settled,
        "Settled injected content"
    );
    settled
}
