//! Page population routines.

use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use vitrine_cache::Fetcher;
use vitrine_core::{Collection, Entity, MediaReference, MediaResolver, SizeTier};
use vitrine_render::dom::Element;
use vitrine_render::{Injector, Page, SettleHandle};

use crate::TRACING_TARGET_POPULATE;

/// Gallery items shown on a member page.
const GALLERY_LIMIT: usize = 3;

/// Gallery link target when an image has no resolvable variant.
const GALLERY_PLACEHOLDER: &str = "assets/img/placeholder.jpg";

/// Fetches entities and injects them into page containers.
#[derive(Debug, Clone)]
pub struct Populator {
    fetcher: Fetcher,
    injector: Injector,
    resolver: MediaResolver,
}

impl Populator {
    /// Creates a populator.
    pub fn new(fetcher: Fetcher, injector: Injector, resolver: MediaResolver) -> Self {
        Self {
            fetcher,
            injector,
            resolver,
        }
    }

    /// Renders every entry of `collection` into the container `container_id`.
    ///
    /// Each entry becomes an `article` holding its title, optional image
    /// and the injected rich-text `field`. Returns the settle handles of
    /// the injections.
    pub async fn collection(
        &self,
        page: &Page,
        collection: Collection,
        container_id: &str,
        field: &str,
        image_field: Option<&str>,
    ) -> anyhow::Result<Vec<SettleHandle>> {
        let entities = self
            .fetcher
            .fetch_collection(collection)
            .await
            .with_context(|| format!("failed to fetch {collection}"))?;

        let mut handles = Vec::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            let article_id = format!("{container_id}-{index}");
            let article = self.article(entity, &article_id, image_field);

            page.write()
                .await
                .element_by_id_mut(container_id)
                .with_context(|| format!("page has no container #{container_id}"))?
                .push(article);

            let handle = self
                .injector
                .inject(page, &article_id, &entity.rich_text(field))
                .await?;
            handles.push(handle);
        }

        tracing::info!(
            target: TRACING_TARGET_POPULATE,
            collection = %collection,
            container = %container_id,
            entries = entities.len(),
            "Populated collection"
        );
        Ok(handles)
    }

    /// Renders the detail view of one team member into `container_id`.
    ///
    /// Renders a "Not Found" view instead and returns `None` if no member
    /// matches `identifier`.
    pub async fn member(
        &self,
        page: &Page,
        identifier: &str,
        container_id: &str,
        field: &str,
    ) -> anyhow::Result<Option<SettleHandle>> {
        let Some(member) = self
            .fetcher
            .fetch_member(identifier)
            .await
            .with_context(|| format!("failed to fetch member {identifier}"))?
        else {
            tracing::warn!(
                target: TRACING_TARGET_POPULATE,
                identifier = %identifier,
                "No member matches identifier"
            );
            let not_found = Element::new("section")
                .with_attr("class", "member not-found")
                .with_child(Element::new("h3").with_text("Not Found"))
                .with_child(
                    Element::new("p")
                        .with_text("No member named ")
                        .with_child(Element::new("strong").with_text(identifier)),
                );
            page.write()
                .await
                .element_by_id_mut(container_id)
                .with_context(|| format!("page has no container #{container_id}"))?
                .push(not_found);
            return Ok(None);
        };

        let name = member.str("name").unwrap_or_default();
        let bio_id = format!("{container_id}-bio");

        let mut profile = Element::new("section").with_attr("class", "member");
        if let Some(avatar) = self.image(&member.media("avatar"), name) {
            profile.push(avatar);
        }
        profile.push(Element::new("h2").with_text(name));
        if let Some(position) = member.str("position") {
            profile.push(
                Element::new("p")
                    .with_attr("class", "text-muted")
                    .with_text(position),
            );
        }
        profile.push(Element::new("div").with_attr("id", bio_id.as_str()));
        if let Some(gallery) = self.gallery(&member) {
            profile.push(gallery);
        }

        {
            let mut document = page.write().await;
            document
                .element_by_id_mut(container_id)
                .with_context(|| format!("page has no container #{container_id}"))?
                .push(profile);
        }

        let handle = self
            .injector
            .inject(page, &bio_id, &member.rich_text(field))
            .await?;

        tracing::info!(
            target: TRACING_TARGET_POPULATE,
            identifier = %identifier,
            name = %name,
            "Populated member"
        );
        Ok(Some(handle))
    }

    fn article(&self, entity: &Entity, article_id: &str, image_field: Option<&str>) -> Element {
        let title = entity.first_str(&["name", "title"]).unwrap_or_default();

        let mut article = Element::new("article")
            .with_attr("id", article_id)
            .with_attr("class", "entry");
        if let Some(field) = image_field
            && let Some(image) = self.image(&entity.media(field), title)
        {
            article.push(image);
        }
        if !title.is_empty() {
            article.push(Element::new("h3").with_text(title));
        }
        article
    }

    fn image(&self, reference: &MediaReference, fallback_alt: &str) -> Option<Element> {
        let mut image = self
            .injector
            .renderer()
            .render_image(&self.resolver, reference)?;
        if image.attr("alt").is_none_or(str::is_empty) {
            image.set_attr("alt", fallback_alt);
        }
        Some(image)
    }

    /// Up to three gallery thumbnails linking to the large variant.
    fn gallery(&self, member: &Entity) -> Option<Element> {
        let items = member.get("gallery").and_then(Value::as_array)?;

        let mut row = Element::new("div").with_attr("class", "gallery");
        for item in items.iter().take(GALLERY_LIMIT) {
            let Some(image) = item.get("image").filter(|image| !image.is_null()) else {
                continue;
            };
            let reference = MediaReference::new(image.clone());

            let small = self
                .resolver
                .resolve(&reference, Some(SizeTier::Small))
                .unwrap_or_else(|| GALLERY_PLACEHOLDER.to_owned());
            let large = self
                .resolver
                .resolve(&reference, Some(SizeTier::Large))
                .unwrap_or_else(|| small.clone());
            let caption = reference.caption().unwrap_or("Team member photo");

            let mut thumbnail = Element::new("img").with_attr("alt", caption);
            if let Some(src) = self.resolver.thumbnail_url(&reference) {
                thumbnail.set_attr("src", src);
            }
            row.push(
                Element::new("a")
                    .with_attr("href", large)
                    .with_attr("data-gallery", "member-gallery")
                    .with_child(thumbnail),
            );
        }

        (!row.children().is_empty()).then_some(row)
    }
}

/// Waits for every settle step.
pub async fn settle_all(handles: Vec<SettleHandle>) -> usize {
    let mut settled = 0;
    for handle in handles {
        settled += handle.settled().await;
    }
    settled
}

/// Shares a page between population routines.
pub fn shared(page: vitrine_render::dom::Document) -> Page {
    Arc::new(tokio::sync::RwLock::new(page))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;
    use vitrine_cache::{CacheStore, MemoryStorage};
    use vitrine_core::mock::MockTransport;
    use vitrine_render::dom::Document;
    use vitrine_render::{RenderConfig, RichTextRenderer};

    use super::*;

    const ORIGIN: &str = "http://cms.test";

    fn populator(transport: MockTransport) -> Populator {
        let cache = CacheStore::with_storage(Arc::new(MemoryStorage::new()));
        let fetcher = Fetcher::new(Arc::new(transport), cache, Url::parse(ORIGIN).unwrap());
        let injector = Injector::new(RichTextRenderer::new(RenderConfig::default()));
        Populator::new(fetcher, injector, MediaResolver::new(ORIGIN))
    }

    #[tokio::test(start_paused = true)]
    async fn test_collection_populates_articles() {
        let body = json!({"data": [
            {"id": 1, "attributes": {
                "name": "Lamp",
                "image": {"data": {"attributes": {"url": "/lamp.png"}}},
                "description": [{"type": "paragraph", "children": [{"type": "text", "text": "Bright"}]}]
            }},
            {"id": 2, "name": "Chair", "description": null}
        ]});
        let populator = populator(
            MockTransport::new().json("http://cms.test/api/products?populate=*", &body),
        );
        let page = shared(Document::new().with_container("products"));

        let handles = populator
            .collection(&page, Collection::Products, "products", "description", Some("image"))
            .await
            .unwrap();
        assert_eq!(settle_all(handles).await, 1);

        let document = page.read().await;
        let first = document.element_by_id("products-0").unwrap();
        assert_eq!(first.text_content(), "LampBright");
        assert!(first.to_html().contains("src=\"http://cms.test/lamp.png\""));
        assert!(first.to_html().contains("class=\"aos-animate\""));
        assert_eq!(
            document.element_by_id("products-1").unwrap().text_content(),
            "Chair"
        );
    }

    #[tokio::test]
    async fn test_collection_failure_leaves_page_untouched() {
        let populator = populator(
            MockTransport::new().route("http://cms.test/api/services?populate=*", 500, ""),
        );
        let page = shared(Document::new().with_container("services"));

        let error = populator
            .collection(&page, Collection::Services, "services", "description", None)
            .await
            .unwrap_err();

        assert!(error.to_string().contains("services"));
        assert!(
            page.read()
                .await
                .element_by_id("services")
                .unwrap()
                .children()
                .is_empty()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_member_page() {
        let url = "http://cms.test/api/team-members?populate[0]=avatar&populate[1]=gallery.image&filters[name][$eqi]=jane%20doe";
        let body = json!({"data": [{"id": 3, "attributes": {
            "name": "Jane Doe",
            "position": "Engineer",
            "avatar": {"url": "/jane.png"},
            "description": [{"type": "paragraph", "children": [{"type": "text", "text": "Builds things"}]}],
            "gallery": [
                {"image": {"data": {"attributes": {
                    "url": "/g1.png",
                    "caption": "Launch",
                    "formats": {"thumbnail": {"url": "/g1_t.png"}}
                }}}},
                {"image": {"url": "/g2.png"}},
                {"image": null}
            ]
        }}]});
        let populator = populator(MockTransport::new().json(url, &body));
        let page = shared(Document::new().with_container("member"));

        let handle = populator
            .member(&page, "jane-doe", "member", "description")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(handle.settled().await, 1);

        let html = page.read().await.to_html();
        assert!(html.contains("<h2>Jane Doe</h2>"));
        assert!(html.contains("alt=\"Jane Doe\""));
        assert!(html.contains("<a href=\"http://cms.test/g1.png\" data-gallery=\"member-gallery\"><img alt=\"Launch\" src=\"http://cms.test/g1_t.png\"></a>"));
        assert!(html.contains("<img alt=\"Team member photo\">"));
        assert!(html.contains("Builds things"));
    }

    #[tokio::test]
    async fn test_unknown_member() {
        let url = "http://cms.test/api/team-members?populate[0]=avatar&populate[1]=gallery.image&filters[name][$eqi]=nobody";
        let populator = populator(MockTransport::new().json(url, &json!({"data": []})));
        let page = shared(Document::new().with_container("member"));

        assert!(
            populator
                .member(&page, "nobody", "member", "description")
                .await
                .unwrap()
                .is_none()
        );

        let document = page.read().await;
        let member = document.element_by_id("member").unwrap();
        assert_eq!(member.text_content(), "Not FoundNo member named nobody");
        assert!(member.to_html().contains("<h3>Not Found</h3>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gallery_keeps_items_without_urls() {
        let url = "http://cms.test/api/team-members?populate[0]=avatar&populate[1]=gallery.image&filters[name][$eqi]=sam";
        let body = json!({"data": [{"id": 4, "name": "Sam", "gallery": [
            {"image": {"caption": "Offsite"}}
        ]}]});
        let populator = populator(MockTransport::new().json(url, &body));
        let page = shared(Document::new().with_container("member"));

        populator
            .member(&page, "sam", "member", "description")
            .await
            .unwrap()
            .unwrap()
            .settled()
            .await;

        let html = page.read().await.to_html();
        assert!(html.contains("<a href=\"assets/img/placeholder.jpg\" data-gallery=\"member-gallery\"><img alt=\"Offsite\"></a>"));
    }
}
