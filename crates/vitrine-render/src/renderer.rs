//! Rich-text to element tree rendering.

use serde_json::Value;
use vitrine_core::{BlockKind, ContentBlock, InlineNode, MediaReference, MediaResolver, TextMarks};

use crate::dom::{Element, Fragment, Node};
use crate::{RenderConfig, TRACING_TARGET_RENDER};

/// Attribute naming the scroll animation of a block.
pub(crate) const MOTION_ATTR: &str = "data-aos";

/// Attribute carrying the scroll animation duration.
pub(crate) const MOTION_DURATION_ATTR: &str = "data-aos-duration";

/// Builds element trees from rich-text content.
///
/// Rendering never fails: malformed blocks become empty containers and
/// unknown inline nodes are skipped. Content strings only ever become text
/// nodes or attribute values, never markup.
#[derive(Debug, Clone, Default)]
pub struct RichTextRenderer {
    config: RenderConfig,
}

impl RichTextRenderer {
    /// Creates a renderer with the given configuration.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders a list of blocks, one top-level element per block.
    pub fn render(&self, blocks: &[ContentBlock]) -> Fragment {
        let motion = self.config.motion_enabled();
        let fragment: Fragment = blocks
            .iter()
            .map(|block| Node::Element(self.render_block(block, motion)))
            .collect();

        tracing::trace!(
            target: TRACING_TARGET_RENDER,
            blocks = blocks.len(),
            motion,
            "Rendered rich text"
        );
        fragment
    }

    /// Renders a raw rich-text field. Anything but an array renders empty.
    pub fn render_value(&self, value: &Value) -> Fragment {
        if !value.is_array() {
            tracing::debug!(
                target: TRACING_TARGET_RENDER,
                "Rich-text field is not an array, rendering nothing"
            );
        }
        self.render(&ContentBlock::parse_all(value))
    }

    /// Renders inline nodes.
    pub fn render_inline(&self, nodes: &[InlineNode]) -> Fragment {
        let mut fragment = Fragment::new();
        for node in nodes {
            self.render_inline_node(node, &mut fragment);
        }
        fragment
    }

    /// Renders an image for a media field, sized for the viewport.
    ///
    /// Returns `None` when the reference has no usable URL.
    pub fn render_image(
        &self,
        resolver: &MediaResolver,
        reference: &MediaReference,
    ) -> Option<Element> {
        let src = resolver.resolve(reference, Some(self.config.size_tier()))?;
        let alt = reference.alternative_text().unwrap_or_default();

        let mut image = Element::new("img")
            .with_attr("src", src)
            .with_attr("alt", alt)
            .with_attr("loading", "lazy");
        if let Some(caption) = reference.caption() {
            image.set_attr("title", caption);
        }
        Some(image)
    }

    fn render_block(&self, block: &ContentBlock, motion: bool) -> Element {
        let mut element = match &block.kind {
            BlockKind::Heading { level, children } => self.container(level.tag(), children),
            BlockKind::Paragraph { children } => self.container("p", children),
            BlockKind::List { ordered, items } => {
                let mut list = Element::new(if *ordered { "ol" } else { "ul" });
                for item in items {
                    list.push(self.container("li", item));
                }
                list
            }
            BlockKind::Unknown { kind, children } => {
                tracing::debug!(
                    target: TRACING_TARGET_RENDER,
                    kind = kind.as_deref().unwrap_or("<none>"),
                    "Unknown block, rendering as plain container"
                );
                self.container("div", children)
            }
        };

        if motion {
            let hint = block.motion.as_ref();
            let animation = hint
                .and_then(|hint| hint.animation.clone())
                .unwrap_or_else(|| self.config.animation.clone());
            let duration = hint
                .and_then(|hint| hint.duration.clone())
                .unwrap_or_else(|| self.config.animation_duration_ms.to_string());

            element.set_attr(MOTION_ATTR, animation);
            element.set_attr(MOTION_DURATION_ATTR, duration);
        }

        element
    }

    fn container(&self, tag: &str, children: &[InlineNode]) -> Element {
        let mut element = Element::new(tag);
        element.append(self.render_inline(children));
        element
    }

    fn render_inline_node(&self, node: &InlineNode, out: &mut Fragment) {
        match node {
            InlineNode::Text { value, marks } => out.push(text_leaf(value, marks)),
            InlineNode::Link { url, children } => {
                let href = if url.is_empty() { "#" } else { url.as_str() };
                let mut anchor = Element::new("a")
                    .with_attr("href", href)
                    .with_attr("target", "_blank")
                    .with_attr("rel", "noopener noreferrer");
                anchor.append(self.render_inline(children));
                out.push(anchor);
            }
            InlineNode::Unknown {
                children: Some(children),
                ..
            } => {
                for child in children {
                    self.render_inline_node(child, out);
                }
            }
            InlineNode::Unknown {
                kind,
                children: None,
            } => {
                tracing::warn!(
                    target: TRACING_TARGET_RENDER,
                    kind = kind.as_deref().unwrap_or("<none>"),
                    "Skipping unknown inline node"
                );
            }
        }
    }
}

/// A single leaf for a text node; marks become presentation styles.
fn text_leaf(value: &str, marks: &TextMarks) -> Element {
    if marks.code {
        return Element::new("code").with_text(value);
    }

    let mut span = Element::new("span").with_text(value);
    if let Some(style) = text_style(marks) {
        span.set_attr("style", style);
    }
    span
}

fn text_style(marks: &TextMarks) -> Option<String> {
    let mut rules = Vec::with_capacity(3);
    if marks.bold {
        rules.push("font-weight: 600".to_owned());
    }
    if marks.italic {
        rules.push("font-style: italic".to_owned());
    }

    let decorations: Vec<&str> = [
        (marks.underline, "underline"),
        (marks.strikethrough, "line-through"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if !decorations.is_empty() {
        rules.push(format!("text-decoration: {}", decorations.join(" ")));
    }

    (!rules.is_empty()).then(|| rules.join("; "))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vitrine_core::{HeadingLevel, MotionHint};

    use super::*;

    fn renderer() -> RichTextRenderer {
        RichTextRenderer::new(RenderConfig::default().with_viewport_width(500))
    }

    #[test]
    fn test_empty_and_non_array_render_nothing() {
        let renderer = renderer();
        assert!(renderer.render(&[]).is_empty());
        assert!(renderer.render_value(&Value::Null).is_empty());
        assert!(renderer.render_value(&json!({"type": "paragraph"})).is_empty());
    }

    #[test]
    fn test_out_of_range_heading_is_h3() {
        let fragment = renderer().render_value(&json!([
            {"type": "heading", "level": 9, "children": [{"type": "text", "text": "Hi"}]}
        ]));

        assert_eq!(fragment.to_html(), "<h3><span>Hi</span></h3>");
    }

    #[test]
    fn test_bold_and_underline_share_one_leaf() {
        let fragment = renderer().render_inline(&[InlineNode::styled(
            "x",
            TextMarks {
                bold: true,
                underline: true,
                ..TextMarks::default()
            },
        )]);

        assert_eq!(fragment.len(), 1);
        assert_eq!(
            fragment.to_html(),
            "<span style=\"font-weight: 600; text-decoration: underline\">x</span>"
        );
    }

    #[test]
    fn test_all_marks_and_code() {
        let all = TextMarks {
            bold: true,
            italic: true,
            underline: true,
            strikethrough: true,
            code: false,
        };
        assert_eq!(
            text_style(&all).as_deref(),
            Some("font-weight: 600; font-style: italic; text-decoration: underline line-through")
        );

        let code = TextMarks {
            code: true,
            ..all
        };
        assert_eq!(text_leaf("let x", &code).to_html(), "<code>let x</code>");
    }

    #[test]
    fn test_link_is_safe() {
        let fragment = renderer().render_inline(&[
            InlineNode::link("https://example.com", vec![InlineNode::text("go")]),
            InlineNode::link("", vec![InlineNode::text("nowhere")]),
        ]);

        assert_eq!(
            fragment.to_html(),
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\"><span>go</span></a>\
             <a href=\"#\" target=\"_blank\" rel=\"noopener noreferrer\"><span>nowhere</span></a>"
        );
    }

    #[test]
    fn test_markup_in_content_stays_text() {
        let fragment = renderer().render(&[ContentBlock::paragraph(vec![InlineNode::text(
            "<img src=x onerror=alert(1)>",
        )])]);

        let paragraph = fragment.nodes()[0].as_element().unwrap();
        assert!(paragraph.child_elements().all(|e| e.tag() == "span"));
        assert_eq!(
            fragment.to_html(),
            "<p><span>&lt;img src=x onerror=alert(1)&gt;</span></p>"
        );
    }

    #[test]
    fn test_lists_and_unknown_blocks() {
        let fragment = renderer().render_value(&json!([
            {"kind": "list", "ordered": true, "items": [[{"kind": "text", "value": "one"}]]},
            {"type": "list", "format": "unordered", "children": [
                {"type": "list-item", "children": [{"type": "text", "text": "a"}]}
            ]},
            "garbage",
            {"type": "quote", "children": [{"type": "text", "text": "q"}]}
        ]));

        assert_eq!(
            fragment.to_html(),
            "<ol><li><span>one</span></li></ol><ul><li><span>a</span></li></ul><div></div><div><span>q</span></div>"
        );
    }

    #[test]
    fn test_unknown_inline_recurses_or_skips() {
        let fragment = renderer().render_inline(&[
            InlineNode::Unknown {
                kind: Some("mention".into()),
                children: Some(vec![InlineNode::text("inner")]),
            },
            InlineNode::Unknown {
                kind: Some("emoji".into()),
                children: None,
            },
        ]);

        assert_eq!(fragment.to_html(), "<span>inner</span>");
    }

    #[test]
    fn test_motion_attributes_on_wide_viewports() {
        let blocks = [
            ContentBlock::paragraph(vec![InlineNode::text("a")]),
            ContentBlock::heading(HeadingLevel::FALLBACK, vec![]).with_motion(MotionHint {
                animation: Some("zoom-in".into()),
                duration: None,
            }),
        ];

        let wide = RichTextRenderer::default().render(&blocks);
        let first = wide.nodes()[0].as_element().unwrap();
        let second = wide.nodes()[1].as_element().unwrap();
        assert_eq!(first.attr(MOTION_ATTR), Some("fade-up"));
        assert_eq!(first.attr(MOTION_DURATION_ATTR), Some("700"));
        assert_eq!(second.attr(MOTION_ATTR), Some("zoom-in"));
        assert_eq!(second.attr(MOTION_DURATION_ATTR), Some("700"));

        let narrow = renderer().render(&blocks);
        assert!(!narrow.nodes()[0].as_element().unwrap().has_attr(MOTION_ATTR));
    }

    #[test]
    fn test_render_image_uses_viewport_tier() {
        let resolver = MediaResolver::new("http://cms.test");
        let reference = MediaReference::new(json!({
            "data": {"attributes": {
                "url": "/full.png",
                "alternativeText": "Lamp",
                "formats": {"small": {"url": "/small.png"}}
            }}
        }));

        let image = renderer().render_image(&resolver, &reference).unwrap();
        assert_eq!(image.attr("src"), Some("http://cms.test/small.png"));
        assert_eq!(image.attr("alt"), Some("Lamp"));

        let wide = RichTextRenderer::default().render_image(&resolver, &reference).unwrap();
        assert_eq!(wide.attr("src"), Some("http://cms.test/full.png"));

        assert!(renderer().render_image(&resolver, &MediaReference::default()).is_none());
    }
}
