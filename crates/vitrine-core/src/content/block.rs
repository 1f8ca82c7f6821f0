//! Block-level content units.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{InlineNode, node_kind, parse_children};
use crate::TRACING_TARGET_CONTENT;

/// Heading level in the range `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Level used when the declared one is missing or out of range.
    pub const FALLBACK: Self = Self(3);

    /// Returns the level if it is within `1..=6`.
    pub fn new(level: i64) -> Option<Self> {
        (1..=6).contains(&level).then(|| Self(level as u8))
    }

    /// Returns the declared level, or [`Self::FALLBACK`] when out of range.
    pub fn from_declared(level: Option<i64>) -> Self {
        level.and_then(Self::new).unwrap_or(Self::FALLBACK)
    }

    /// Returns the numeric level.
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Returns the matching element tag name.
    pub fn tag(self) -> &'static str {
        match self.0 {
            1 => "h1",
            2 => "h2",
            3 => "h3",
            4 => "h4",
            5 => "h5",
            _ => "h6",
        }
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Per-block overrides for the scroll animation attributes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MotionHint {
    /// Animation name, e.g. `zoom-in-up`.
    pub animation: Option<String>,
    /// Animation duration in milliseconds, kept verbatim.
    pub duration: Option<String>,
}

impl MotionHint {
    fn from_object(object: &serde_json::Map<String, Value>) -> Option<Self> {
        let animation = object.get("aos").and_then(Value::as_str).map(str::to_owned);
        let duration = object.get("aosDuration").and_then(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        (animation.is_some() || duration.is_some()).then_some(Self {
            animation,
            duration,
        })
    }
}

/// Structural shape of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Heading {
        level: HeadingLevel,
        children: Vec<InlineNode>,
    },
    Paragraph {
        children: Vec<InlineNode>,
    },
    List {
        ordered: bool,
        items: Vec<Vec<InlineNode>>,
    },
    /// Unrecognized or malformed block; still renders its children.
    Unknown {
        kind: Option<String>,
        children: Vec<InlineNode>,
    },
}

/// A structural content unit (heading, paragraph, list).
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub motion: Option<MotionHint>,
}

impl From<BlockKind> for ContentBlock {
    fn from(kind: BlockKind) -> Self {
        Self { kind, motion: None }
    }
}

impl ContentBlock {
    /// Creates a heading block.
    pub fn heading(level: HeadingLevel, children: Vec<InlineNode>) -> Self {
        BlockKind::Heading { level, children }.into()
    }

    /// Creates a paragraph block.
    pub fn paragraph(children: Vec<InlineNode>) -> Self {
        BlockKind::Paragraph { children }.into()
    }

    /// Creates a list block.
    pub fn list(ordered: bool, items: Vec<Vec<InlineNode>>) -> Self {
        BlockKind::List { ordered, items }.into()
    }

    /// Attaches per-block motion overrides.
    #[must_use]
    pub fn with_motion(mut self, motion: MotionHint) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Parses a rich-text field. Anything but a JSON array yields no blocks.
    pub fn parse_all(value: &Value) -> Vec<Self> {
        value
            .as_array()
            .map(|blocks| blocks.iter().map(Self::from_value).collect())
            .unwrap_or_default()
    }

    /// Parses a single block from JSON. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            tracing::debug!(
                target: TRACING_TARGET_CONTENT,
                "Block is not an object, degrading to empty container"
            );
            return BlockKind::Unknown {
                kind: None,
                children: Vec::new(),
            }
            .into();
        };

        let children = || parse_children(object.get("children")).unwrap_or_default();
        let kind = match node_kind(object) {
            Some("heading") => BlockKind::Heading {
                level: HeadingLevel::from_declared(object.get("level").and_then(Value::as_i64)),
                children: children(),
            },
            Some("paragraph") => BlockKind::Paragraph {
                children: children(),
            },
            Some("list") => BlockKind::List {
                ordered: is_ordered(object),
                items: list_items(object),
            },
            other => BlockKind::Unknown {
                kind: other.map(str::to_owned),
                children: children(),
            },
        };

        Self {
            kind,
            motion: MotionHint::from_object(object),
        }
    }

    /// Concatenates the visible text of the block.
    pub fn plain_text(&self) -> String {
        fn join(nodes: &[InlineNode]) -> String {
            nodes.iter().map(InlineNode::plain_text).collect()
        }

        match &self.kind {
            BlockKind::Heading { children, .. }
            | BlockKind::Paragraph { children }
            | BlockKind::Unknown { children, .. } => join(children),
            BlockKind::List { items, .. } => items
                .iter()
                .map(|item| join(item.as_slice()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

fn is_ordered(object: &serde_json::Map<String, Value>) -> bool {
    if let Some(ordered) = object.get("ordered").and_then(Value::as_bool) {
        return ordered;
    }
    object.get("format").and_then(Value::as_str) == Some("ordered")
}

fn list_items(object: &serde_json::Map<String, Value>) -> Vec<Vec<InlineNode>> {
    if let Some(items) = object.get("items").and_then(Value::as_array) {
        return items
            .iter()
            .map(|item| {
                item.as_array()
                    .map(|nodes| nodes.iter().map(InlineNode::from_value).collect())
                    .unwrap_or_default()
            })
            .collect();
    }

    object
        .get("children")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| parse_children(item.get("children")).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default()
}
