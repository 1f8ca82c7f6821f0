//! Span-level content nodes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{node_kind, parse_children};

/// Additive text styling flags.
///
/// Any combination of the decoration flags may co-occur. `code` switches the
/// node to a literal presentation and the other flags are ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextMarks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
}

impl TextMarks {
    fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        let flag = |name: &str| object.get(name).and_then(Value::as_bool).unwrap_or(false);
        Self {
            bold: flag("bold"),
            italic: flag("italic"),
            underline: flag("underline"),
            strikethrough: flag("strikethrough"),
            code: flag("code"),
        }
    }
}

/// A span-level unit inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    /// Styled text leaf.
    Text { value: String, marks: TextMarks },
    /// Hyperlink wrapping further inline content.
    Link {
        url: String,
        children: Vec<InlineNode>,
    },
    /// Any node the model does not recognize, including non-object values.
    Unknown {
        kind: Option<String>,
        children: Option<Vec<InlineNode>>,
    },
}

impl InlineNode {
    /// Creates a plain text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
            marks: TextMarks::default(),
        }
    }

    /// Creates a text node with the given marks.
    pub fn styled(value: impl Into<String>, marks: TextMarks) -> Self {
        Self::Text {
            value: value.into(),
            marks,
        }
    }

    /// Creates a link node.
    pub fn link(url: impl Into<String>, children: Vec<InlineNode>) -> Self {
        Self::Link {
            url: url.into(),
            children,
        }
    }

    /// Parses an inline node from JSON. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Unknown {
                kind: None,
                children: None,
            };
        };

        match node_kind(object) {
            Some("text") => {
                let text = object
                    .get("text")
                    .or_else(|| object.get("value"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Self::Text {
                    value: text.to_owned(),
                    marks: TextMarks::from_object(object),
                }
            }
            Some("link") => Self::Link {
                url: object
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
                children: parse_children(object.get("children")).unwrap_or_default(),
            },
            kind => Self::Unknown {
                kind: kind.map(str::to_owned),
                children: parse_children(object.get("children")),
            },
        }
    }

    /// Concatenates the visible text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value, .. } => out.push_str(value),
            Self::Link { children, .. }
            | Self::Unknown {
                children: Some(children),
                ..
            } => children.iter().for_each(|child| child.collect_text(out)),
            Self::Unknown { children: None, .. } => {}
        }
    }
}

impl<'de> Deserialize<'de> for InlineNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}
