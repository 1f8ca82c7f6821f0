//! Rich-text content model.
//!
//! Content arrives as untrusted JSON authored in the CMS. Parsing is lenient
//! and total: every JSON value maps to some block or inline node, and shapes
//! that cannot be interpreted degrade to the `Unknown` variants so the
//! renderer can still place something in their slot.
//!
//! Two wire dialects are accepted side by side:
//!
//! | concept        | CMS dialect                     | compact dialect   |
//! |----------------|---------------------------------|-------------------|
//! | node tag       | `type`                          | `kind`            |
//! | text payload   | `text`                          | `value`           |
//! | list ordering  | `format: "ordered"`             | `ordered: true`   |
//! | list items     | `children: [{type: list-item}]` | `items: [[...]]`  |

mod block;
mod inline;

pub use block::{BlockKind, ContentBlock, HeadingLevel, MotionHint};
pub use inline::{InlineNode, TextMarks};
use serde_json::Value;

/// Reads the node tag from either dialect.
fn node_kind(object: &serde_json::Map<String, Value>) -> Option<&str> {
    object
        .get("type")
        .or_else(|| object.get("kind"))
        .and_then(Value::as_str)
}

/// Parses an optional `children` array into inline nodes.
fn parse_children(value: Option<&Value>) -> Option<Vec<InlineNode>> {
    value
        .and_then(Value::as_array)
        .map(|nodes| nodes.iter().map(InlineNode::from_value).collect())
}
