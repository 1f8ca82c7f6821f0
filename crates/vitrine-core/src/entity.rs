//! Canonical entity representation.

use derive_more::Deref;
use serde_json::{Map, Value};

use crate::content::ContentBlock;
use crate::media::MediaReference;
use crate::{Error, Result};

/// A content record with its fields flattened.
///
/// The API may return records as `{ id, ...fields }`, as
/// `{ id, attributes: { ...fields } }` or as `{ data: { id, attributes } }`.
/// All three normalize to the same `Entity`; the `id` is kept alongside the
/// fields.
#[derive(Debug, Clone, Default, PartialEq, Deref)]
pub struct Entity {
    id: Option<Value>,
    #[deref]
    fields: Map<String, Value>,
}

impl Entity {
    /// Normalizes a single record. Returns `None` for non-object values.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mut object = value.as_object()?;

        if let Some(inner) = object.get("data").and_then(Value::as_object)
            && inner.contains_key("attributes")
        {
            object = inner;
        }

        let id = object.get("id").filter(|id| !id.is_null()).cloned();
        let fields = match object.get("attributes").and_then(Value::as_object) {
            Some(attributes) => attributes.clone(),
            None => {
                let mut fields = object.clone();
                fields.remove("id");
                fields
            }
        };

        Some(Self { id, fields })
    }

    /// Extracts all records from a `{ data: Entity | Entity[] }` response.
    ///
    /// # Errors
    ///
    /// Returns a decode error if `data` is missing or null.
    pub fn list_from_response(response: &Value) -> Result<Vec<Self>> {
        match response.get("data") {
            Some(Value::Array(items)) => Ok(items.iter().filter_map(Self::from_value).collect()),
            Some(item @ Value::Object(_)) => Ok(Self::from_value(item).into_iter().collect()),
            _ => Err(Error::decode().with_message("response has no `data` member")),
        }
    }

    /// Extracts the first record from a response, if there is one.
    ///
    /// # Errors
    ///
    /// Returns a decode error if `data` is missing or null.
    pub fn first_from_response(response: &Value) -> Result<Option<Self>> {
        Ok(Self::list_from_response(response)?.into_iter().next())
    }

    /// Returns the record identifier.
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Returns a field as a string slice, if it is a string.
    pub fn str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Returns the first field among `fields` holding a non-empty string.
    pub fn first_str(&self, fields: &[&str]) -> Option<&str> {
        fields
            .iter()
            .filter_map(|field| self.str(field))
            .find(|value| !value.is_empty())
    }

    /// Parses a rich-text field. Missing or malformed fields yield no blocks.
    pub fn rich_text(&self, field: &str) -> Vec<ContentBlock> {
        self.fields
            .get(field)
            .map(ContentBlock::parse_all)
            .unwrap_or_default()
    }

    /// Returns a media field. Missing fields yield an empty reference.
    pub fn media(&self, field: &str) -> MediaReference {
        self.fields
            .get(field)
            .cloned()
            .map(MediaReference::new)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{MediaResolver, SizeTier};

    #[test]
    fn test_flat_and_wrapped_shapes_normalize_identically() {
        let flat = Entity::from_value(&json!({"id": 4, "name": "Ada"})).unwrap();
        let wrapped =
            Entity::from_value(&json!({"id": 4, "attributes": {"name": "Ada"}})).unwrap();
        let enveloped =
            Entity::from_value(&json!({"data": {"id": 4, "attributes": {"name": "Ada"}}}))
                .unwrap();

        assert_eq!(flat, wrapped);
        assert_eq!(wrapped, enveloped);
        assert_eq!(flat.id(), Some(&json!(4)));
        assert_eq!(flat.str("name"), Some("Ada"));
        assert!(!flat.contains_key("id"));
    }

    #[test]
    fn test_list_from_response() {
        let response = json!({"data": [
            {"id": 1, "attributes": {"name": "one"}},
            "garbage",
            {"id": 2, "name": "two"}
        ]});

        let entities = Entity::list_from_response(&response).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].str("name"), Some("two"));
    }

    #[test]
    fn test_single_object_response() {
        let response = json!({"data": {"id": 1, "title": "Profile"}});
        let entity = Entity::first_from_response(&response).unwrap().unwrap();
        assert_eq!(entity.str("title"), Some("Profile"));
    }

    #[test]
    fn test_missing_data_is_decode_error() {
        let error = Entity::list_from_response(&json!({"error": "nope"})).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::Decode);

        assert!(Entity::list_from_response(&json!({"data": null})).is_err());
        assert!(Entity::list_from_response(&json!({"data": []})).unwrap().is_empty());
    }

    #[test]
    fn test_field_helpers() {
        let entity = Entity::from_value(&json!({
            "intro_text": "",
            "info_text": "fallback",
            "description": [{"type": "paragraph", "children": [{"type": "text", "text": "d"}]}],
            "image": {"data": {"attributes": {"url": "/i.png"}}}
        }))
        .unwrap();

        assert_eq!(entity.first_str(&["intro_text", "info_text"]), Some("fallback"));
        assert_eq!(entity.rich_text("description").len(), 1);
        assert!(entity.rich_text("missing").is_empty());
        assert!(entity.rich_text("info_text").is_empty());

        let resolver = MediaResolver::new("http://cms");
        assert_eq!(
            resolver
                .resolve(&entity.media("image"), Some(SizeTier::Small))
                .as_deref(),
            Some("http://cms/i.png")
        );
        assert_eq!(resolver.resolve(&entity.media("avatar"), None), None);
    }
}
