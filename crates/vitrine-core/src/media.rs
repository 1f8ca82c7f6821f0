//! Media reference resolution.
//!
//! Media fields come in three equivalent shapes:
//!
//! - flat: `{ url, formats: { small: { url } } }`
//! - wrapped: `{ attributes: { url, formats } }`
//! - enveloped: `{ data: { attributes: { url, formats } } }`
//!
//! [`MediaResolver`] unwraps the indirection, prefers the requested size
//! tier, falls back to the base URL and otherwise yields nothing.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::TRACING_TARGET_MEDIA;

/// A named image-resolution variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SizeTier {
    Thumbnail,
    Small,
    Medium,
    Large,
}

impl SizeTier {
    /// Viewports at or below this width load the small tier.
    pub const SMALL_MAX_WIDTH: u32 = 600;
    /// Viewports at or below this width load the medium tier.
    pub const MEDIUM_MAX_WIDTH: u32 = 1200;

    /// Picks the tier matching a viewport width.
    pub fn for_viewport(width: u32) -> Self {
        if width <= Self::SMALL_MAX_WIDTH {
            Self::Small
        } else if width <= Self::MEDIUM_MAX_WIDTH {
            Self::Medium
        } else {
            Self::Large
        }
    }
}

/// A polymorphic media field, kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaReference(Value);

impl MediaReference {
    /// Wraps a raw JSON media field.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the innermost attribute-bearing object.
    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        let object = self.0.as_object()?;

        if let Some(inner) = object
            .get("data")
            .and_then(|data| data.get("attributes"))
            .and_then(Value::as_object)
        {
            return Some(inner);
        }

        if let Some(inner) = object.get("attributes").and_then(Value::as_object) {
            return Some(inner);
        }

        Some(object)
    }

    /// Relative path of the base file, if present.
    pub fn base_path(&self) -> Option<&str> {
        self.attributes()?.get("url")?.as_str()
    }

    /// Relative path of a specific size tier, if present.
    pub fn format_path(&self, tier: SizeTier) -> Option<&str> {
        self.attributes()?
            .get("formats")?
            .get(tier.as_ref())?
            .get("url")?
            .as_str()
    }

    /// Alternative text authored for the media, if any.
    pub fn alternative_text(&self) -> Option<&str> {
        self.string_attribute("alternativeText")
    }

    /// Caption authored for the media, if any.
    pub fn caption(&self) -> Option<&str> {
        self.string_attribute("caption")
    }

    fn string_attribute(&self, name: &str) -> Option<&str> {
        self.attributes()?
            .get(name)?
            .as_str()
            .filter(|s| !s.is_empty())
    }
}

impl From<Value> for MediaReference {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for MediaReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self)
    }
}

/// Builds absolute media URLs against the content API origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    origin: String,
}

impl MediaResolver {
    /// Creates a resolver for the given origin, e.g. `http://localhost:1337`.
    pub fn new(origin: impl Into<String>) -> Self {
        let mut origin = origin.into();
        while origin.ends_with('/') {
            origin.pop();
        }
        Self { origin }
    }

    /// Returns the origin prefix.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolves a media reference to an absolute URL.
    ///
    /// Prefers `formats[tier].url` when a tier is requested and present,
    /// then the base `url`. Malformed shapes resolve to `None`.
    pub fn resolve(&self, reference: &MediaReference, tier: Option<SizeTier>) -> Option<String> {
        let path = tier
            .and_then(|tier| reference.format_path(tier))
            .or_else(|| reference.base_path());

        match path {
            Some(path) => Some(self.absolute(path)),
            None => {
                tracing::trace!(
                    target: TRACING_TARGET_MEDIA,
                    tier = tier.map(<&'static str>::from),
                    "Media reference has no usable url"
                );
                None
            }
        }
    }

    /// Resolves only the thumbnail tier, without falling back to the base file.
    pub fn thumbnail_url(&self, reference: &MediaReference) -> Option<String> {
        reference
            .format_path(SizeTier::Thumbnail)
            .map(|path| self.absolute(path))
    }

    fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ORIGIN: &str = "http://localhost:1337";

    fn resolver() -> MediaResolver {
        MediaResolver::new(ORIGIN)
    }

    #[test]
    fn test_prefers_requested_tier() {
        let media = MediaReference::new(json!({
            "url": "/x.png",
            "formats": {"small": {"url": "/x-small.png"}}
        }));

        assert_eq!(
            resolver().resolve(&media, Some(SizeTier::Small)).as_deref(),
            Some("http://localhost:1337/x-small.png")
        );
        assert_eq!(
            resolver().resolve(&media, Some(SizeTier::Large)).as_deref(),
            Some("http://localhost:1337/x.png")
        );
        assert_eq!(
            resolver().resolve(&media, None).as_deref(),
            Some("http://localhost:1337/x.png")
        );
    }

    #[test]
    fn test_unwraps_indirections() {
        let enveloped = MediaReference::new(json!({
            "data": {"attributes": {"url": "/a.jpg", "formats": {"medium": {"url": "/a-m.jpg"}}}}
        }));
        let wrapped = MediaReference::new(json!({"attributes": {"url": "/b.jpg"}}));

        assert_eq!(
            resolver().resolve(&enveloped, Some(SizeTier::Medium)).as_deref(),
            Some("http://localhost:1337/a-m.jpg")
        );
        assert_eq!(
            resolver().resolve(&wrapped, Some(SizeTier::Medium)).as_deref(),
            Some("http://localhost:1337/b.jpg")
        );
    }

    #[test]
    fn test_malformed_shapes_resolve_to_none() {
        let cases = [
            json!({}),
            json!(null),
            json!("string"),
            json!([1, 2]),
            json!({"url": 7}),
            json!({"data": null}),
            json!({"formats": {"small": "nope"}}),
            json!({"data": {"attributes": []}}),
        ];

        for case in cases {
            let media = MediaReference::new(case);
            assert_eq!(resolver().resolve(&media, Some(SizeTier::Small)), None);
        }
    }

    #[test]
    fn test_thumbnail_does_not_fall_back() {
        let media = MediaReference::new(json!({"url": "/full.jpg"}));
        assert_eq!(resolver().thumbnail_url(&media), None);

        let media = MediaReference::new(json!({
            "url": "/full.jpg",
            "formats": {"thumbnail": {"url": "/thumb.jpg"}}
        }));
        assert_eq!(
            resolver().thumbnail_url(&media).as_deref(),
            Some("http://localhost:1337/thumb.jpg")
        );
    }

    #[test]
    fn test_origin_trailing_slash_is_trimmed() {
        let media = MediaReference::new(json!({"url": "/x.png"}));
        let resolver = MediaResolver::new("http://cms.local/");
        assert_eq!(
            resolver.resolve(&media, None).as_deref(),
            Some("http://cms.local/x.png")
        );
    }

    #[test]
    fn test_size_tier_for_viewport() {
        assert_eq!(SizeTier::for_viewport(375), SizeTier::Small);
        assert_eq!(SizeTier::for_viewport(600), SizeTier::Small);
        assert_eq!(SizeTier::for_viewport(601), SizeTier::Medium);
        assert_eq!(SizeTier::for_viewport(1200), SizeTier::Medium);
        assert_eq!(SizeTier::for_viewport(1920), SizeTier::Large);
        assert_eq!(SizeTier::Thumbnail.as_ref(), "thumbnail");
    }

    #[test]
    fn test_media_texts() {
        let media = MediaReference::new(json!({
            "attributes": {"url": "/x.png", "alternativeText": "Logo", "caption": ""}
        }));
        assert_eq!(media.alternative_text(), Some("Logo"));
        assert_eq!(media.caption(), None);
    }
}
