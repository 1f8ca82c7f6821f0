//! Content API collections and their cache keys.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use url::Url;

use crate::Result;

/// Characters `encodeURIComponent` leaves untouched, removed from the set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// An entity collection exposed by the content API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Collection {
    CompanyProfile,
    TeamMembers,
    Products,
    Services,
    Initiatives,
    Testimonials,
    Innovators,
}

impl Collection {
    /// Every collection, in page population order.
    pub const ALL: [Self; 7] = [
        Self::CompanyProfile,
        Self::TeamMembers,
        Self::Products,
        Self::Initiatives,
        Self::Services,
        Self::Testimonials,
        Self::Innovators,
    ];

    /// API path segment under `/api/`.
    pub fn path(self) -> &'static str {
        self.into()
    }

    /// Fixed session storage key for the collection response.
    pub const fn cache_key(self) -> &'static str {
        match self {
            Self::CompanyProfile => "company_profile",
            Self::TeamMembers => "team_members",
            Self::Products => "products",
            Self::Services => "services",
            Self::Initiatives => "initiatives",
            Self::Testimonials => "testimonials",
            Self::Innovators => "innovators",
        }
    }

    /// Fixed cache keys of all collections.
    pub fn cache_keys() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Self::cache_key)
    }

    /// Full endpoint URL with every relation populated.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `origin` cannot be a base URL.
    pub fn endpoint(self, origin: &Url) -> Result<Url> {
        let mut url = origin.join(&format!("/api/{}", self.path()))?;
        url.set_query(Some("populate=*"));
        Ok(url)
    }
}

/// Lookup of a single team member by name.
///
/// Identifiers come from page URLs where spaces were replaced by dashes;
/// the dashes are turned back into spaces before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberLookup {
    name: String,
    encoded: String,
}

impl MemberLookup {
    /// Creates a lookup from a page identifier such as `jane-doe`.
    pub fn from_identifier(identifier: &str) -> Self {
        let name = identifier.replace('-', " ");
        let encoded = utf8_percent_encode(&name, COMPONENT).to_string();
        Self { name, encoded }
    }

    /// Name searched for, with dashes replaced by spaces.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deterministic encoding of the name.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Session storage key of the detail record.
    pub fn cache_key(&self) -> String {
        format!("member_{}", self.encoded)
    }

    /// Detail endpoint filtering on the name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `origin` cannot be a base URL.
    pub fn endpoint(&self, origin: &Url) -> Result<Url> {
        let mut url = origin.join(&format!("/api/{}", Collection::TeamMembers.path()))?;
        url.set_query(Some(&format!(
            "populate[0]=avatar&populate[1]=gallery.image&filters[name][$eqi]={}",
            self.encoded
        )));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_paths_and_keys() {
        assert_eq!(Collection::CompanyProfile.path(), "company-profile");
        assert_eq!(Collection::TeamMembers.path(), "team-members");
        assert_eq!(Collection::CompanyProfile.cache_key(), "company_profile");
        assert_eq!(Collection::cache_keys().count(), 7);
        assert_eq!(
            Collection::from_str("innovators").unwrap(),
            Collection::Innovators
        );
    }

    #[test]
    fn test_endpoint() {
        let origin = Url::parse("http://localhost:1337").unwrap();
        let url = Collection::Products.endpoint(&origin).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1337/api/products?populate=*");
    }

    #[test]
    fn test_member_lookup_encoding() {
        let lookup = MemberLookup::from_identifier("Jane-O'Neil-Doe");
        assert_eq!(lookup.name(), "Jane O'Neil Doe");
        assert_eq!(lookup.encoded(), "Jane%20O'Neil%20Doe");
        assert_eq!(lookup.cache_key(), "member_Jane%20O'Neil%20Doe");

        let same = MemberLookup::from_identifier("Jane O'Neil Doe");
        assert_eq!(lookup.cache_key(), same.cache_key());
    }

    #[test]
    fn test_member_endpoint() {
        let origin = Url::parse("http://localhost:1337").unwrap();
        let url = MemberLookup::from_identifier("ada").endpoint(&origin).unwrap();
        assert_eq!(url.path(), "/api/team-members");
        assert!(url.query().unwrap().ends_with("filters[name][$eqi]=ada"));
    }
}
