//! Place records as they move through discovery, enrichment, and probing.

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// Which search strategy first produced a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPhase {
    TextSearch,
    GridSearch,
}

impl DiscoveryPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryPhase::TextSearch => "text_search",
            DiscoveryPhase::GridSearch => "grid_search",
        }
    }
}

impl std::fmt::Display for DiscoveryPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place summary returned by a text or nearby search.
///
/// Only `place_id` is guaranteed; everything else depends on the provider
/// and on which endpoint produced the record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPlace {
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub location: Option<LatLng>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
}

impl RawPlace {
    /// Fill fields that are absent on `self` from `other`. Never overwrites.
    pub fn fill_missing_from(&mut self, other: &RawPlace) {
        if self.name.trim().is_empty() && !other.name.trim().is_empty() {
            self.name.clone_from(&other.name);
        }
        fill(&mut self.address, &other.address);
        fill(&mut self.phone, &other.phone);
        fill(&mut self.website, &other.website);
        fill(&mut self.location, &other.location);
        fill(&mut self.rating, &other.rating);
        fill(&mut self.rating_count, &other.rating_count);
        if self.types.is_empty() {
            self.types.clone_from(&other.types);
        }
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(other);
    }
}

/// One page of search results plus the provider's continuation token.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub places: Vec<RawPlace>,
    pub next_page_token: Option<String>,
}

/// Extended fields from a details lookup. All optional; an empty value means
/// the lookup failed or the provider had nothing to add.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Canonical map URL for the place.
    pub url: Option<String>,
    pub types: Option<Vec<String>>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
}

impl PlaceDetails {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == PlaceDetails::default()
    }
}

/// Website health classification, first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebsiteStatus {
    NoWebsite,
    SocialOnly,
    BrokenWebsite,
    NotMobileOptimized,
    MobileFriendly,
}

impl WebsiteStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WebsiteStatus::NoWebsite => "NO_WEBSITE",
            WebsiteStatus::SocialOnly => "SOCIAL_ONLY",
            WebsiteStatus::BrokenWebsite => "BROKEN_WEBSITE",
            WebsiteStatus::NotMobileOptimized => "NOT_MOBILE_OPTIMIZED",
            WebsiteStatus::MobileFriendly => "MOBILE_FRIENDLY",
        }
    }
}

impl std::fmt::Display for WebsiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WebsiteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_uppercase();
        [
            WebsiteStatus::NoWebsite,
            WebsiteStatus::SocialOnly,
            WebsiteStatus::BrokenWebsite,
            WebsiteStatus::NotMobileOptimized,
            WebsiteStatus::MobileFriendly,
        ]
        .into_iter()
        .find(|status| status.as_str() == needle)
        .ok_or_else(|| format!("unknown website status '{s}'"))
    }
}

/// Final output record of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLead {
    /// Display position, `1..=n` after ranking. Not stable across runs.
    pub id: usize,
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub maps_url: Option<String>,
    pub categories: Vec<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub discovery: DiscoveryPhase,
    pub website_status: WebsiteStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_missing_keeps_existing_values() {
        let mut first = RawPlace {
            place_id: "p1".to_string(),
            name: "Pajan Auto".to_string(),
            phone: Some("+358 40 111".to_string()),
            ..RawPlace::default()
        };
        let later = RawPlace {
            place_id: "p1".to_string(),
            name: "PAJAN AUTO OY".to_string(),
            phone: Some("+358 40 999".to_string()),
            address: Some("Hatanpään valtatie 1".to_string()),
            types: vec!["car_repair".to_string()],
            ..RawPlace::default()
        };
        first.fill_missing_from(&later);
        assert_eq!(first.name, "Pajan Auto");
        assert_eq!(first.phone.as_deref(), Some("+358 40 111"));
        assert_eq!(first.address.as_deref(), Some("Hatanpään valtatie 1"));
        assert_eq!(first.types, vec!["car_repair"]);
    }

    #[test]
    fn website_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&WebsiteStatus::NotMobileOptimized).unwrap();
        assert_eq!(json, "\"NOT_MOBILE_OPTIMIZED\"");
        assert_eq!(WebsiteStatus::SocialOnly.to_string(), "SOCIAL_ONLY");
    }

    #[test]
    fn empty_details_detected() {
        assert!(PlaceDetails::default().is_empty());
        let details = PlaceDetails {
            phone: Some("03 123".to_string()),
            ..PlaceDetails::default()
        };
        assert!(!details.is_empty());
    }

    #[test]
    fn website_status_parses_wire_names() {
        assert_eq!(
            "broken_website".parse::<WebsiteStatus>(),
            Ok(WebsiteStatus::BrokenWebsite)
        );
        assert!("PARKED".parse::<WebsiteStatus>().is_err());
    }
}
