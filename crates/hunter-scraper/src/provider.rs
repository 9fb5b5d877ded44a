//! Provider capabilities the pipeline is polymorphic over.
//!
//! Implementations absorb nothing: they return `Err` on upstream failure and
//! the pipeline decides how to degrade.

use async_trait::async_trait;

use crate::error::ScraperError;
use crate::geo::{BoundingBox, LatLng};
use crate::types::{PlaceDetails, RawPlace};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a city (optionally qualified by country) to a viewport.
    /// `Ok(None)` means the provider had no match.
    async fn geocode(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> Result<Option<BoundingBox>, ScraperError>;
}

#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    /// Short provider name used in logs and saved lead sources.
    fn name(&self) -> &'static str;

    /// Free-text search, following continuation tokens up to the page cap.
    async fn text_search(&self, query: &str) -> Result<Vec<RawPlace>, ScraperError>;

    /// Point + radius search with a keyword and optional category tag.
    async fn nearby_search(
        &self,
        center: LatLng,
        radius_meters: u32,
        keyword: &str,
        category_tag: Option<&str>,
    ) -> Result<Vec<RawPlace>, ScraperError>;
}

#[async_trait]
pub trait PlaceDetailsProvider: Send + Sync {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, ScraperError>;
}

/// Per-search tuning shared by the HTTP providers.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Result language passed to the provider.
    pub language: String,
    /// Page cap for one text or nearby search.
    pub max_pages: usize,
    /// Wait before following a continuation token.
    pub page_token_delay: std::time::Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            language: "fi".to_string(),
            max_pages: crate::pagination::DEFAULT_MAX_PAGES,
            page_token_delay: std::time::Duration::from_millis(2000),
        }
    }
}
