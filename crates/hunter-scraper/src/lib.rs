pub mod collector;
pub mod details;
pub mod error;
pub mod geo;
pub mod google;
pub mod grid;
mod http;
pub mod nominatim;
pub mod pagination;
pub mod pipeline;
pub mod provider;
pub mod types;
pub mod website;

pub use collector::{DiscoveredPlace, MergeOutcome, UniquePlaceSet};
pub use details::{apply_details, DetailEnricher, EnrichedPlace};
pub use error::ScraperError;
pub use geo::{BoundingBox, LatLng};
pub use google::GooglePlacesClient;
pub use grid::{tile, GridPoint};
pub use nominatim::NominatimClient;
pub use pagination::collect_pages;
pub use pipeline::{rank_leads, LeadPipeline, LeadQuery, LeadReport, PipelineLimits, RunStats};
pub use provider::{Geocoder, PlaceDetailsProvider, PlaceSearchProvider, SearchSettings};
pub use types::{
    DiscoveryPhase, EnrichedLead, PlaceDetails, RawPlace, SearchPage, WebsiteStatus,
};
pub use website::{
    normalize_url, FetchedPage, HttpPageFetcher, PageFetcher, WebsiteProbe, MAX_PAGE_BYTES,
};
