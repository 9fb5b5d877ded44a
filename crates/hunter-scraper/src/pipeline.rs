//! Lead discovery pipeline.
//!
//! `GeocodeLookup → PrimarySearch → [ceiling check] → GridSearch → Details →
//! WebsiteProbe → Ranking`. Discovery is sequential; details and probing run
//! as two bounded worker pools. Only a missing provider key fails a run
//! (at construction); every upstream error degrades to missing data.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use hunter_core::{AppConfig, LookupTables, PlacesProvider};
use serde::Serialize;

use crate::collector::{DiscoveredPlace, UniquePlaceSet};
use crate::details::{DetailEnricher, EnrichedPlace};
use crate::error::ScraperError;
use crate::geo::BoundingBox;
use crate::google::GooglePlacesClient;
use crate::grid::tile;
use crate::nominatim::NominatimClient;
use crate::provider::{Geocoder, PlaceDetailsProvider, PlaceSearchProvider, SearchSettings};
use crate::types::{DiscoveryPhase, EnrichedLead, WebsiteStatus};
use crate::website::{HttpPageFetcher, PageFetcher, WebsiteProbe};

/// Cost ceilings and worker budgets for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineLimits {
    pub max_grid_points: usize,
    pub max_results: usize,
    pub grid_radius_meters: u32,
    pub details_workers: usize,
    pub probe_workers: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_grid_points: 9,
            max_results: 200,
            grid_radius_meters: 2000,
            details_workers: 5,
            probe_workers: 5,
        }
    }
}

impl PipelineLimits {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_grid_points: config.max_grid_points,
            max_results: config.max_results,
            grid_radius_meters: config.grid_radius_meters,
            details_workers: config.details_workers,
            probe_workers: config.probe_workers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadQuery {
    pub business_type: String,
    pub city: String,
}

impl LeadQuery {
    #[must_use]
    pub fn new(business_type: &str, city: &str) -> Self {
        Self {
            business_type: business_type.trim().to_owned(),
            city: city.trim().to_owned(),
        }
    }

    /// Query string for the primary text search.
    #[must_use]
    pub fn text_query(&self) -> String {
        format!("{} {}", self.business_type, self.city)
    }
}

/// Counters for one run, logged at the end and returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub geocoded: bool,
    pub tiles_planned: usize,
    pub tiles_searched: usize,
    pub text_search_results: usize,
    pub grid_search_results: usize,
    pub unique_places: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub ceiling_reached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadReport {
    pub leads: Vec<EnrichedLead>,
    pub stats: RunStats,
}

pub struct LeadPipeline {
    geocoder: Arc<dyn Geocoder>,
    search: Arc<dyn PlaceSearchProvider>,
    details: DetailEnricher,
    probe: WebsiteProbe,
    lookups: Arc<LookupTables>,
    limits: PipelineLimits,
    country: Option<String>,
}

impl LeadPipeline {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        search: Arc<dyn PlaceSearchProvider>,
        details: Arc<dyn PlaceDetailsProvider>,
        fetcher: Arc<dyn PageFetcher>,
        lookups: Arc<LookupTables>,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            geocoder,
            search,
            details: DetailEnricher::new(details),
            probe: WebsiteProbe::new(fetcher, Arc::clone(&lookups)),
            lookups,
            limits,
            country: None,
        }
    }

    /// Qualify geocoding lookups with a country name.
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        let country = country.into();
        self.country = Some(country).filter(|c| !c.trim().is_empty());
        self
    }

    /// Wire the configured provider's HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingApiKey`] when the Google provider is
    /// selected without `GOOGLE_PLACES_API_KEY`, or [`ScraperError::Http`] if
    /// an HTTP client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        lookups: Arc<LookupTables>,
    ) -> Result<Self, ScraperError> {
        let settings = SearchSettings {
            language: config.search_language.clone(),
            max_pages: config.max_pages,
            page_token_delay: Duration::from_millis(config.page_token_delay_ms),
        };
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(
            config.probe_timeout_secs,
            &config.user_agent,
        )?);
        let limits = PipelineLimits::from_config(config);

        let pipeline = match config.places_provider {
            PlacesProvider::Google => {
                let api_key = config.google_places_api_key.as_deref().ok_or_else(|| {
                    ScraperError::MissingApiKey {
                        provider: PlacesProvider::Google.to_string(),
                    }
                })?;
                let client = Arc::new(GooglePlacesClient::new(
                    api_key,
                    config.request_timeout_secs,
                    &config.user_agent,
                    settings,
                )?);
                Self::new(
                    client.clone(),
                    client.clone(),
                    client,
                    fetcher,
                    lookups,
                    limits,
                )
            }
            PlacesProvider::Nominatim => {
                let client = Arc::new(NominatimClient::new(
                    config.request_timeout_secs,
                    &config.user_agent,
                    settings,
                )?);
                Self::new(
                    client.clone(),
                    client.clone(),
                    client,
                    fetcher,
                    lookups,
                    limits,
                )
            }
        };
        Ok(pipeline.with_country(config.search_country.clone()))
    }

    /// Provider name, e.g. `"google"`.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.search.name()
    }

    #[must_use]
    pub fn limits(&self) -> PipelineLimits {
        self.limits
    }

    /// Ranked leads for `business_type` in `city`.
    pub async fn get_leads(&self, business_type: &str, city: &str) -> Vec<EnrichedLead> {
        self.run(&LeadQuery::new(business_type, city)).await.leads
    }

    /// Run the full pipeline. Each call owns a fresh dedup set and counters.
    pub async fn run(&self, query: &LeadQuery) -> LeadReport {
        let mut stats = RunStats::default();
        let mut places = UniquePlaceSet::new(self.limits.max_results);

        let bbox = self.resolve_viewport(&query.city).await;
        stats.geocoded = bbox.is_some();

        self.primary_search(query, &mut places, &mut stats).await;

        if places.is_full() {
            stats.ceiling_reached = true;
            tracing::info!(
                unique = places.len(),
                max_results = self.limits.max_results,
                "result ceiling reached by text search; skipping grid search"
            );
        } else if let Some(bbox) = bbox {
            self.grid_search(query, &bbox, &mut places, &mut stats).await;
        } else {
            tracing::info!(city = %query.city, "no viewport for city; grid search unavailable");
        }

        stats.unique_places = places.len();
        let enriched = self.enrich_all(places.into_places()).await;
        let mut leads = self.probe_all(enriched).await;
        rank_leads(&mut leads);

        tracing::info!(
            business_type = %query.business_type,
            city = %query.city,
            provider = self.search.name(),
            leads = leads.len(),
            tiles_searched = stats.tiles_searched,
            ceiling_reached = stats.ceiling_reached,
            "lead pipeline finished"
        );

        LeadReport { leads, stats }
    }

    async fn resolve_viewport(&self, city: &str) -> Option<BoundingBox> {
        match self.geocoder.geocode(city, self.country.as_deref()).await {
            Ok(bbox) => bbox,
            Err(e) => {
                tracing::warn!(city, error = %e, "geocoding failed; grid search unavailable");
                None
            }
        }
    }

    async fn primary_search(
        &self,
        query: &LeadQuery,
        places: &mut UniquePlaceSet,
        stats: &mut RunStats,
    ) {
        let text_query = query.text_query();
        let results = match self.search.text_search(&text_query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(query = %text_query, error = %e, "text search failed; continuing");
                Vec::new()
            }
        };
        stats.text_search_results = results.len();
        let outcome = places.merge(results, DiscoveryPhase::TextSearch);
        stats.duplicates += outcome.duplicates;
        stats.rejected += outcome.rejected;
        tracing::info!(
            query = %text_query,
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "text search merged"
        );
    }

    async fn grid_search(
        &self,
        query: &LeadQuery,
        bbox: &BoundingBox,
        places: &mut UniquePlaceSet,
        stats: &mut RunStats,
    ) {
        let radius = self.limits.grid_radius_meters;
        let tiles = tile(bbox, radius, self.limits.max_grid_points);
        let category_tag = self.lookups.category_tag(&query.business_type);
        stats.tiles_planned = tiles.len();
        tracing::info!(
            tiles = tiles.len(),
            radius_meters = radius,
            category_tag = category_tag.unwrap_or("-"),
            "starting grid search"
        );

        for (idx, center) in tiles.iter().enumerate() {
            let results = match self
                .search
                .nearby_search(*center, radius, &query.business_type, category_tag)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(tile = idx, error = %e, "nearby search failed; skipping tile");
                    Vec::new()
                }
            };
            stats.tiles_searched += 1;
            stats.grid_search_results += results.len();
            let outcome = places.merge(results, DiscoveryPhase::GridSearch);
            stats.duplicates += outcome.duplicates;
            stats.rejected += outcome.rejected;
            tracing::debug!(
                tile = idx,
                inserted = outcome.inserted,
                duplicates = outcome.duplicates,
                unique = places.len(),
                "tile merged"
            );

            if places.is_full() {
                stats.ceiling_reached = true;
                tracing::info!(
                    tile = idx,
                    max_results = self.limits.max_results,
                    "result ceiling reached; stopping grid search"
                );
                break;
            }
        }
    }

    async fn enrich_all(&self, places: Vec<DiscoveredPlace>) -> Vec<EnrichedPlace> {
        stream::iter(places)
            .map(|discovered| self.details.enrich_place(discovered))
            .buffer_unordered(self.limits.details_workers.max(1))
            .collect()
            .await
    }

    async fn probe_all(&self, places: Vec<EnrichedPlace>) -> Vec<EnrichedLead> {
        stream::iter(places)
            .map(|enriched| async move {
                let status = self.probe.classify(enriched.place.website.as_deref()).await;
                into_lead(enriched, status)
            })
            .buffer_unordered(self.limits.probe_workers.max(1))
            .collect()
            .await
    }
}

fn into_lead(enriched: EnrichedPlace, website_status: WebsiteStatus) -> EnrichedLead {
    let EnrichedPlace {
        place,
        phase,
        maps_url,
    } = enriched;
    EnrichedLead {
        id: 0,
        place_id: place.place_id,
        name: place.name,
        address: place.address,
        phone: place.phone,
        website: place.website,
        maps_url,
        categories: place.types,
        rating: place.rating,
        rating_count: place.rating_count,
        discovery: phase,
        website_status,
    }
}

/// Stable partition with `NoWebsite` leads first, then display ids `1..=n`.
pub fn rank_leads(leads: &mut [EnrichedLead]) {
    leads.sort_by_key(|lead| lead.website_status != WebsiteStatus::NoWebsite);
    for (idx, lead) in leads.iter_mut().enumerate() {
        lead.id = idx + 1;
    }
}
