//! OpenStreetMap Nominatim client.
//!
//! Keyless, so it needs no configuration beyond a descriptive `User-Agent`.
//! The public instance allows one request per second; every call waits on
//! a shared throttle first. Nominatim has no continuation tokens, so each
//! search is a single page.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ScraperError;
use crate::geo::{BoundingBox, LatLng, DEFAULT_VIEWPORT_MARGIN_DEGREES};
use crate::http::{build_client, endpoint_url, get_json, parse_base_url};
use crate::provider::{Geocoder, PlaceDetailsProvider, PlaceSearchProvider, SearchSettings};
use crate::types::{PlaceDetails, RawPlace};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);
const SEARCH_LIMIT: &str = "50";

pub struct NominatimClient {
    client: Client,
    base_url: Url,
    settings: SearchSettings,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimClient {
    /// Creates a client pointed at the public Nominatim instance.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        settings: SearchSettings,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(timeout_secs, user_agent, settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (self-hosted instance or wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] or [`ScraperError::InvalidBaseUrl`].
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        settings: SearchSettings,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            settings,
            min_interval: DEFAULT_MIN_INTERVAL,
            last_request: Mutex::new(None),
        })
    }

    /// Overrides the minimum spacing between requests. Zero disables throttling.
    #[must_use]
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    async fn throttle(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn fetch_places(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<NominatimPlace>, ScraperError> {
        let mut url = endpoint_url(&self.base_url, path, params)?;
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("extratags", "1")
            .append_pair("accept-language", &self.settings.language);
        self.throttle().await;
        get_json(&self.client, url, path).await
    }
}

#[async_trait]
impl PlaceSearchProvider for NominatimClient {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn text_search(&self, query: &str) -> Result<Vec<RawPlace>, ScraperError> {
        let places = self
            .fetch_places("search", &[("q", query), ("limit", SEARCH_LIMIT)])
            .await?;
        Ok(places.into_iter().filter_map(NominatimPlace::into_raw).collect())
    }

    /// Bounded viewbox search around `center`. Nominatim has no category
    /// filter on free-text search, so `category_tag` is not sent.
    async fn nearby_search(
        &self,
        center: LatLng,
        radius_meters: u32,
        keyword: &str,
        _category_tag: Option<&str>,
    ) -> Result<Vec<RawPlace>, ScraperError> {
        let bbox = BoundingBox::around_meters(center, radius_meters);
        let viewbox = format!(
            "{},{},{},{}",
            bbox.southwest.lng, bbox.northeast.lat, bbox.northeast.lng, bbox.southwest.lat
        );
        let places = self
            .fetch_places(
                "search",
                &[
                    ("q", keyword),
                    ("viewbox", viewbox.as_str()),
                    ("bounded", "1"),
                    ("limit", SEARCH_LIMIT),
                ],
            )
            .await?;
        Ok(places.into_iter().filter_map(NominatimPlace::into_raw).collect())
    }
}

#[async_trait]
impl PlaceDetailsProvider for NominatimClient {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, ScraperError> {
        let Some(osm_id) = lookup_id(place_id) else {
            tracing::debug!(place_id, "not an OSM place id; skipping lookup");
            return Ok(PlaceDetails::default());
        };
        let places = self
            .fetch_places("lookup", &[("osm_ids", osm_id.as_str())])
            .await?;
        Ok(places
            .into_iter()
            .next()
            .map(NominatimPlace::into_details)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> Result<Option<BoundingBox>, ScraperError> {
        let mut params = vec![("city", city), ("limit", "1")];
        if let Some(country) = country.filter(|c| !c.trim().is_empty()) {
            params.push(("country", country));
        }
        let places = self.fetch_places("search", &params).await?;
        Ok(places.into_iter().next().and_then(|p| p.bounding_box()))
    }
}

/// `"node/123"` → `"N123"` for the `/lookup` endpoint.
fn lookup_id(place_id: &str) -> Option<String> {
    let (osm_type, osm_id) = place_id.split_once('/')?;
    let prefix = match osm_type {
        "node" => 'N',
        "way" => 'W',
        "relation" => 'R',
        _ => return None,
    };
    if osm_id.is_empty() || !osm_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{prefix}{osm_id}"))
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    osm_type: Option<String>,
    osm_id: Option<u64>,
    lat: Option<String>,
    lon: Option<String>,
    name: Option<String>,
    display_name: Option<String>,
    category: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    /// `[min_lat, max_lat, min_lon, max_lon]` as strings.
    boundingbox: Option<Vec<String>>,
    extratags: Option<HashMap<String, String>>,
}

impl NominatimPlace {
    fn place_id(&self) -> Option<String> {
        let osm_type = self.osm_type.as_deref().filter(|t| !t.is_empty())?;
        Some(format!("{osm_type}/{}", self.osm_id?))
    }

    fn label(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.display_name
                    .as_deref()
                    .and_then(|d| d.split(',').next())
            })
            .unwrap_or_default()
            .trim()
            .to_owned()
    }

    fn tag(&self, keys: &[&str]) -> Option<String> {
        let tags = self.extratags.as_ref()?;
        keys.iter()
            .find_map(|k| tags.get(*k))
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn types(&self) -> Vec<String> {
        [self.category.as_ref(), self.kind.as_ref()]
            .into_iter()
            .flatten()
            .filter(|t| !t.is_empty())
            .cloned()
            .collect()
    }

    fn location(&self) -> Option<LatLng> {
        let lat = self.lat.as_deref()?.parse().ok()?;
        let lng = self.lon.as_deref()?.parse().ok()?;
        Some(LatLng::new(lat, lng))
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let parsed = self.boundingbox.as_ref().and_then(|raw| {
            let values: Vec<f64> = raw.iter().filter_map(|v| v.parse().ok()).collect();
            match values.as_slice() {
                [min_lat, max_lat, min_lng, max_lng] => BoundingBox::new(
                    LatLng::new(*max_lat, *max_lng),
                    LatLng::new(*min_lat, *min_lng),
                ),
                _ => None,
            }
        });
        parsed.or_else(|| {
            self.location()
                .map(|p| BoundingBox::around(p, DEFAULT_VIEWPORT_MARGIN_DEGREES))
        })
    }

    fn maps_url(&self) -> Option<String> {
        self.place_id()
            .map(|id| format!("https://www.openstreetmap.org/{id}"))
    }

    fn into_raw(self) -> Option<RawPlace> {
        let place_id = self.place_id()?;
        Some(RawPlace {
            name: self.label(),
            address: self.display_name.clone(),
            phone: self.tag(&["phone", "contact:phone"]),
            website: self.tag(&["website", "contact:website", "url"]),
            types: self.types(),
            location: self.location(),
            rating: None,
            rating_count: None,
            place_id,
        })
    }

    fn into_details(self) -> PlaceDetails {
        let name = Some(self.label()).filter(|n| !n.is_empty());
        let types = Some(self.types()).filter(|t| !t.is_empty());
        PlaceDetails {
            name,
            phone: self.tag(&["phone", "contact:phone"]),
            website: self.tag(&["website", "contact:website", "url"]),
            url: self.maps_url(),
            types,
            rating: None,
            rating_count: None,
            formatted_address: self.display_name,
        }
    }
}
