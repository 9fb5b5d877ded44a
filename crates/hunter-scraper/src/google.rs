//! Google Places Web Service client (legacy JSON endpoints).
//!
//! Every response carries a top-level `status` string. `OK` and
//! `ZERO_RESULTS` are success; anything else (`REQUEST_DENIED`,
//! `OVER_QUERY_LIMIT`, `INVALID_REQUEST`, ...) becomes
//! [`ScraperError::Provider`].

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ScraperError;
use crate::geo::{BoundingBox, LatLng, DEFAULT_VIEWPORT_MARGIN_DEGREES};
use crate::http::{build_client, endpoint_url, get_json, parse_base_url};
use crate::pagination::collect_pages;
use crate::provider::{Geocoder, PlaceDetailsProvider, PlaceSearchProvider, SearchSettings};
use crate::types::{PlaceDetails, RawPlace, SearchPage};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Restricted details field set; each extra field is billed.
const DETAILS_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,url,types,rating,user_ratings_total";

pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    settings: SearchSettings,
}

impl GooglePlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingApiKey`] if `api_key` is blank, or
    /// [`ScraperError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        settings: SearchSettings,
    ) -> Result<Self, ScraperError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// As [`GooglePlacesClient::new`], plus [`ScraperError::InvalidBaseUrl`].
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        settings: SearchSettings,
        base_url: &str,
    ) -> Result<Self, ScraperError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ScraperError::MissingApiKey {
                provider: "google".to_string(),
            });
        }
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(base_url)?,
            settings,
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ScraperError> {
        let mut url = endpoint_url(&self.base_url, path, params)?;
        url.query_pairs_mut()
            .append_pair("language", &self.settings.language)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Fetches one search page. With a token, all other parameters are
    /// ignored by the API, so only the token is sent.
    async fn search_page(
        &self,
        path: &str,
        params: &[(&str, &str)],
        page_token: Option<String>,
    ) -> Result<SearchPage, ScraperError> {
        let url = match page_token.as_deref() {
            Some(token) => self.url(path, &[("pagetoken", token)])?,
            None => self.url(path, params)?,
        };
        let response: SearchResponse = get_json(&self.client, url, path).await?;
        check_status(&response.status, response.error_message.as_deref())?;
        Ok(SearchPage {
            places: response
                .results
                .into_iter()
                .filter_map(GooglePlace::into_raw)
                .collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn paginated(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<RawPlace>, ScraperError> {
        collect_pages(
            self.settings.max_pages,
            self.settings.page_token_delay,
            |token| self.search_page(path, params, token),
        )
        .await
    }
}

#[async_trait]
impl PlaceSearchProvider for GooglePlacesClient {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn text_search(&self, query: &str) -> Result<Vec<RawPlace>, ScraperError> {
        self.paginated("place/textsearch/json", &[("query", query)])
            .await
    }

    async fn nearby_search(
        &self,
        center: LatLng,
        radius_meters: u32,
        keyword: &str,
        category_tag: Option<&str>,
    ) -> Result<Vec<RawPlace>, ScraperError> {
        let location = format!("{},{}", center.lat, center.lng);
        let radius = radius_meters.to_string();
        let mut params = vec![
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("keyword", keyword),
        ];
        if let Some(tag) = category_tag {
            params.push(("type", tag));
        }
        self.paginated("place/nearbysearch/json", &params).await
    }
}

#[async_trait]
impl PlaceDetailsProvider for GooglePlacesClient {
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, ScraperError> {
        let path = "place/details/json";
        let url = self.url(path, &[("place_id", place_id), ("fields", DETAILS_FIELDS)])?;
        let response: DetailsResponse = get_json(&self.client, url, path).await?;
        check_status(&response.status, response.error_message.as_deref())?;
        Ok(response
            .result
            .map(GoogleDetails::into_details)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Geocoder for GooglePlacesClient {
    async fn geocode(
        &self,
        city: &str,
        country: Option<&str>,
    ) -> Result<Option<BoundingBox>, ScraperError> {
        let path = "geocode/json";
        let address = match country {
            Some(country) if !country.trim().is_empty() => format!("{city}, {country}"),
            _ => city.to_owned(),
        };
        let url = self.url(path, &[("address", address.as_str())])?;
        let response: GeocodeResponse = get_json(&self.client, url, path).await?;
        check_status(&response.status, response.error_message.as_deref())?;

        let Some(geometry) = response.results.into_iter().next().map(|r| r.geometry) else {
            return Ok(None);
        };
        let bbox = geometry
            .viewport
            .and_then(|vp| BoundingBox::new(vp.northeast.into(), vp.southwest.into()))
            .unwrap_or_else(|| {
                BoundingBox::around(geometry.location.into(), DEFAULT_VIEWPORT_MARGIN_DEGREES)
            });
        Ok(Some(bbox))
    }
}

fn check_status(status: &str, error_message: Option<&str>) -> Result<(), ScraperError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ScraperError::Provider {
            status: other.to_owned(),
            message: error_message.unwrap_or("no error message").to_owned(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<GooglePlace>,
    next_page_token: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GooglePlace {
    place_id: Option<String>,
    name: Option<String>,
    formatted_address: Option<String>,
    /// Nearby search returns a short `vicinity` instead of a full address.
    vicinity: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    geometry: Option<Geometry>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
}

impl GooglePlace {
    fn into_raw(self) -> Option<RawPlace> {
        let place_id = self.place_id.filter(|id| !id.is_empty())?;
        Some(RawPlace {
            place_id,
            name: self.name.unwrap_or_default(),
            address: self.formatted_address.or(self.vicinity),
            phone: None,
            website: None,
            types: self.types,
            location: self.geometry.map(|g| g.location.into()),
            rating: self.rating,
            rating_count: self.user_ratings_total,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: WireLatLng,
    viewport: Option<Viewport>,
}

#[derive(Debug, Deserialize)]
struct Viewport {
    northeast: WireLatLng,
    southwest: WireLatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct WireLatLng {
    lat: f64,
    lng: f64,
}

impl From<WireLatLng> for LatLng {
    fn from(value: WireLatLng) -> Self {
        LatLng::new(value.lat, value.lng)
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<GoogleDetails>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleDetails {
    name: Option<String>,
    formatted_address: Option<String>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
    url: Option<String>,
    types: Option<Vec<String>>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
}

impl GoogleDetails {
    fn into_details(self) -> PlaceDetails {
        PlaceDetails {
            name: self.name,
            formatted_address: self.formatted_address,
            phone: self.formatted_phone_number,
            website: self.website,
            url: self.url,
            types: self.types,
            rating: self.rating,
            rating_count: self.user_ratings_total,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}
