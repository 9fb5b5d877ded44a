//! In-memory providers and request helpers for router tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use hunter_core::LookupTables;
use hunter_scraper::{
    BoundingBox, FetchedPage, Geocoder, LatLng, LeadPipeline, PageFetcher, PipelineLimits,
    PlaceDetails, PlaceDetailsProvider, PlaceSearchProvider, RawPlace, ScraperError,
};
use tower::ServiceExt;

use super::{build_app, default_rate_limit_state, AppState};
use crate::middleware::AuthState;

struct FakeProvider;

#[async_trait]
impl Geocoder for FakeProvider {
    async fn geocode(
        &self,
        _city: &str,
        _country: Option<&str>,
    ) -> Result<Option<BoundingBox>, ScraperError> {
        Ok(BoundingBox::new(
            LatLng::new(61.52, 23.80),
            LatLng::new(61.48, 23.74),
        ))
    }
}

#[async_trait]
impl PlaceSearchProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn text_search(&self, _query: &str) -> Result<Vec<RawPlace>, ScraperError> {
        Ok(vec![
            RawPlace {
                place_id: "p-site".to_string(),
                name: "Salon Sakset".to_string(),
                website: Some("https://sakset.example".to_string()),
                ..RawPlace::default()
            },
            RawPlace {
                place_id: "p-none".to_string(),
                name: "Parturi Pekka".to_string(),
                ..RawPlace::default()
            },
        ])
    }

    async fn nearby_search(
        &self,
        _center: LatLng,
        _radius_meters: u32,
        _keyword: &str,
        _category_tag: Option<&str>,
    ) -> Result<Vec<RawPlace>, ScraperError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl PlaceDetailsProvider for FakeProvider {
    async fn place_details(&self, _place_id: &str) -> Result<PlaceDetails, ScraperError> {
        Ok(PlaceDetails::default())
    }
}

#[async_trait]
impl PageFetcher for FakeProvider {
    async fn fetch(&self, _url: &str) -> Result<FetchedPage, ScraperError> {
        Ok(FetchedPage {
            status: 200,
            body: r#"<html><head><title>Sakset</title><meta name="viewport" content="width=device-width"></head></html>"#
                .to_string(),
        })
    }
}

pub(super) fn fake_pipeline() -> Arc<LeadPipeline> {
    let provider = Arc::new(FakeProvider);
    Arc::new(LeadPipeline::new(
        provider.clone(),
        provider.clone(),
        provider.clone(),
        provider,
        Arc::new(LookupTables::default()),
        PipelineLimits {
            max_grid_points: 1,
            ..PipelineLimits::default()
        },
    ))
}

pub(super) fn app_without_auth(state: AppState) -> Router {
    build_app(state, AuthState::disabled(), default_rate_limit_state())
}

pub(super) async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "GET", uri, None).await
}

pub(super) async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json parse")
    };
    (status, json)
}
