use axum::{
    extract::{Query, State},
    Extension, Json,
};
use hunter_scraper::{LeadQuery, LeadReport};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub business_type: Option<String>,
    pub city: Option<String>,
}

fn required<'a>(req_id: &str, field: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            format!("'{field}' must be a non-empty string"),
        )),
    }
}

/// GET /api/v1/leads/search: run the discovery pipeline for one query.
pub(super) async fn search_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<LeadReport>>, ApiError> {
    let rid = &req_id.0;
    let business_type = required(rid, "business_type", query.business_type.as_deref())?;
    let city = required(rid, "city", query.city.as_deref())?;

    let Some(pipeline) = state.pipeline.as_ref() else {
        return Err(ApiError::new(
            rid,
            "configuration_error",
            "places provider is not configured; set GOOGLE_PLACES_API_KEY or HUNTER_PLACES_PROVIDER=nominatim",
        ));
    };

    tracing::info!(business_type, city, "lead search requested");
    let report = pipeline.run(&LeadQuery::new(business_type, city)).await;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::super::test_support::{app_without_auth, fake_pipeline, get_json};
    use super::AppState;

    #[tokio::test]
    async fn blank_city_is_validation_error() {
        let app = app_without_auth(AppState {
            pool: None,
            pipeline: Some(fake_pipeline()),
        });
        let (status, json) =
            get_json(app, "/api/v1/leads/search?business_type=kampaamo&city=%20%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("city")));
    }

    #[tokio::test]
    async fn missing_business_type_is_validation_error() {
        let app = app_without_auth(AppState {
            pool: None,
            pipeline: Some(fake_pipeline()),
        });
        let (status, json) = get_json(app, "/api/v1/leads/search?city=Tampere").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("business_type")));
    }

    #[tokio::test]
    async fn unconfigured_pipeline_is_configuration_error() {
        let app = app_without_auth(AppState {
            pool: None,
            pipeline: None,
        });
        let (status, json) =
            get_json(app, "/api/v1/leads/search?business_type=kampaamo&city=Tampere").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "configuration_error");
    }

    #[tokio::test]
    async fn search_returns_ranked_leads_and_stats() {
        let app = app_without_auth(AppState {
            pool: None,
            pipeline: Some(fake_pipeline()),
        });
        let (status, json) =
            get_json(app, "/api/v1/leads/search?business_type=kampaamo&city=Tampere").await;
        assert_eq!(status, StatusCode::OK);

        let leads = json["data"]["leads"].as_array().expect("leads array");
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0]["id"], 1);
        assert_eq!(leads[0]["place_id"], "p-none");
        assert_eq!(leads[0]["website_status"], "NO_WEBSITE");
        assert_eq!(leads[1]["website_status"], "MOBILE_FRIENDLY");
        assert_eq!(json["data"]["stats"]["unique_places"], 2);
        assert!(json["meta"]["request_id"].is_string());
    }
}
