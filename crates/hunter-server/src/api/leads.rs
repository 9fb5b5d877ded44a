//! CRM handlers for saved leads.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use hunter_core::{LeadSource, PipelineStatus};
use hunter_db::{LeadRow, LeadUpdate, NewLead};
use hunter_scraper::WebsiteStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, require_pool, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_NAME_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct ListLeadsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateLeadRequest {
    pub name: String,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub place_id: Option<String>,
    pub website_status: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
}

// Option<Option<T>> distinguishes an absent key (keep) from `null` (clear).
#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateLeadRequest {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub website_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub notes: Option<Option<String>>,
}

/// Maps a present key to `Some(..)` even when its value is `null`.
#[allow(clippy::option_option)]
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub(super) struct LeadItem {
    id: i64,
    public_id: Uuid,
    name: String,
    company_name: String,
    address: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    place_id: Option<String>,
    status: String,
    website_status: Option<String>,
    notes: Option<String>,
    source: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LeadRow> for LeadItem {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            name: row.name,
            company_name: row.company_name,
            address: row.address,
            phone: row.phone,
            website: row.website,
            place_id: row.place_id,
            status: row.status,
            website_status: row.website_status,
            notes: row.notes,
            source: row.source,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validation(req_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(req_id, "validation_error", message)
}

fn validate_name(req_id: &str, field: &str, value: &str) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(validation(
            req_id,
            format!("{field} must be 1-{MAX_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

fn parse_status(req_id: &str, value: &str) -> Result<PipelineStatus, ApiError> {
    value.parse().map_err(|e: String| validation(req_id, e))
}

fn parse_source(req_id: &str, value: &str) -> Result<LeadSource, ApiError> {
    value.parse().map_err(|e: String| validation(req_id, e))
}

fn parse_website_status(req_id: &str, value: &str) -> Result<&'static str, ApiError> {
    value
        .parse::<WebsiteStatus>()
        .map(WebsiteStatus::as_str)
        .map_err(|e| validation(req_id, e))
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id(req_id: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| validation(req_id, format!("lead id must be a positive integer, got '{raw}'")))
}

fn not_found(req_id: &str, id: i64) -> ApiError {
    ApiError::new(req_id, "not_found", format!("lead {id} not found"))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/leads: saved leads, newest first.
pub(super) async fn list_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListLeadsQuery>,
) -> Result<Json<ApiResponse<Vec<LeadItem>>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let status = trimmed(query.status.as_deref())
        .map(|s| parse_status(rid, s))
        .transpose()?;

    let rows = hunter_db::list_leads(pool, status, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(LeadItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/leads: save a lead; 409 when it is already in the CRM.
pub(super) async fn create_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LeadItem>>), ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;

    let name = body.name.trim();
    validate_name(rid, "name", name)?;
    let company_name = trimmed(body.company_name.as_deref());
    if let Some(company) = company_name {
        validate_name(rid, "company_name", company)?;
    }
    let status = trimmed(body.status.as_deref())
        .map(|s| parse_status(rid, s))
        .transpose()?
        .unwrap_or(PipelineStatus::New);
    let source = trimmed(body.source.as_deref())
        .map(|s| parse_source(rid, s))
        .transpose()?
        .unwrap_or(LeadSource::Manual);
    let website_status = trimmed(body.website_status.as_deref())
        .map(|s| parse_website_status(rid, s))
        .transpose()?;

    let lead = NewLead {
        name,
        company_name,
        address: trimmed(body.address.as_deref()),
        phone: trimmed(body.phone.as_deref()),
        website: trimmed(body.website.as_deref()),
        place_id: trimmed(body.place_id.as_deref()),
        website_status,
        notes: trimmed(body.notes.as_deref()),
        status,
        source,
    };

    let row = hunter_db::create_lead(pool, &lead)
        .await
        .map_err(|e| {
            if hunter_db::is_unique_violation(&e) {
                ApiError::new(rid, "conflict", "lead already saved")
            } else {
                map_db_error(rid.clone(), &e)
            }
        })?
        .ok_or_else(|| ApiError::new(rid, "conflict", "lead already saved"))?;

    tracing::info!(lead_id = row.id, source = %source, "lead saved");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/leads/{id}
pub(super) async fn get_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<LeadItem>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let id = parse_id(rid, &raw_id)?;

    let row = hunter_db::get_lead(pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| not_found(rid, id))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/leads/{id}: sparse update of status, notes, and contact fields.
pub(super) async fn update_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
    Json(body): Json<UpdateLeadRequest>,
) -> Result<Json<ApiResponse<LeadItem>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let id = parse_id(rid, &raw_id)?;

    let name = body.name.as_deref().map(str::trim);
    if let Some(name) = name {
        validate_name(rid, "name", name)?;
    }
    let company_name = body.company_name.as_deref().map(str::trim);
    if let Some(company) = company_name {
        validate_name(rid, "company_name", company)?;
    }
    let status = body
        .status
        .as_deref()
        .map(|s| parse_status(rid, s))
        .transpose()?;
    let website_status = match body.website_status.as_ref() {
        None => None,
        Some(None) => Some(None),
        Some(Some(value)) => Some(Some(parse_website_status(rid, value)?)),
    };

    let update = LeadUpdate {
        name,
        company_name,
        status,
        address: body.address.as_ref().map(|v| trimmed(v.as_deref())),
        phone: body.phone.as_ref().map(|v| trimmed(v.as_deref())),
        website: body.website.as_ref().map(|v| trimmed(v.as_deref())),
        website_status,
        notes: body.notes.as_ref().map(|v| trimmed(v.as_deref())),
    };
    if update.is_empty() {
        return Err(validation(rid, "request body contains no updatable fields"));
    }

    let row = hunter_db::update_lead(pool, id, &update)
        .await
        .map_err(|e| match e {
            hunter_db::DbError::NotFound => not_found(rid, id),
            other => map_db_error(rid.clone(), &other),
        })?;

    tracing::info!(lead_id = id, status = %row.status, "lead updated");

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/leads/{id}
pub(super) async fn delete_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let pool = require_pool(&state, rid)?;
    let id = parse_id(rid, &raw_id)?;

    let deleted = hunter_db::delete_lead(pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(not_found(rid, id));
    }

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
