//! Database operations for the `leads` table.

use chrono::{DateTime, Utc};
use hunter_core::{lead_key, LeadSource, PipelineStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const LEAD_COLUMNS: &str = "id, public_id, name, company_name, address, phone, website, place_id, \
                            lead_key, status, website_status, notes, source, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `leads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub company_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub place_id: Option<String>,
    pub lead_key: String,
    pub status: String,
    pub website_status: Option<String>,
    pub notes: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeadRow {
    /// Parsed pipeline status. The column is CHECK-constrained, so `None`
    /// only appears if the schema and enum drift apart.
    #[must_use]
    pub fn pipeline_status(&self) -> Option<PipelineStatus> {
        self.status.parse().ok()
    }
}

/// Fields for a new lead. `company_name` defaults to `name`.
#[derive(Debug, Clone, Copy)]
pub struct NewLead<'a> {
    pub name: &'a str,
    pub company_name: Option<&'a str>,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub website: Option<&'a str>,
    pub place_id: Option<&'a str>,
    pub website_status: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub status: PipelineStatus,
    pub source: LeadSource,
}

impl<'a> NewLead<'a> {
    #[must_use]
    pub fn manual(name: &'a str) -> Self {
        Self {
            name,
            company_name: None,
            address: None,
            phone: None,
            website: None,
            place_id: None,
            website_status: None,
            notes: None,
            status: PipelineStatus::New,
            source: LeadSource::Manual,
        }
    }
}

/// Sparse update. For nullable columns:
///   - `None`        => keep existing value
///   - `Some(None)`  => set to NULL
///   - `Some(value)` => set to value
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadUpdate<'a> {
    pub name: Option<&'a str>,
    pub company_name: Option<&'a str>,
    pub status: Option<PipelineStatus>,
    pub address: Option<Option<&'a str>>,
    pub phone: Option<Option<&'a str>>,
    pub website: Option<Option<&'a str>>,
    pub website_status: Option<Option<&'a str>>,
    pub notes: Option<Option<&'a str>>,
}

impl LeadUpdate<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company_name.is_none()
            && self.status.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.website.is_none()
            && self.website_status.is_none()
            && self.notes.is_none()
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a lead. Returns `None` when a lead with the same `lead_key` or
/// `place_id` already exists.
///
/// `lead_key` is derived from the name and address at creation and is not
/// recomputed by later updates.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_lead(pool: &PgPool, lead: &NewLead<'_>) -> Result<Option<LeadRow>, DbError> {
    let key = lead_key(lead.name, lead.address);
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "INSERT INTO leads \
           (name, company_name, address, phone, website, place_id, lead_key, \
            status, website_status, notes, source) \
         VALUES ($1, COALESCE($2, $1), $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT DO NOTHING \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(lead.name)
    .bind(lead.company_name)
    .bind(lead.address)
    .bind(lead.phone)
    .bind(lead.website)
    .bind(lead.place_id)
    .bind(key)
    .bind(lead.status.as_str())
    .bind(lead.website_status)
    .bind(lead.notes)
    .bind(lead.source.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Lists leads newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_leads(
    pool: &PgPool,
    status: Option<PipelineStatus>,
    limit: i64,
) -> Result<Vec<LeadRow>, DbError> {
    let rows = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {LEAD_COLUMNS} \
         FROM leads \
         WHERE ($1::TEXT IS NULL OR status = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(status.map(PipelineStatus::as_str))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns a single lead by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_lead(pool: &PgPool, id: i64) -> Result<Option<LeadRow>, DbError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Applies a sparse update in a single `UPDATE … RETURNING` and bumps
/// `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no lead has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn update_lead(
    pool: &PgPool,
    id: i64,
    update: &LeadUpdate<'_>,
) -> Result<LeadRow, DbError> {
    let row = sqlx::query_as::<_, LeadRow>(&format!(
        "UPDATE leads \
         SET name           = COALESCE($2, name), \
             company_name   = COALESCE($3, company_name), \
             status         = COALESCE($4, status), \
             address        = CASE WHEN $5::BOOL  THEN $6  ELSE address END, \
             phone          = CASE WHEN $7::BOOL  THEN $8  ELSE phone END, \
             website        = CASE WHEN $9::BOOL  THEN $10 ELSE website END, \
             website_status = CASE WHEN $11::BOOL THEN $12 ELSE website_status END, \
             notes          = CASE WHEN $13::BOOL THEN $14 ELSE notes END, \
             updated_at     = NOW() \
         WHERE id = $1 \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(id)
    .bind(update.name)
    .bind(update.company_name)
    .bind(update.status.map(PipelineStatus::as_str))
    .bind(update.address.is_some())
    .bind(update.address.flatten())
    .bind(update.phone.is_some())
    .bind(update.phone.flatten())
    .bind(update.website.is_some())
    .bind(update.website.flatten())
    .bind(update.website_status.is_some())
    .bind(update.website_status.flatten())
    .bind(update.notes.is_some())
    .bind(update.notes.flatten())
    .fetch_optional(pool)
    .await?;
    row.ok_or(DbError::NotFound)
}

/// Deletes a lead. Returns `false` if it did not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_lead(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM leads WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
