//! CRM vocabulary shared by the database layer, the API, and the CLI.

use serde::{Deserialize, Serialize};

/// Where a lead sits in the sales pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    New,
    Contacted,
    Meeting,
    Negotiation,
    Won,
    Lost,
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 6] = [
        PipelineStatus::New,
        PipelineStatus::Contacted,
        PipelineStatus::Meeting,
        PipelineStatus::Negotiation,
        PipelineStatus::Won,
        PipelineStatus::Lost,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStatus::New => "new",
            PipelineStatus::Contacted => "contacted",
            PipelineStatus::Meeting => "meeting",
            PipelineStatus::Negotiation => "negotiation",
            PipelineStatus::Won => "won",
            PipelineStatus::Lost => "lost",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PipelineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        PipelineStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == needle)
            .ok_or_else(|| {
                format!(
                    "unknown pipeline status '{s}'; expected one of new, contacted, meeting, negotiation, won, lost"
                )
            })
    }
}

/// How a saved lead entered the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
    Google,
    Nominatim,
    Manual,
}

impl LeadSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LeadSource::Google => "google",
            LeadSource::Nominatim => "nominatim",
            LeadSource::Manual => "manual",
        }
    }
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(LeadSource::Google),
            "nominatim" => Ok(LeadSource::Nominatim),
            "manual" => Ok(LeadSource::Manual),
            other => Err(format!("unknown lead source '{other}'")),
        }
    }
}

/// Compute a stable dedup key for a saved lead.
///
/// SHA-256 over the lower-cased, whitespace-collapsed name and address.
/// Hex-encoded. Two saves of the same business from different searches
/// collapse to one key even when the provider place id is unknown.
#[must_use]
pub fn lead_key(name: &str, address: Option<&str>) -> String {
    use sha2::{Digest, Sha256};
    let input = format!(
        "{}\x00{}",
        collapse_whitespace(name),
        collapse_whitespace(address.unwrap_or("")),
    );
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

fn collapse_whitespace(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
