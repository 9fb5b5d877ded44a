//! Versionable lookup tables for the lead pipeline.
//!
//! Category keywords map free-text business types to provider category tags,
//! excluded domains mark social/directory "websites", and
//! placeholder markers flag parked or default server pages. The built-in
//! tables mirror `config/lookups.yaml`; a custom file replaces them wholesale.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTables {
    /// Business-type keyword (lower-case) → provider category tag.
    #[serde(default)]
    pub category_tags: BTreeMap<String, String>,
    /// Domains (optionally with a path prefix) that make a site count as
    /// social/directory only.
    #[serde(default)]
    pub excluded_domains: Vec<String>,
    /// Page-title substrings that identify placeholder or default pages.
    #[serde(default)]
    pub placeholder_markers: Vec<String>,
}

const DEFAULT_CATEGORY_TAGS: &[(&str, &str)] = &[
    ("autokorjaamo", "car_repair"),
    ("korjaamo", "car_repair"),
    ("autohuolto", "car_repair"),
    ("rengasliike", "car_repair"),
    ("autopesula", "car_wash"),
    ("autoliike", "car_dealer"),
    ("kampaamo", "hair_care"),
    ("parturi", "hair_care"),
    ("kauneushoitola", "beauty_salon"),
    ("hieroja", "spa"),
    ("kylpylä", "spa"),
    ("ravintola", "restaurant"),
    ("pizzeria", "restaurant"),
    ("kahvila", "cafe"),
    ("leipomo", "bakery"),
    ("baari", "bar"),
    ("hammaslääkäri", "dentist"),
    ("lääkäri", "doctor"),
    ("fysioterapia", "physiotherapist"),
    ("eläinlääkäri", "veterinary_care"),
    ("kuntosali", "gym"),
    ("putkiliike", "plumber"),
    ("putkimies", "plumber"),
    ("sähköliike", "electrician"),
    ("sähköasentaja", "electrician"),
    ("maalari", "painter"),
    ("kattoremontti", "roofing_contractor"),
    ("rakennusliike", "general_contractor"),
    ("lukkoseppä", "locksmith"),
    ("muuttopalvelu", "moving_company"),
    ("siivous", "home_goods_store"),
    ("kukkakauppa", "florist"),
    ("kirjanpito", "accounting"),
    ("tilitoimisto", "accounting"),
    ("asianajotoimisto", "lawyer"),
    ("kiinteistönvälitys", "real_estate_agency"),
    ("vakuutus", "insurance_agency"),
    ("majoitus", "lodging"),
    ("hotelli", "lodging"),
];

const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "linkedin.com",
    "twitter.com",
    "tiktok.com",
    "youtube.com",
    "fonecta.fi",
    "finder.fi",
    "tori.fi",
    "yritystele.fi",
    "020202.fi",
    "asiakastieto.fi",
    "kauppalehti.fi",
    "google.com/maps",
    "business.site",
];

const DEFAULT_PLACEHOLDER_MARKERS: &[&str] = &[
    "iis windows server",
    "iis7",
    "under construction",
    "rakenteilla",
    "welcome to nginx",
    "apache2 ubuntu default page",
    "test page for the apache",
    "domain is for sale",
    "this domain is parked",
    "coming soon",
];

impl Default for LookupTables {
    fn default() -> Self {
        Self {
            category_tags: DEFAULT_CATEGORY_TAGS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            excluded_domains: DEFAULT_EXCLUDED_DOMAINS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            placeholder_markers: DEFAULT_PLACEHOLDER_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl LookupTables {
    /// Resolve a free-text business type to a provider category tag.
    ///
    /// Prefers an exact keyword match; otherwise picks the longest keyword
    /// contained in the input (so "autokorjaamot" still maps via
    /// "autokorjaamo" rather than the shorter "korjaamo").
    #[must_use]
    pub fn category_tag(&self, business_type: &str) -> Option<&str> {
        let needle = business_type.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some(tag) = self.category_tags.get(&needle) {
            return Some(tag.as_str());
        }
        self.category_tags
            .iter()
            .filter(|(keyword, _)| needle.contains(keyword.as_str()))
            .max_by_key(|(keyword, _)| keyword.chars().count())
            .map(|(_, tag)| tag.as_str())
    }

    /// Returns the first excluded domain that covers `host` and `path`.
    ///
    /// An entry matches the host itself or any subdomain of it. Entries with
    /// a path (`google.com/maps`) also require `path` to start with that
    /// path on a segment boundary. Query strings never take part.
    #[must_use]
    pub fn excluded_domain_for(&self, host: &str, path: &str) -> Option<&str> {
        let host = host.trim_end_matches('.').to_lowercase();
        let path = path.to_lowercase();
        self.excluded_domains
            .iter()
            .find(|entry| {
                let (entry_host, entry_path) = match entry.split_once('/') {
                    Some((h, p)) => (h, Some(p.trim_matches('/'))),
                    None => (entry.as_str(), None),
                };
                host_is_within(&host, entry_host)
                    && entry_path.is_none_or(|prefix| path_starts_with(&path, prefix))
            })
            .map(String::as_str)
    }

    /// Returns `true` if `title` contains any placeholder marker.
    #[must_use]
    pub fn is_placeholder_title(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();
        self.placeholder_markers
            .iter()
            .any(|marker| lowered.contains(marker.as_str()))
    }
}

fn host_is_within(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|rest| rest.ends_with('.'))
}

fn path_starts_with(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    path.trim_start_matches('/')
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Load and validate lookup tables from a YAML file.
///
/// Keys and markers are lower-cased on load so matching stays
/// case-insensitive regardless of how the file is written.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_lookups(path: &Path) -> Result<LookupTables, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LookupsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_lookups(&content)
}

/// Parse and validate lookup tables from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML or fails validation.
pub fn parse_lookups(content: &str) -> Result<LookupTables, ConfigError> {
    let raw: LookupTables = serde_yaml::from_str(content)?;
    let tables = LookupTables {
        category_tags: raw
            .category_tags
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
            .collect(),
        excluded_domains: raw
            .excluded_domains
            .into_iter()
            .map(|d| d.trim().to_lowercase())
            .collect(),
        placeholder_markers: raw
            .placeholder_markers
            .into_iter()
            .map(|m| m.trim().to_lowercase())
            .collect(),
    };
    validate_lookups(&tables)?;
    Ok(tables)
}

fn validate_lookups(tables: &LookupTables) -> Result<(), ConfigError> {
    for (keyword, tag) in &tables.category_tags {
        if keyword.is_empty() {
            return Err(ConfigError::Validation(
                "category keyword must be non-empty".to_string(),
            ));
        }
        if tag.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category keyword '{keyword}' has an empty provider tag"
            )));
        }
    }

    let mut seen = HashSet::new();
    for domain in &tables.excluded_domains {
        if domain.is_empty() {
            return Err(ConfigError::Validation(
                "excluded domain must be non-empty".to_string(),
            ));
        }
        if !seen.insert(domain.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate excluded domain: '{domain}'"
            )));
        }
    }

    if tables.placeholder_markers.iter().any(String::is_empty) {
        return Err(ConfigError::Validation(
            "placeholder marker must be non-empty".to_string(),
        ));
    }

    Ok(())
}
