use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which place-search backend drives discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacesProvider {
    /// Google Places Web Service. Requires an API key.
    Google,
    /// OpenStreetMap Nominatim. Keyless, single-page results.
    Nominatim,
}

impl std::fmt::Display for PlacesProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacesProvider::Google => write!(f, "google"),
            PlacesProvider::Nominatim => write!(f, "nominatim"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Postgres URL for the CRM layer. `None` disables persistence.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub places_provider: PlacesProvider,
    pub google_places_api_key: Option<String>,
    pub search_country: String,
    pub search_language: String,
    pub max_grid_points: usize,
    pub max_results: usize,
    pub grid_radius_meters: u32,
    pub max_pages: usize,
    pub page_token_delay_ms: u64,
    pub details_workers: usize,
    pub probe_workers: usize,
    pub probe_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub lookups_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("places_provider", &self.places_provider)
            .field(
                "google_places_api_key",
                &self.google_places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("search_country", &self.search_country)
            .field("search_language", &self.search_language)
            .field("max_grid_points", &self.max_grid_points)
            .field("max_results", &self.max_results)
            .field("grid_radius_meters", &self.grid_radius_meters)
            .field("max_pages", &self.max_pages)
            .field("page_token_delay_ms", &self.page_token_delay_ms)
            .field("details_workers", &self.details_workers)
            .field("probe_workers", &self.probe_workers)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("lookups_path", &self.lookups_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
