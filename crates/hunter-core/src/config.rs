use crate::app_config::{AppConfig, Environment, PlacesProvider};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("HUNTER_ENV", "development"))?;
    let bind_addr = parse_addr("HUNTER_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("HUNTER_LOG_LEVEL", "info");

    let places_provider = parse_places_provider(&or_default("HUNTER_PLACES_PROVIDER", "google"))?;
    let google_places_api_key = optional("GOOGLE_PLACES_API_KEY");
    let search_country = or_default("HUNTER_SEARCH_COUNTRY", "Finland");
    let search_language = or_default("HUNTER_SEARCH_LANGUAGE", "fi");

    let max_grid_points = parse_usize("HUNTER_MAX_GRID_POINTS", "9")?;
    let max_results = parse_usize("HUNTER_MAX_RESULTS", "200")?;
    let grid_radius_meters = parse_u32("HUNTER_GRID_RADIUS_METERS", "2000")?;
    if grid_radius_meters == 0 {
        return Err(invalid(
            "HUNTER_GRID_RADIUS_METERS",
            "radius must be greater than zero".to_string(),
        ));
    }
    let max_pages = parse_usize("HUNTER_MAX_PAGES", "4")?;
    let page_token_delay_ms = parse_u64("HUNTER_PAGE_TOKEN_DELAY_MS", "2000")?;
    let details_workers = parse_usize("HUNTER_DETAILS_WORKERS", "5")?;
    let probe_workers = parse_usize("HUNTER_PROBE_WORKERS", "5")?;
    let probe_timeout_secs = parse_u64("HUNTER_PROBE_TIMEOUT_SECS", "5")?;
    let request_timeout_secs = parse_u64("HUNTER_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("HUNTER_USER_AGENT", "agency-hunter/0.1 (lead-research)");
    let lookups_path = optional("HUNTER_LOOKUPS_PATH").map(PathBuf::from);

    let db_max_connections = parse_u32("HUNTER_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("HUNTER_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("HUNTER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        places_provider,
        google_places_api_key,
        search_country,
        search_language,
        max_grid_points,
        max_results,
        grid_radius_meters,
        max_pages,
        page_token_delay_ms,
        details_workers,
        probe_workers,
        probe_timeout_secs,
        request_timeout_secs,
        user_agent,
        lookups_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HUNTER_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_places_provider(s: &str) -> Result<PlacesProvider, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "google" => Ok(PlacesProvider::Google),
        "nominatim" | "osm" => Ok(PlacesProvider::Nominatim),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HUNTER_PLACES_PROVIDER".to_string(),
            reason: format!("expected google or nominatim; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
