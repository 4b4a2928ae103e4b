use rentmap_geo::CoordSystem;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let api_base_url = require("RENTMAP_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "RENTMAP_API_BASE_URL",
            "must start with http:// or https://".to_string(),
        ));
    }

    let env = parse_environment(&or_default("RENTMAP_ENV", "development"))?;
    let log_level = or_default("RENTMAP_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("RENTMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("RENTMAP_USER_AGENT", "rentmap/0.1 (proximity-search)");

    let result_limit = parse_u32("RENTMAP_RESULT_LIMIT", "50")?;
    if result_limit == 0 {
        return Err(invalid(
            "RENTMAP_RESULT_LIMIT",
            "must be at least 1".to_string(),
        ));
    }

    let max_radius_km = or_default("RENTMAP_MAX_RADIUS_KM", "50")
        .parse::<f64>()
        .map_err(|e| invalid("RENTMAP_MAX_RADIUS_KM", e.to_string()))?;
    if !max_radius_km.is_finite() || max_radius_km <= 0.0 {
        return Err(invalid(
            "RENTMAP_MAX_RADIUS_KM",
            format!("must be a positive number, got {max_radius_km}"),
        ));
    }

    let max_retries = parse_u32("RENTMAP_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("RENTMAP_RETRY_BACKOFF_BASE_MS", "250")?;
    let listing_coord_system =
        parse_listing_coord_system(&or_default("RENTMAP_LISTING_COORD_SYSTEM", "gcj02"))?;
    let geolocation_timeout_ms = parse_u64("RENTMAP_GEOLOCATION_TIMEOUT_MS", "10000")?;
    let geolocation_max_age_ms = parse_u64("RENTMAP_GEOLOCATION_MAX_AGE_MS", "300000")?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        request_timeout_secs,
        user_agent,
        result_limit,
        max_radius_km,
        max_retries,
        retry_backoff_base_ms,
        listing_coord_system,
        geolocation_timeout_ms,
        geolocation_max_age_ms,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RENTMAP_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

/// Listings arrive either as raw GPS or already obfuscated; `BD09` is a
/// display-only system and is never accepted from the backend.
fn parse_listing_coord_system(s: &str) -> Result<CoordSystem, ConfigError> {
    let var = "RENTMAP_LISTING_COORD_SYSTEM";
    match s.parse::<CoordSystem>() {
        Ok(system @ (CoordSystem::Wgs84 | CoordSystem::Gcj02)) => Ok(system),
        Ok(CoordSystem::Bd09) => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "BD09 is display-only; use wgs84 or gcj02".to_string(),
        }),
        Err(e) => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
