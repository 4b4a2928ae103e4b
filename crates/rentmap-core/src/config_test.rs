use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("RENTMAP_API_BASE_URL", "http://localhost:5000");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "RENTMAP_ENV"));
}

#[test]
fn build_app_config_fails_without_api_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "RENTMAP_API_BASE_URL"),
        "expected MissingEnvVar(RENTMAP_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_base_url_as_missing() {
    let mut map = HashMap::new();
    map.insert("RENTMAP_API_BASE_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_base_url_without_scheme() {
    let mut map = HashMap::new();
    map.insert("RENTMAP_API_BASE_URL", "localhost:5000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTMAP_API_BASE_URL"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.api_base_url, "http://localhost:5000");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "rentmap/0.1 (proximity-search)");
    assert_eq!(cfg.result_limit, 50);
    assert!((cfg.max_radius_km - 50.0).abs() < f64::EPSILON);
    assert_eq!(cfg.max_retries, 1);
    assert_eq!(cfg.retry_backoff_base_ms, 250);
    assert_eq!(cfg.listing_coord_system, CoordSystem::Gcj02);
    assert_eq!(cfg.geolocation_timeout_ms, 10_000);
    assert_eq!(cfg.geolocation_max_age_ms, 300_000);
}

#[test]
fn result_limit_override() {
    let mut map = full_env();
    map.insert("RENTMAP_RESULT_LIMIT", "20");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.result_limit, 20);
}

#[test]
fn result_limit_zero_is_rejected() {
    let mut map = full_env();
    map.insert("RENTMAP_RESULT_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTMAP_RESULT_LIMIT")
    );
}

#[test]
fn request_timeout_invalid() {
    let mut map = full_env();
    map.insert("RENTMAP_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTMAP_REQUEST_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn max_radius_override() {
    let mut map = full_env();
    map.insert("RENTMAP_MAX_RADIUS_KM", "12.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.max_radius_km - 12.5).abs() < f64::EPSILON);
}

#[test]
fn max_radius_must_be_positive() {
    for bad in ["0", "-3", "NaN", "inf", "wide"] {
        let mut map = full_env();
        map.insert("RENTMAP_MAX_RADIUS_KM", bad);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTMAP_MAX_RADIUS_KM"),
            "{bad} should be rejected, got: {result:?}"
        );
    }
}

#[test]
fn max_retries_override() {
    let mut map = full_env();
    map.insert("RENTMAP_MAX_RETRIES", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_retries, 0);
}

#[test]
fn listing_coord_system_accepts_wgs84() {
    let mut map = full_env();
    map.insert("RENTMAP_LISTING_COORD_SYSTEM", "WGS84");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.listing_coord_system, CoordSystem::Wgs84);
}

#[test]
fn listing_coord_system_rejects_bd09() {
    let mut map = full_env();
    map.insert("RENTMAP_LISTING_COORD_SYSTEM", "bd09");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTMAP_LISTING_COORD_SYSTEM")
    );
}

#[test]
fn listing_coord_system_rejects_unknown() {
    let mut map = full_env();
    map.insert("RENTMAP_LISTING_COORD_SYSTEM", "mercator");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn geolocation_windows_override() {
    let mut map = full_env();
    map.insert("RENTMAP_GEOLOCATION_TIMEOUT_MS", "5000");
    map.insert("RENTMAP_GEOLOCATION_MAX_AGE_MS", "60000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.geolocation_timeout_ms, 5000);
    assert_eq!(cfg.geolocation_max_age_ms, 60_000);
}

#[test]
fn debug_output_hides_query_string() {
    let mut map = full_env();
    map.insert("RENTMAP_API_BASE_URL", "https://api.example.com?token=secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(debug.contains("https://api.example.com"));
    assert!(!debug.contains("secret"));
}
