use rentmap_geo::CoordSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Root of the listings backend; the nearby query path is appended.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Value of the `limit` key on every nearby query.
    pub result_limit: u32,
    /// Radius clamp in km. The backend refuses to search wider than this.
    pub max_radius_km: f64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// System the backend reports listing coordinates in (`WGS84` or `GCJ02`).
    pub listing_coord_system: CoordSystem,
    pub geolocation_timeout_ms: u64,
    pub geolocation_max_age_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Query strings can carry credentials; only show the origin.
        let api_origin = self
            .api_base_url
            .split_once('?')
            .map_or(self.api_base_url.as_str(), |(base, _)| base);
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &api_origin)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("result_limit", &self.result_limit)
            .field("max_radius_km", &self.max_radius_km)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("listing_coord_system", &self.listing_coord_system)
            .field("geolocation_timeout_ms", &self.geolocation_timeout_ms)
            .field("geolocation_max_age_ms", &self.geolocation_max_age_ms)
            .finish()
    }
}
