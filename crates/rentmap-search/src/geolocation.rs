//! Intake for positions reported by the platform geolocation service.
//!
//! The service itself lives outside this crate. It hands over a WGS84 fix or
//! an error code; this module turns those into typed values the session can
//! consume.

use chrono::{DateTime, Utc};
use rentmap_core::AppConfig;
use rentmap_geo::{CoordSystem, Coordinate, GeoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_AGE_MS: u64 = 300_000;

/// One position report, always in WGS84.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeolocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in metres, when the platform reports one.
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
}

impl GeolocationFix {
    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] if the platform reported NaN or an
    /// infinite component.
    pub fn coordinate(&self) -> Result<Coordinate, GeoError> {
        Coordinate::new(self.longitude, self.latitude, CoordSystem::Wgs84)
    }

    /// The fix converted to the canonical system.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] for a non-finite fix.
    pub fn to_canonical(&self) -> Result<Coordinate, GeoError> {
        self.coordinate().map(Coordinate::to_canonical)
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    /// `true` when the fix is older than `max_age_ms` at `now_ms`.
    ///
    /// A fix stamped in the future counts as fresh.
    #[must_use]
    pub fn age_exceeds(&self, now_ms: i64, max_age_ms: u64) -> bool {
        let age = now_ms.saturating_sub(self.timestamp_ms);
        age > 0 && u64::try_from(age).is_ok_and(|age| age > max_age_ms)
    }
}

/// Why the platform could not produce a fix. Never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("用户拒绝了地理定位请求")]
    PermissionDenied,
    #[error("位置信息不可用")]
    PositionUnavailable,
    #[error("获取位置信息超时")]
    Timeout,
    #[error("获取位置信息时发生未知错误")]
    Unknown,
}

impl GeolocationError {
    /// Classifies a platform error code (`1`, `2`, `3`, anything else).
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::PermissionDenied => 1,
            Self::PositionUnavailable => 2,
            Self::Timeout => 3,
            Self::Unknown => 0,
        }
    }
}

/// Options handed to the platform geolocation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            maximum_age_ms: DEFAULT_MAX_AGE_MS,
        }
    }
}

impl GeolocationOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: config.geolocation_timeout_ms,
            maximum_age_ms: config.geolocation_max_age_ms,
        }
    }
}
