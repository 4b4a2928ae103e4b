//! Tagged coordinate value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeoError;
use crate::transform::{bd09_to_gcj02, gcj02_to_bd09, wgs84_to_gcj02};

/// Coordinate reference system a [`Coordinate`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordSystem {
    /// Raw GPS, as reported by device geolocation.
    Wgs84,
    /// Regulatory-obfuscated system. Canonical for backend queries.
    Gcj02,
    /// Map provider's rendering offset atop `GCJ02`. Display only.
    Bd09,
}

impl fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordSystem::Wgs84 => write!(f, "WGS84"),
            CoordSystem::Gcj02 => write!(f, "GCJ02"),
            CoordSystem::Bd09 => write!(f, "BD09"),
        }
    }
}

impl FromStr for CoordSystem {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgs84" | "wgs-84" => Ok(CoordSystem::Wgs84),
            "gcj02" | "gcj-02" => Ok(CoordSystem::Gcj02),
            "bd09" | "bd-09" => Ok(CoordSystem::Bd09),
            _ => Err(GeoError::UnknownSystem(s.to_string())),
        }
    }
}

/// A longitude/latitude pair tagged with the system it is expressed in.
///
/// Fields are private so a value can never be re-tagged without going through
/// a conversion. [`Coordinate::new`] rejects non-finite input; the raw
/// transform functions in [`crate::transform`] do not validate and will carry
/// NaN through if given NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
    system: CoordSystem,
}

impl Coordinate {
    /// Builds a coordinate, rejecting NaN and infinite components.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] when either component is not finite.
    pub fn new(longitude: f64, latitude: f64, system: CoordSystem) -> Result<Self, GeoError> {
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(GeoError::NonFinite {
                lng: longitude,
                lat: latitude,
            });
        }
        Ok(Self::tagged(longitude, latitude, system))
    }

    pub(crate) const fn tagged(longitude: f64, latitude: f64, system: CoordSystem) -> Self {
        Self {
            longitude,
            latitude,
            system,
        }
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn system(&self) -> CoordSystem {
        self.system
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Converts to the canonical `GCJ02` system by the single step that
    /// applies to the current tag.
    ///
    /// `WGS84` goes through the forward obfuscation, `BD09` through the offset
    /// inverse, and `GCJ02` is returned as-is.
    #[must_use]
    pub fn to_canonical(self) -> Coordinate {
        match self.system {
            CoordSystem::Wgs84 => wgs84_to_gcj02(self.longitude, self.latitude),
            CoordSystem::Gcj02 => self,
            CoordSystem::Bd09 => bd09_to_gcj02(self.longitude, self.latitude),
        }
    }

    /// Converts to the `BD09` display system.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NotCanonical`] for `WGS84` input. Callers holding a
    /// GPS fix must call [`Coordinate::to_canonical`] first so both hops are
    /// visible at the call site.
    pub fn to_display(self) -> Result<Coordinate, GeoError> {
        match self.system {
            CoordSystem::Wgs84 => Err(GeoError::NotCanonical { from: self.system }),
            CoordSystem::Gcj02 => Ok(gcj02_to_bd09(self.longitude, self.latitude)),
            CoordSystem::Bd09 => Ok(self),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) {}",
            self.longitude, self.latitude, self.system
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_nan_latitude() {
        let err = Coordinate::new(116.4, f64::NAN, CoordSystem::Gcj02).unwrap_err();
        assert!(matches!(err, GeoError::NonFinite { .. }));
    }

    #[test]
    fn new_rejects_infinite_longitude() {
        assert!(Coordinate::new(f64::INFINITY, 39.9, CoordSystem::Bd09).is_err());
    }

    #[test]
    fn to_display_rejects_wgs84() {
        let gps = Coordinate::new(116.404, 39.915, CoordSystem::Wgs84).unwrap();
        assert_eq!(
            gps.to_display().unwrap_err(),
            GeoError::NotCanonical {
                from: CoordSystem::Wgs84
            }
        );
    }

    #[test]
    fn canonical_then_display_from_wgs84() {
        let gps = Coordinate::new(116.404, 39.915, CoordSystem::Wgs84).unwrap();
        let shown = gps.to_canonical().to_display().unwrap();
        assert_eq!(shown.system(), CoordSystem::Bd09);
    }

    #[test]
    fn to_canonical_is_identity_for_gcj02() {
        let c = Coordinate::new(121.47, 31.23, CoordSystem::Gcj02).unwrap();
        assert_eq!(c.to_canonical(), c);
    }

    #[test]
    fn to_display_is_identity_for_bd09() {
        let c = Coordinate::new(121.47, 31.23, CoordSystem::Bd09).unwrap();
        assert_eq!(c.to_display().unwrap(), c);
    }

    #[test]
    fn coord_system_parses_case_insensitively() {
        assert_eq!("GCJ02".parse::<CoordSystem>().unwrap(), CoordSystem::Gcj02);
        assert_eq!("wgs-84".parse::<CoordSystem>().unwrap(), CoordSystem::Wgs84);
        assert_eq!(" bd09 ".parse::<CoordSystem>().unwrap(), CoordSystem::Bd09);
        assert!("mercator".parse::<CoordSystem>().is_err());
    }

    #[test]
    fn serializes_with_lowercase_system_tag() {
        let c = Coordinate::new(116.0, 40.0, CoordSystem::Bd09).unwrap();
        let json = serde_json::to_value(c).unwrap();
        assert_eq!(json["system"], "bd09");
        assert_eq!(json["longitude"], 116.0);
    }
}
