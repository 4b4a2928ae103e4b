//! Great-circle distance and search-window helpers.
//!
//! Distances on a 6371 km sphere are accurate to well under a percent at city
//! scale, which is all the radius filter needs.

use crate::coord::{CoordSystem, Coordinate};
use crate::error::GeoError;

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_LAT_DEGREE: f64 = 111.0;

/// Haversine distance between two coordinates in kilometres.
///
/// # Errors
///
/// Returns [`GeoError::SystemMismatch`] when the coordinates are tagged with
/// different systems. Convert one of them first.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> Result<f64, GeoError> {
    if a.system() != b.system() {
        return Err(GeoError::SystemMismatch {
            left: a.system(),
            right: b.system(),
        });
    }
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    Ok(EARTH_RADIUS_KM * c)
}

/// Axis-aligned lat/lng window enclosing a circle of `radius_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    pub system: CoordSystem,
}

impl BoundingBox {
    /// Window around `center`. The longitude half-width widens with latitude
    /// so the physical extent stays close to `radius_km` on every side.
    #[must_use]
    pub fn around(center: &Coordinate, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_LAT_DEGREE;
        let lng_delta = radius_km / (KM_PER_LAT_DEGREE * center.latitude().to_radians().cos());
        Self {
            min_lat: center.latitude() - lat_delta,
            max_lat: center.latitude() + lat_delta,
            min_lng: center.longitude() - lng_delta,
            max_lng: center.longitude() + lng_delta,
            system: center.system(),
        }
    }

    /// `false` for coordinates in a different system.
    #[must_use]
    pub fn contains(&self, c: &Coordinate) -> bool {
        c.system() == self.system
            && (self.min_lat..=self.max_lat).contains(&c.latitude())
            && (self.min_lng..=self.max_lng).contains(&c.longitude())
    }
}

/// Human-readable distance for listing cards: whole metres (`"850米"`) under
/// 1 km, otherwise kilometres with one decimal (`"2.4公里"`).
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        #[allow(clippy::cast_possible_truncation)]
        let metres = (km * 1000.0).trunc() as i64;
        format!("{metres}米")
    } else {
        format!("{km:.1}公里")
    }
}
