//! Pure conversions between `WGS84`, `GCJ02` and `BD09`.
//!
//! The correction series, ellipsoid constants and bounding box are the
//! published values used by mainland map providers. They are reproduced
//! literally, including the order of floating point operations, so results
//! match other implementations of the same formulas exactly.

use std::f64::consts::PI;

use crate::coord::{CoordSystem, Coordinate};

/// Krasovsky 1940 semi-major axis in metres.
const A: f64 = 6_378_245.0;

/// Krasovsky 1940 first eccentricity squared.
#[allow(clippy::excessive_precision)]
const EE: f64 = 0.006_693_421_622_965_943_23;

const X_PI: f64 = PI * 3000.0 / 180.0;

const BD_LNG_OFFSET: f64 = 0.0065;
const BD_LAT_OFFSET: f64 = 0.006;

/// Bounds of the region where the `GCJ02` obfuscation is applied.
const ZONE_MIN_LNG: f64 = 72.004;
const ZONE_MAX_LNG: f64 = 137.834_7;
const ZONE_MIN_LAT: f64 = 0.829_3;
const ZONE_MAX_LAT: f64 = 55.827_1;

/// Upper bound on refinement passes in [`bd09_to_gcj02`]. Each pass shrinks
/// the residual by roughly three orders of magnitude.
const BD_INVERSE_MAX_PASSES: usize = 4;
const BD_INVERSE_TOLERANCE: f64 = 1e-13;

/// Returns `true` when `(lng, lat)` lies outside the obfuscation bounding box.
#[must_use]
pub fn is_outside_obfuscation_zone(lng: f64, lat: f64) -> bool {
    lng < ZONE_MIN_LNG || lng > ZONE_MAX_LNG || lat < ZONE_MIN_LAT || lat > ZONE_MAX_LAT
}

fn transform_lat(lng: f64, lat: f64) -> f64 {
    let mut ret = -100.0
        + 2.0 * lng
        + 3.0 * lat
        + 0.2 * lat * lat
        + 0.1 * lng * lat
        + 0.2 * lng.abs().sqrt();
    ret += (20.0 * (6.0 * lng * PI).sin() + 20.0 * (2.0 * lng * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (lat * PI).sin() + 40.0 * (lat / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (lat / 12.0 * PI).sin() + 320.0 * (lat * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lng(lng: f64, lat: f64) -> f64 {
    let mut ret =
        300.0 + lng + 2.0 * lat + 0.1 * lng * lng + 0.1 * lng * lat + 0.1 * lng.abs().sqrt();
    ret += (20.0 * (6.0 * lng * PI).sin() + 20.0 * (2.0 * lng * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (lng * PI).sin() + 40.0 * (lng / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (lng / 12.0 * PI).sin() + 300.0 * (lng / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

/// Obfuscation offset `(d_lng, d_lat)` for a `WGS84` point inside the zone.
fn obfuscation_delta(lng: f64, lat: f64) -> (f64, f64) {
    let mut d_lat = transform_lat(lng - 105.0, lat - 35.0);
    let mut d_lng = transform_lng(lng - 105.0, lat - 35.0);
    let rad_lat = lat / 180.0 * PI;
    let mut magic = rad_lat.sin();
    magic = 1.0 - EE * magic * magic;
    let sqrt_magic = magic.sqrt();
    d_lat = (d_lat * 180.0) / ((A * (1.0 - EE)) / (magic * sqrt_magic) * PI);
    d_lng = (d_lng * 180.0) / ((A / sqrt_magic) * rad_lat.cos() * PI);
    (d_lng, d_lat)
}

/// `WGS84` -> `GCJ02`.
///
/// Points outside the obfuscation zone are returned unchanged, re-tagged as
/// `GCJ02`.
#[must_use]
pub fn wgs84_to_gcj02(lng: f64, lat: f64) -> Coordinate {
    if is_outside_obfuscation_zone(lng, lat) {
        return Coordinate::tagged(lng, lat, CoordSystem::Gcj02);
    }
    let (d_lng, d_lat) = obfuscation_delta(lng, lat);
    Coordinate::tagged(lng + d_lng, lat + d_lat, CoordSystem::Gcj02)
}

/// Approximate `GCJ02` -> `WGS84`.
///
/// Applies the obfuscation offset computed at the obfuscated point and
/// subtracts it, which leaves an error of a few metres. Useful for display of
/// GPS-space values only; nothing in the search pipeline depends on it.
#[must_use]
pub fn gcj02_to_wgs84(lng: f64, lat: f64) -> Coordinate {
    if is_outside_obfuscation_zone(lng, lat) {
        return Coordinate::tagged(lng, lat, CoordSystem::Wgs84);
    }
    let (d_lng, d_lat) = obfuscation_delta(lng, lat);
    let (mg_lng, mg_lat) = (lng + d_lng, lat + d_lat);
    Coordinate::tagged(lng * 2.0 - mg_lng, lat * 2.0 - mg_lat, CoordSystem::Wgs84)
}

fn bd09_offset(lng: f64, lat: f64) -> (f64, f64) {
    let z = (lng * lng + lat * lat).sqrt() + 0.000_02 * (lat * X_PI).sin();
    let theta = lat.atan2(lng) + 0.000_003 * (lng * X_PI).cos();
    (z * theta.cos() + BD_LNG_OFFSET, z * theta.sin() + BD_LAT_OFFSET)
}

/// `GCJ02` -> `BD09`. Always applied; there is no bounding box.
#[must_use]
pub fn gcj02_to_bd09(lng: f64, lat: f64) -> Coordinate {
    let (bd_lng, bd_lat) = bd09_offset(lng, lat);
    Coordinate::tagged(bd_lng, bd_lat, CoordSystem::Bd09)
}

/// `BD09` -> `GCJ02`, undoing only the `BD09` offset.
///
/// Starts from the published closed-form inverse, which leaves a residual of
/// about `2e-6` degrees because its perturbation terms are evaluated at the
/// offset point. The residual is then removed by re-applying the forward
/// offset and correcting, so `bd09_to_gcj02(gcj02_to_bd09(p))` recovers `p`
/// to well under `1e-9`.
///
/// This is not an inverse of [`wgs84_to_gcj02`] and never yields `WGS84`.
#[must_use]
pub fn bd09_to_gcj02(bd_lng: f64, bd_lat: f64) -> Coordinate {
    if !bd_lng.is_finite() || !bd_lat.is_finite() {
        return Coordinate::tagged(f64::NAN, f64::NAN, CoordSystem::Gcj02);
    }

    let x = bd_lng - BD_LNG_OFFSET;
    let y = bd_lat - BD_LAT_OFFSET;
    let z = (x * x + y * y).sqrt() - 0.000_02 * (y * X_PI).sin();
    let theta = y.atan2(x) - 0.000_003 * (x * X_PI).cos();
    let mut lng = z * theta.cos();
    let mut lat = z * theta.sin();

    for _ in 0..BD_INVERSE_MAX_PASSES {
        let (fwd_lng, fwd_lat) = bd09_offset(lng, lat);
        let (err_lng, err_lat) = (fwd_lng - bd_lng, fwd_lat - bd_lat);
        if err_lng.abs() < BD_INVERSE_TOLERANCE && err_lat.abs() < BD_INVERSE_TOLERANCE {
            break;
        }
        lng -= err_lng;
        lat -= err_lat;
    }

    Coordinate::tagged(lng, lat, CoordSystem::Gcj02)
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
