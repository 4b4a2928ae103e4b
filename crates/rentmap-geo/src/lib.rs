//! Coordinate reference systems used by the rental map and the conversions
//! between them.
//!
//! Three systems are in play: `WGS84` (raw GPS), `GCJ02` (the obfuscated
//! system every backend query uses) and `BD09` (the map provider's rendering
//! offset on top of `GCJ02`). All conversions hop through `GCJ02`; there is no
//! direct `WGS84` <-> `BD09` function.

pub mod cities;
pub mod coord;
pub mod distance;
pub mod error;
pub mod transform;

pub use cities::{city_center, CityCenter, CITY_CENTERS};
pub use coord::{CoordSystem, Coordinate};
pub use distance::{format_distance, haversine_km, BoundingBox};
pub use error::GeoError;
pub use transform::{
    bd09_to_gcj02, gcj02_to_bd09, gcj02_to_wgs84, is_outside_obfuscation_zone, wgs84_to_gcj02,
};
