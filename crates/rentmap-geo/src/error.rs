use thiserror::Error;

use crate::coord::CoordSystem;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("coordinate is not finite: lng={lng}, lat={lat}")]
    NonFinite { lng: f64, lat: f64 },

    #[error("cannot convert {from} to BD09 directly; convert to GCJ02 first")]
    NotCanonical { from: CoordSystem },

    #[error("coordinate systems differ: {left} vs {right}")]
    SystemMismatch {
        left: CoordSystem,
        right: CoordSystem,
    },

    #[error("unknown coordinate system \"{0}\"")]
    UnknownSystem(String),
}
