//! Turns filter state plus the current query point into a backend query.
//!
//! The builder never touches the network: its output is a plain value that
//! serializes to the `/api/nearby-houses` query string.

use rentmap_core::AppConfig;
use rentmap_geo::{CoordSystem, Coordinate};
use serde::Serialize;

use crate::filter::{FilterSelection, PriceBand, QueryFilter, RentType, RoomFilter};

pub const DEFAULT_RESULT_LIMIT: u32 = 50;
pub const DEFAULT_MAX_RADIUS_KM: f64 = 50.0;

/// A fully-resolved nearby query. `center` is always `GCJ02`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityQuery {
    pub center: Coordinate,
    pub radius_km: f64,
    pub limit: u32,
    pub rent_type: Option<RentType>,
    pub price: Option<PriceBand>,
    pub rooms: Option<RoomFilter>,
}

impl ProximityQuery {
    /// Query-string pairs in wire order:
    /// `lat, lon, radius, limit, rent_type?, min_price?, max_price?, rooms?`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("lat", self.center.latitude().to_string()),
            ("lon", self.center.longitude().to_string()),
            ("radius", self.radius_km.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(rent_type) = &self.rent_type {
            pairs.push(("rent_type", rent_type.as_query_value().to_string()));
        }
        if let Some(price) = self.price {
            pairs.push(("min_price", price.min.to_string()));
            pairs.push(("max_price", price.max.to_string()));
        }
        if let Some(rooms) = &self.rooms {
            pairs.push(("rooms", rooms.as_query_value()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQueryBuilder {
    limit: u32,
    max_radius_km: f64,
}

impl Default for ProximityQueryBuilder {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            max_radius_km: DEFAULT_MAX_RADIUS_KM,
        }
    }
}

impl ProximityQueryBuilder {
    #[must_use]
    pub fn new(limit: u32, max_radius_km: f64) -> Self {
        Self {
            limit,
            max_radius_km,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.result_limit, config.max_radius_km)
    }

    /// Builds a query from raw UI selections.
    ///
    /// Returns `None` when no distance is selected. That is the disabled
    /// state, not an error: callers clear results, overlay and heatmap.
    #[must_use]
    pub fn build(&self, selection: &FilterSelection, center: &Coordinate) -> Option<ProximityQuery> {
        self.build_from_filter(&QueryFilter::from_selection(selection), center)
    }

    /// Builds a query from already-parsed filters.
    ///
    /// A center in another system is converted to `GCJ02` first. A non-finite
    /// center also yields `None`, since there is nothing meaningful to search
    /// around.
    #[must_use]
    pub fn build_from_filter(
        &self,
        filter: &QueryFilter,
        center: &Coordinate,
    ) -> Option<ProximityQuery> {
        let max_distance_km = filter.max_distance_km?;

        let canonical = if center.system() == CoordSystem::Gcj02 {
            *center
        } else {
            tracing::debug!(from = %center.system(), "converting query center to GCJ02");
            center.to_canonical()
        };
        if !canonical.is_finite() {
            tracing::debug!(center = %center, "query center is not finite; skipping search");
            return None;
        }

        let radius_km = max_distance_km.min(self.max_radius_km);
        Some(ProximityQuery {
            center: canonical,
            radius_km,
            limit: self.limit,
            rent_type: filter.rent_type.clone(),
            price: filter.price,
            rooms: filter.rooms.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing_gcj() -> Coordinate {
        Coordinate::new(116.404, 39.915, CoordSystem::Gcj02).unwrap()
    }

    fn full_selection() -> FilterSelection {
        FilterSelection {
            distance: "5".into(),
            rent_type: "整租".into(),
            price_range: "2000-4000".into(),
            room_type: "2".into(),
        }
    }

    #[test]
    fn no_distance_returns_none_regardless_of_other_filters() {
        let mut sel = full_selection();
        sel.distance = String::new();
        assert!(ProximityQueryBuilder::default()
            .build(&sel, &beijing_gcj())
            .is_none());
    }

    #[test]
    fn builds_flat_query_with_all_filters() {
        let q = ProximityQueryBuilder::default()
            .build(&full_selection(), &beijing_gcj())
            .unwrap();
        let pairs = q.query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            ["lat", "lon", "radius", "limit", "rent_type", "min_price", "max_price", "rooms"]
        );
        assert_eq!(pairs[0].1, "39.915");
        assert_eq!(pairs[1].1, "116.404");
        assert_eq!(pairs[2].1, "5");
        assert_eq!(pairs[3].1, "50");
        assert_eq!(pairs[4].1, "整租");
        assert_eq!(pairs[5].1, "2000");
        assert_eq!(pairs[6].1, "4000");
        assert_eq!(pairs[7].1, "2室");
    }

    #[test]
    fn bad_price_band_is_omitted_from_query() {
        let mut sel = full_selection();
        sel.price_range = "lots-more".into();
        let q = ProximityQueryBuilder::default()
            .build(&sel, &beijing_gcj())
            .unwrap();
        assert!(q.price.is_none());
        assert!(q.query_pairs().iter().all(|(k, _)| !k.ends_with("_price")));
    }

    #[test]
    fn radius_is_clamped() {
        let sel = FilterSelection::with_distance("80");
        let q = ProximityQueryBuilder::new(20, 50.0)
            .build(&sel, &beijing_gcj())
            .unwrap();
        assert!((q.radius_km - 50.0).abs() < f64::EPSILON);
        assert_eq!(q.limit, 20);
    }

    #[test]
    fn bd09_center_is_converted_to_gcj02() {
        let bd = Coordinate::new(116.404, 39.915, CoordSystem::Bd09).unwrap();
        let q = ProximityQueryBuilder::default()
            .build(&FilterSelection::with_distance("5"), &bd)
            .unwrap();
        assert_eq!(q.center.system(), CoordSystem::Gcj02);
        assert!((q.center.longitude() - 116.404).abs() > 1e-3);
    }

    #[test]
    fn query_serializes_for_inspection() {
        let q = ProximityQueryBuilder::default()
            .build(&full_selection(), &beijing_gcj())
            .unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["center"]["system"], "gcj02");
        assert_eq!(json["rent_type"], "整租");
        assert_eq!(json["rooms"], "2室");
    }
}
