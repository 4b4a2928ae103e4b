//! Ordering of the live result set by a user-selected criterion.
//!
//! Sorting is stable and works on a copy, so the UI can re-sort as often as
//! it likes without re-querying or touching record content.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::AnnotatedListing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    Distance,
    PriceAsc,
    PriceDesc,
    AreaDesc,
    /// Backend order.
    #[default]
    None,
}

impl FromStr for SortCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "distance" => Ok(SortCriterion::Distance),
            "price_asc" => Ok(SortCriterion::PriceAsc),
            "price_desc" => Ok(SortCriterion::PriceDesc),
            "area_desc" => Ok(SortCriterion::AreaDesc),
            "" | "none" | "default" => Ok(SortCriterion::None),
            other => Err(format!("unknown sort criterion \"{other}\"")),
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Ascending,
    Descending,
}

/// Compares optional keys. Present values always precede missing ones,
/// whatever the direction, so listings with no price or area sink to the end.
fn compare_keys(a: Option<f64>, b: Option<f64>, direction: Direction) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => match direction {
            Direction::Ascending => x.total_cmp(&y),
            Direction::Descending => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[allow(clippy::cast_precision_loss)]
fn sort_key(listing: &AnnotatedListing, criterion: SortCriterion) -> Option<f64> {
    let record = &listing.record;
    match criterion {
        SortCriterion::Distance => record.distance_km(),
        SortCriterion::PriceAsc | SortCriterion::PriceDesc => record.price_value().map(|p| p as f64),
        SortCriterion::AreaDesc => record.area_value().map(|a| a as f64),
        SortCriterion::None => None,
    }
}

/// Returns `listings` ordered by `criterion`.
///
/// Ties keep their input order, and `sort(sort(s, c), c) == sort(s, c)`.
#[must_use]
pub fn sort(listings: &[AnnotatedListing], criterion: SortCriterion) -> Vec<AnnotatedListing> {
    let mut ordered = listings.to_vec();
    let direction = match criterion {
        SortCriterion::None => return ordered,
        SortCriterion::Distance | SortCriterion::PriceAsc => Direction::Ascending,
        SortCriterion::PriceDesc | SortCriterion::AreaDesc => Direction::Descending,
    };
    ordered.sort_by(|a, b| {
        compare_keys(sort_key(a, criterion), sort_key(b, criterion), direction)
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::annotate;
    use rentmap_geo::CoordSystem;

    fn listing(id: i64, price: &str, area: &str, distance: Option<f64>) -> AnnotatedListing {
        let record = serde_json::from_value(serde_json::json!({
            "id": id,
            "price": price,
            "area": area,
            "distance": distance,
            "longitude": 116.4,
            "latitude": 39.9,
        }))
        .unwrap();
        annotate(record, CoordSystem::Gcj02).unwrap()
    }

    fn ids(listings: &[AnnotatedListing]) -> Vec<i64> {
        listings.iter().map(|l| l.record.id).collect()
    }

    fn sample() -> Vec<AnnotatedListing> {
        vec![
            listing(1, "3000", "40", Some(2.5)),
            listing(2, "8000", "90", Some(0.8)),
            listing(3, "3000", "60", Some(4.1)),
            listing(4, "n/a", "", None),
            listing(5, "1500", "40", Some(0.8)),
        ]
    }

    #[test]
    fn price_asc_is_stable_and_puts_missing_last() {
        assert_eq!(ids(&sort(&sample(), SortCriterion::PriceAsc)), [5, 1, 3, 2, 4]);
    }

    #[test]
    fn price_desc_puts_highest_first() {
        assert_eq!(ids(&sort(&sample(), SortCriterion::PriceDesc)), [2, 1, 3, 5, 4]);
    }

    #[test]
    fn distance_ties_keep_input_order() {
        assert_eq!(ids(&sort(&sample(), SortCriterion::Distance)), [2, 5, 1, 3, 4]);
    }

    #[test]
    fn area_desc_orders_largest_first() {
        assert_eq!(ids(&sort(&sample(), SortCriterion::AreaDesc)), [2, 3, 1, 5, 4]);
    }

    #[test]
    fn none_is_identity() {
        assert_eq!(ids(&sort(&sample(), SortCriterion::None)), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn sorting_is_idempotent_for_every_criterion() {
        for criterion in [
            SortCriterion::Distance,
            SortCriterion::PriceAsc,
            SortCriterion::PriceDesc,
            SortCriterion::AreaDesc,
            SortCriterion::None,
        ] {
            let once = sort(&sample(), criterion);
            let twice = sort(&once, criterion);
            assert_eq!(once, twice, "{criterion:?} not idempotent");
        }
    }

    #[test]
    fn sorting_does_not_touch_input() {
        let input = sample();
        let before = input.clone();
        let _ = sort(&input, SortCriterion::PriceDesc);
        assert_eq!(input, before);
    }

    #[test]
    fn criterion_parses_ui_values() {
        assert_eq!("price_desc".parse::<SortCriterion>().unwrap(), SortCriterion::PriceDesc);
        assert_eq!("".parse::<SortCriterion>().unwrap(), SortCriterion::None);
        assert!("cheapest".parse::<SortCriterion>().is_err());
    }
}
