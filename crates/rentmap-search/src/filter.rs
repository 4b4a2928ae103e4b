//! UI filter selections and their parsed form.
//!
//! The distance selection is the primary filter: while it is empty, search is
//! disabled and the secondary filters (rent type, price band, rooms) are
//! inactive and reset.

use serde::Serialize;

/// Raw values of the filter controls, exactly as the UI holds them.
/// Empty strings mean "no selection".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub distance: String,
    pub rent_type: String,
    /// `"min-max"`, e.g. `"2000-4000"`.
    pub price_range: String,
    pub room_type: String,
}

impl FilterSelection {
    #[must_use]
    pub fn with_distance(distance: &str) -> Self {
        Self {
            distance: distance.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_distance(&self) -> bool {
        !self.distance.trim().is_empty()
    }

    /// Drops secondary selections when no distance is chosen.
    #[must_use]
    pub fn gated(self) -> Self {
        if self.has_distance() {
            self
        } else {
            Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum RentType {
    Whole,
    Shared,
    Other(String),
}

impl RentType {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw {
            "" => None,
            "整租" | "whole" | "entire" => Some(RentType::Whole),
            "合租" | "shared" => Some(RentType::Shared),
            other => Some(RentType::Other(other.to_string())),
        }
    }

    /// Value the backend matches `rent_type` against.
    #[must_use]
    pub fn as_query_value(&self) -> &str {
        match self {
            RentType::Whole => "整租",
            RentType::Shared => "合租",
            RentType::Other(s) => s,
        }
    }
}

impl From<RentType> for String {
    fn from(value: RentType) -> Self {
        value.as_query_value().to_string()
    }
}

/// Room filter. The backend does a substring match on the listing's layout
/// text (`"2室1厅"`), so a bedroom count is sent as `"{n}室"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum RoomFilter {
    Bedrooms(u8),
    Other(String),
}

impl RoomFilter {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let count = raw.strip_suffix('室').unwrap_or(raw);
        match count.parse::<u8>() {
            Ok(n) if n > 0 => Some(RoomFilter::Bedrooms(n)),
            _ => Some(RoomFilter::Other(raw.to_string())),
        }
    }

    #[must_use]
    pub fn as_query_value(&self) -> String {
        match self {
            RoomFilter::Bedrooms(n) => format!("{n}室"),
            RoomFilter::Other(s) => s.clone(),
        }
    }
}

impl From<RoomFilter> for String {
    fn from(value: RoomFilter) -> Self {
        value.as_query_value()
    }
}

/// Inclusive monthly price band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBand {
    pub min: i64,
    pub max: i64,
}

impl PriceBand {
    /// Parses `"min-max"`. Both halves must be plain integers with
    /// `min <= max`; anything else yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (min, max) = raw.trim().split_once('-')?;
        let min = parse_whole_int(min)?;
        let max = parse_whole_int(max)?;
        (min <= max).then_some(Self { min, max })
    }
}

fn parse_whole_int(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Parsed filters.
///
/// `max_distance_km == None` is the distinguished "search disabled" state; it
/// is never represented as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    pub max_distance_km: Option<f64>,
    pub rent_type: Option<RentType>,
    pub price: Option<PriceBand>,
    pub rooms: Option<RoomFilter>,
}

impl QueryFilter {
    /// Parses a UI selection. Malformed secondary values are dropped one by
    /// one; an unparsable or non-positive distance disables search.
    #[must_use]
    pub fn from_selection(selection: &FilterSelection) -> Self {
        let max_distance_km = selection
            .distance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0);

        let Some(max_distance_km) = max_distance_km else {
            if selection.has_distance() {
                tracing::debug!(
                    distance = %selection.distance,
                    "unparsable distance selection; search disabled"
                );
            }
            return Self::default();
        };

        let price = if selection.price_range.trim().is_empty() {
            None
        } else {
            let band = PriceBand::parse(&selection.price_range);
            if band.is_none() {
                tracing::debug!(
                    price_range = %selection.price_range,
                    "ignoring malformed price band"
                );
            }
            band
        };

        Self {
            max_distance_km: Some(max_distance_km),
            rent_type: RentType::parse(&selection.rent_type),
            price,
            rooms: RoomFilter::parse(&selection.room_type),
        }
    }

    #[must_use]
    pub fn search_enabled(&self) -> bool {
        self.max_distance_km.is_some()
    }

    /// Secondary filters only take effect while a distance is selected.
    #[must_use]
    pub fn secondary_filters_enabled(&self) -> bool {
        self.search_enabled()
    }
}
