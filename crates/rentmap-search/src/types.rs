//! Wire types for the `/api/nearby-houses` backend endpoint.
//!
//! ## Observed shape
//!
//! Listing rows come straight out of a scraped table, so most numeric columns
//! are strings: `"price": "3500"`, `"area": "45"`, `"latitude": "39.9151"`.
//! Some deployments emit real numbers instead, and malformed rows show up as
//! `"NaN"`, `""` or `null`. [`LooseNumber`] accepts all of these and parsing is
//! deferred to the point of use, where a bad value degrades to "absent".
//!
//! Text columns are nullable and occasionally numeric (`"region": 110105`);
//! [`lenient_text`] folds those into `Option<String>`. Columns this crate does
//! not interpret (`address`, `block`, `direction`, `rent_type`, ...) are kept
//! in `extra`.
//!
//! A row that still fails to decode (say, a non-numeric `id`) is dropped on
//! its own; the rest of the batch survives.

use serde::{Deserialize, Deserializer, Serialize};

/// A numeric field that may arrive as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Full-string float parse. `"NaN"` parses, so callers must still check
    /// finiteness.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Leading-integer parse: `"3500"` and `"3500元/月"` both give `3500`.
    ///
    /// Numbers are truncated toward zero. Returns `None` when no digits lead
    /// the value or when the number is not finite.
    #[must_use]
    pub fn leading_int(&self) -> Option<i64> {
        match self {
            LooseNumber::Number(n) if n.is_finite() => {
                #[allow(clippy::cast_possible_truncation)]
                let truncated = n.trunc() as i64;
                Some(truncated)
            }
            LooseNumber::Number(_) => None,
            LooseNumber::Text(s) => parse_leading_int(s),
        }
    }
}

pub(crate) fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// A listing as returned by the backend. Read-only to this crate: derived
/// annotations live on [`crate::aggregate::AnnotatedListing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rooms: Option<String>,
    #[serde(default)]
    pub area: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub region: Option<String>,
    #[serde(default)]
    pub longitude: Option<LooseNumber>,
    #[serde(default)]
    pub latitude: Option<LooseNumber>,
    /// Kilometres from the query point, computed by the backend.
    #[serde(default)]
    pub distance: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub distance_text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ListingRecord {
    /// Source longitude/latitude, when both parse as finite floats.
    #[must_use]
    pub fn source_lng_lat(&self) -> Option<(f64, f64)> {
        let lng = self.longitude.as_ref()?.as_f64()?;
        let lat = self.latitude.as_ref()?.as_f64()?;
        (lng.is_finite() && lat.is_finite()).then_some((lng, lat))
    }

    #[must_use]
    pub fn price_value(&self) -> Option<i64> {
        self.price.as_ref()?.leading_int()
    }

    #[must_use]
    pub fn area_value(&self) -> Option<i64> {
        self.area.as_ref()?.leading_int()
    }

    #[must_use]
    pub fn distance_km(&self) -> Option<f64> {
        self.distance
            .as_ref()?
            .as_f64()
            .filter(|d| d.is_finite())
    }
}

/// Response envelope of `GET /api/nearby-houses`.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyResponse {
    pub success: bool,
    #[serde(default)]
    pub total: u64,
    #[serde(default, deserialize_with = "decode_houses")]
    pub houses: Vec<ListingRecord>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Strings pass through; numbers and booleans are rendered; `null`, arrays and
/// objects become `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    })
}

/// Decodes rows one at a time, dropping those that do not fit [`ListingRecord`].
fn decode_houses<'de, D>(deserializer: D) -> Result<Vec<ListingRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let record_id = row.get("id").map(ToString::to_string);
            match serde_json::from_value::<ListingRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(
                        record_id = record_id.as_deref().unwrap_or("?"),
                        error = %e,
                        "dropping undecodable listing row"
                    );
                    None
                }
            }
        })
        .collect())
}
