//! Re-projects backend listings into display space and derives the weights
//! used by clustering and heatmap overlays.

use rentmap_geo::{CoordSystem, Coordinate};
use serde::Serialize;

use crate::query::ProximityQuery;
use crate::types::ListingRecord;

/// Fixed intensity ceiling handed to the heatmap overlay.
pub const HEATMAP_MAX: f64 = 10_000.0;

/// A listing with its derived display coordinate (`BD09`) and cluster weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedListing {
    pub record: ListingRecord,
    pub display_coordinate: Coordinate,
    pub cluster_weight: f64,
}

/// The live result set. Replaced wholesale on every ingest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotatedResultSet {
    listings: Vec<AnnotatedListing>,
}

impl AnnotatedResultSet {
    #[must_use]
    pub fn listings(&self) -> &[AnnotatedListing] {
        &self.listings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnotatedListing> {
        self.listings.iter()
    }

    #[must_use]
    pub fn find(&self, id: i64) -> Option<&AnnotatedListing> {
        self.listings.iter().find(|l| l.record.id == id)
    }
}

impl<'a> IntoIterator for &'a AnnotatedResultSet {
    type Item = &'a AnnotatedListing;
    type IntoIter = std::slice::Iter<'a, AnnotatedListing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

/// `max(1, price / 100)` for a parseable price, otherwise `1`.
///
/// The floor keeps cheap listings visible on density overlays.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cluster_weight(record: &ListingRecord) -> f64 {
    record
        .price_value()
        .map_or(1.0, |price| (price as f64 / 100.0).max(1.0))
}

/// Annotates one record, or returns `None` when its coordinate is unusable.
///
/// `source_system` is the system the backend reports listing coordinates in.
#[must_use]
pub fn annotate(record: ListingRecord, source_system: CoordSystem) -> Option<AnnotatedListing> {
    let (lng, lat) = record.source_lng_lat()?;
    let source = Coordinate::new(lng, lat, source_system).ok()?;
    let display_coordinate = source.to_canonical().to_display().ok()?;
    let cluster_weight = cluster_weight(&record);
    Some(AnnotatedListing {
        record,
        display_coordinate,
        cluster_weight,
    })
}

/// One heatmap sample in display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub coordinate: Coordinate,
    pub weight: f64,
}

impl HeatPoint {
    /// Weight scaled into `[0, 1]` against [`HEATMAP_MAX`].
    #[must_use]
    pub fn normalized_weight(&self) -> f64 {
        (self.weight / HEATMAP_MAX).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapDataSet {
    pub points: Vec<HeatPoint>,
    pub max: f64,
}

impl HeatmapDataSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The search-radius circle drawn around the query point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiusOverlay {
    /// `BD09`.
    pub center: Coordinate,
    pub radius_m: f64,
}

impl RadiusOverlay {
    /// Overlay for a query, re-projected into display space.
    #[must_use]
    pub fn for_query(query: &ProximityQuery) -> Option<Self> {
        if !query.center.is_finite() {
            return None;
        }
        let center = query.center.to_display().ok()?;
        Some(Self {
            center,
            radius_m: query.radius_km * 1000.0,
        })
    }
}

/// Owns the live [`AnnotatedResultSet`].
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    source_system: CoordSystem,
    current: AnnotatedResultSet,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(CoordSystem::Gcj02)
    }
}

impl ResultAggregator {
    #[must_use]
    pub fn new(source_system: CoordSystem) -> Self {
        Self {
            source_system,
            current: AnnotatedResultSet::default(),
        }
    }

    #[must_use]
    pub fn source_system(&self) -> CoordSystem {
        self.source_system
    }

    /// Replaces the current result set with annotations of `records`.
    ///
    /// Records with a missing or non-finite coordinate are dropped; the rest
    /// keep backend order.
    pub fn ingest(&mut self, records: Vec<ListingRecord>) -> &AnnotatedResultSet {
        let received = records.len();
        let listings: Vec<AnnotatedListing> = records
            .into_iter()
            .filter_map(|record| {
                let id = record.id;
                let annotated = annotate(record, self.source_system);
                if annotated.is_none() {
                    tracing::debug!(record_id = id, "dropping listing without usable coordinate");
                }
                annotated
            })
            .collect();

        tracing::debug!(
            received,
            kept = listings.len(),
            "ingested listing batch"
        );
        self.current = AnnotatedResultSet { listings };
        &self.current
    }

    pub fn clear(&mut self) {
        self.current = AnnotatedResultSet::default();
    }

    #[must_use]
    pub fn current(&self) -> &AnnotatedResultSet {
        &self.current
    }

    /// `(display coordinate, weight)` pairs for the presentation layer's
    /// clusterer.
    #[must_use]
    pub fn cluster_points(&self) -> Vec<(Coordinate, f64)> {
        self.current
            .iter()
            .map(|l| (l.display_coordinate, l.cluster_weight))
            .collect()
    }

    #[must_use]
    pub fn heatmap(&self) -> HeatmapDataSet {
        HeatmapDataSet {
            points: self
                .current
                .iter()
                .map(|l| HeatPoint {
                    coordinate: l.display_coordinate,
                    weight: l.cluster_weight,
                })
                .collect(),
            max: HEATMAP_MAX,
        }
    }
}
