//! The orchestrating controller: owns the live query point, filters, sort
//! order and result set, and guarantees that only the newest query's answer
//! is ever shown.
//!
//! Each search is split around its single suspension point:
//! [`SearchSession::begin_search`] issues a [`SearchTicket`], the caller
//! fetches, and [`SearchSession::complete`] applies the answer only if no
//! newer ticket has been issued since. [`SearchSession::run_search`] does all
//! three in one call for callers that never overlap searches.

use rentmap_core::AppConfig;
use rentmap_geo::{CoordSystem, Coordinate, GeoError};
use serde::Serialize;

use crate::aggregate::{
    AnnotatedListing, AnnotatedResultSet, HeatmapDataSet, RadiusOverlay, ResultAggregator,
};
use crate::client::{ListingSource, DEFAULT_FAILURE_MESSAGE};
use crate::error::SearchError;
use crate::filter::{FilterSelection, QueryFilter};
use crate::geolocation::GeolocationFix;
use crate::query::{ProximityQuery, ProximityQueryBuilder};
use crate::ranking::{self, SortCriterion};
use crate::types::NearbyResponse;

/// The query point in both coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryPosition {
    /// `GCJ02`, sent to the backend.
    pub canonical: Coordinate,
    /// `BD09`, used for markers and overlays.
    pub display: Coordinate,
}

/// Proof that a search was issued, carrying the query to send.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    generation: u64,
    query: ProximityQuery,
}

impl SearchTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn query(&self) -> &ProximityQuery {
        &self.query
    }
}

/// What a search cycle did to the visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// No query point yet.
    AwaitingPosition,
    /// No distance selected; results, overlay and heatmap were cleared.
    Disabled,
    Found { total: u64 },
    Empty,
    /// The search failed; the result set was cleared.
    Failed { message: String },
    /// A newer search was issued before this answer arrived. Nothing changed.
    Stale,
}

impl SearchOutcome {
    /// Status line for the presentation layer, if the outcome warrants one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::AwaitingPosition => Some("请先选择位置".to_string()),
            Self::Disabled => Some("请选择距离范围".to_string()),
            Self::Found { total } => Some(format!("找到 {total} 套附近房源")),
            Self::Empty => Some("该位置附近暂无房源".to_string()),
            Self::Failed { message } => Some(message.clone()),
            Self::Stale => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    builder: ProximityQueryBuilder,
    aggregator: ResultAggregator,
    filters: FilterSelection,
    sort: SortCriterion,
    position: Option<QueryPosition>,
    generation: u64,
    total: u64,
    overlay: Option<RadiusOverlay>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(ProximityQueryBuilder::default(), CoordSystem::Gcj02)
    }
}

impl SearchSession {
    /// `listing_system` is the system the backend stores listing coordinates in.
    #[must_use]
    pub fn new(builder: ProximityQueryBuilder, listing_system: CoordSystem) -> Self {
        Self {
            builder,
            aggregator: ResultAggregator::new(listing_system),
            filters: FilterSelection::default(),
            sort: SortCriterion::default(),
            position: None,
            generation: 0,
            total: 0,
            overlay: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ProximityQueryBuilder::from_config(config),
            config.listing_coord_system,
        )
    }

    /// Sets the query point from a coordinate in any system.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] if the coordinate is not finite; the
    /// previous position is kept.
    pub fn set_position(&mut self, coordinate: Coordinate) -> Result<&QueryPosition, GeoError> {
        if !coordinate.is_finite() {
            return Err(GeoError::NonFinite {
                lng: coordinate.longitude(),
                lat: coordinate.latitude(),
            });
        }
        let canonical = coordinate.to_canonical();
        let shown = if coordinate.system() == CoordSystem::Bd09 {
            coordinate
        } else {
            canonical.to_display()?
        };
        tracing::debug!(%canonical, %shown, "query position updated");
        Ok(&*self.position.insert(QueryPosition {
            canonical,
            display: shown,
        }))
    }

    /// Map click or search-box result, both reported in `BD09`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] for a non-finite point.
    pub fn set_position_bd09(&mut self, lng: f64, lat: f64) -> Result<&QueryPosition, GeoError> {
        self.set_position(Coordinate::new(lng, lat, CoordSystem::Bd09)?)
    }

    /// # Errors
    ///
    /// Returns [`GeoError::NonFinite`] for a non-finite fix.
    pub fn set_position_from_fix(
        &mut self,
        fix: &GeolocationFix,
    ) -> Result<&QueryPosition, GeoError> {
        self.set_position(fix.coordinate()?)
    }

    /// Replaces the filter selection.
    ///
    /// Clearing the distance invalidates any in-flight search and clears
    /// results, overlay and heatmap immediately.
    pub fn set_filters(&mut self, selection: FilterSelection) {
        self.filters = selection.gated();
        if !QueryFilter::from_selection(&self.filters).search_enabled() {
            self.disable();
        }
    }

    /// Changes the presentation order. Never re-queries.
    pub fn set_sort(&mut self, criterion: SortCriterion) {
        self.sort = criterion;
    }

    /// Starts a search cycle.
    ///
    /// Returns `None` when there is no query point yet, or when no usable
    /// distance is selected (in which case visible state is cleared). Every
    /// ticket issued makes all earlier tickets stale.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        let filter = QueryFilter::from_selection(&self.filters);
        if !filter.search_enabled() {
            self.disable();
            return None;
        }
        let position = self.position?;
        let Some(query) = self.builder.build_from_filter(&filter, &position.canonical) else {
            self.disable();
            return None;
        };

        self.generation += 1;
        self.overlay = RadiusOverlay::for_query(&query);
        tracing::info!(
            generation = self.generation,
            radius_km = query.radius_km,
            center = %query.center,
            "search issued"
        );
        Some(SearchTicket {
            generation: self.generation,
            query,
        })
    }

    /// Applies the answer for `ticket`, unless a newer ticket exists.
    ///
    /// An `Ok` envelope with `success: false` is treated as a failure.
    pub fn complete(
        &mut self,
        ticket: &SearchTicket,
        result: Result<NearbyResponse, SearchError>,
    ) -> SearchOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale search response"
            );
            return SearchOutcome::Stale;
        }

        let result = result.and_then(|response| {
            if response.success {
                Ok(response)
            } else {
                Err(SearchError::Backend(
                    response
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
                ))
            }
        });

        match result {
            Ok(response) => {
                let set = self.aggregator.ingest(response.houses);
                if set.is_empty() {
                    self.total = 0;
                    SearchOutcome::Empty
                } else {
                    self.total = response.total;
                    SearchOutcome::Found {
                        total: response.total,
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, generation = ticket.generation, "search failed");
                self.aggregator.clear();
                self.total = 0;
                SearchOutcome::Failed {
                    message: err.user_message(),
                }
            }
        }
    }

    /// Begin, fetch and complete in one call.
    pub async fn run_search<S: ListingSource>(&mut self, source: &S) -> SearchOutcome {
        let Some(ticket) = self.begin_search() else {
            return self.idle_outcome();
        };
        let result = source.fetch_nearby(ticket.query()).await;
        self.complete(&ticket, result)
    }

    /// Drops results and overlay and invalidates in-flight searches.
    /// Filters, sort order and position are kept.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.aggregator.clear();
        self.total = 0;
        self.overlay = None;
    }

    fn disable(&mut self) {
        tracing::debug!("distance filter cleared; search disabled");
        self.clear();
    }

    fn idle_outcome(&self) -> SearchOutcome {
        if self.position.is_some() || !QueryFilter::from_selection(&self.filters).search_enabled() {
            SearchOutcome::Disabled
        } else {
            SearchOutcome::AwaitingPosition
        }
    }

    #[must_use]
    pub fn results(&self) -> &AnnotatedResultSet {
        self.aggregator.current()
    }

    /// The live result set in the current sort order.
    #[must_use]
    pub fn sorted(&self) -> Vec<AnnotatedListing> {
        ranking::sort(self.aggregator.current().listings(), self.sort)
    }

    #[must_use]
    pub fn heatmap(&self) -> HeatmapDataSet {
        self.aggregator.heatmap()
    }

    #[must_use]
    pub fn cluster_points(&self) -> Vec<(Coordinate, f64)> {
        self.aggregator.cluster_points()
    }

    #[must_use]
    pub fn radius_overlay(&self) -> Option<&RadiusOverlay> {
        self.overlay.as_ref()
    }

    /// Backend-reported total for the last applied search.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn position(&self) -> Option<&QueryPosition> {
        self.position.as_ref()
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    #[must_use]
    pub fn sort_criterion(&self) -> SortCriterion {
        self.sort
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// System the backend reports listing coordinates in.
    #[must_use]
    pub fn listing_system(&self) -> CoordSystem {
        self.aggregator.source_system()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
