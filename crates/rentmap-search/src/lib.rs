//! Proximity search over rental listings.
//!
//! A query point arrives in display space (`BD09`) or from geolocation
//! (`WGS84`); [`ProximityQueryBuilder`] turns it and the filter selection into
//! a `GCJ02` backend query, [`NearbyClient`] runs it, [`ResultAggregator`]
//! annotates the answer for display, and [`ranking::sort`] orders it.
//! [`SearchSession`] ties those together and discards stale answers.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod filter;
pub mod geolocation;
pub mod query;
pub mod ranking;
mod retry;
pub mod session;
pub mod types;

pub use aggregate::{
    AnnotatedListing, AnnotatedResultSet, HeatPoint, HeatmapDataSet, RadiusOverlay,
    ResultAggregator, HEATMAP_MAX,
};
pub use client::{ListingSource, NearbyClient};
pub use error::SearchError;
pub use filter::{FilterSelection, PriceBand, QueryFilter, RentType, RoomFilter};
pub use geolocation::{GeolocationError, GeolocationFix, GeolocationOptions};
pub use query::{ProximityQuery, ProximityQueryBuilder};
pub use ranking::SortCriterion;
pub use session::{QueryPosition, SearchOutcome, SearchSession, SearchTicket};
pub use types::{ListingRecord, LooseNumber, NearbyResponse};
