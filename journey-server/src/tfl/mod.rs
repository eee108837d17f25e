//! TfL Unified API client.
//!
//! This module provides an HTTP client for the Transport for London
//! Unified API: autocomplete over places and stop points, and the journey
//! planner.
//!
//! Key characteristics of the API:
//! - Authentication is an `app_key` query parameter on every call
//! - Journey timestamps are London local time without an offset
//! - 404 means "nothing matched", with a human-readable `message`

mod client;
mod convert;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use client::{TflClient, TflConfig};
pub use convert::ConvertError;
pub use error::TflError;

use crate::domain::{JourneyOption, Place};
use crate::query::JourneyQuery;

/// The subset of the TfL API the planner needs.
///
/// This abstraction allows the resolver and planner to be tested with
/// mock data.
#[allow(async_fn_in_trait)]
pub trait TransitApi {
    /// Place autocomplete. Returns an empty list when nothing matched.
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, TflError>;

    /// Stop point autocomplete. Returns an empty list when nothing matched.
    async fn search_stop_points(&self, query: &str) -> Result<Vec<Place>, TflError>;

    /// Journey options for a query, in the order TfL ranked them.
    async fn journey_results(&self, query: &JourneyQuery) -> Result<Vec<JourneyOption>, TflError>;
}
