//! Application state for the web layer.

use std::sync::Arc;

use crate::geocode::NominatimClient;
use crate::tfl::TflClient;

/// Shared application state.
///
/// Immutable after startup; each request builds its own planner from it.
#[derive(Clone)]
pub struct AppState {
    /// TfL Unified API client
    pub tfl: Arc<TflClient>,

    /// Address fallback for the location resolver
    pub geocoder: Arc<NominatimClient>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(tfl: TflClient, geocoder: NominatimClient) -> Self {
        Self {
            tfl: Arc::new(tfl),
            geocoder: Arc::new(geocoder),
        }
    }
}
