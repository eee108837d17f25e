//! Address geocoding via OpenStreetMap Nominatim.
//!
//! Used as a last resort when TfL autocomplete finds nothing for the
//! user's text, so that street addresses still resolve to coordinates.

mod client;
mod error;

pub use client::{NominatimClient, NominatimConfig};
pub use error::GeocodeError;

use crate::domain::Place;

/// Free-text address lookup.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    /// Resolve an address to a place, or `None` if nothing matched.
    async fn geocode(&self, address: &str) -> Result<Option<Place>, GeocodeError>;
}
