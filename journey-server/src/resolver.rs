//! Location resolution.
//!
//! Turns free text into candidate places: a postcode if the text is one,
//! then TfL place and stop point matches, then a geocoded street address
//! when TfL has nothing.

use std::collections::HashSet;

use futures::future::try_join;
use tracing::{debug, warn};

use crate::domain::{Place, is_postcode};
use crate::geocode::Geocoder;
use crate::tfl::{TflError, TransitApi};

/// Shortest text (in characters, after trimming) worth searching for.
pub const MIN_QUERY_CHARS: usize = 2;

/// `/Place/Search` is only useful from this length on.
const MIN_PLACE_SEARCH_CHARS: usize = 3;

/// Most TfL candidates offered.
const MAX_SUGGESTIONS: usize = 10;

/// Location search failed.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The autocomplete service could not be reached or answered with an error.
    #[error("location search is unavailable: {0}")]
    Unavailable(#[from] TflError),
}

/// Candidate places, best first.
///
/// A one-shot iterator: once consumed it cannot be restarted.
#[derive(Debug)]
pub struct Suggestions {
    inner: std::vec::IntoIter<Place>,
}

impl Suggestions {
    fn new(places: Vec<Place>) -> Self {
        Self {
            inner: places.into_iter(),
        }
    }

    /// No candidates.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl Iterator for Suggestions {
    type Item = Place;

    fn next(&mut self) -> Option<Place> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Suggestions {}

/// Resolves user text to places using TfL autocomplete and a geocoder.
pub struct LocationResolver<'a, A, G> {
    api: &'a A,
    geocoder: &'a G,
}

impl<'a, A: TransitApi, G: Geocoder> LocationResolver<'a, A, G> {
    pub fn new(api: &'a A, geocoder: &'a G) -> Self {
        Self { api, geocoder }
    }

    /// Candidate places for `text`.
    ///
    /// Text shorter than [`MIN_QUERY_CHARS`] yields no candidates and makes
    /// no network call.
    pub async fn suggest(&self, text: &str) -> Result<Suggestions, ResolveError> {
        let text = text.trim();
        let len = text.chars().count();
        if len < MIN_QUERY_CHARS {
            return Ok(Suggestions::empty());
        }

        let mut out = Vec::new();
        if is_postcode(text) {
            out.push(Place::postcode(text));
        }

        let places = async {
            if len >= MIN_PLACE_SEARCH_CHARS {
                self.api.search_places(text).await
            } else {
                Ok(Vec::new())
            }
        };
        let (places, stops) = try_join(places, self.api.search_stop_points(text)).await?;
        debug!(%text, places = places.len(), stops = stops.len(), "Autocomplete results");

        // Places first; a name seen once hides later duplicates.
        let mut seen = HashSet::new();
        out.extend(
            places
                .into_iter()
                .chain(stops)
                .filter(|p| seen.insert(p.name.clone()))
                .take(MAX_SUGGESTIONS),
        );

        if out.is_empty() {
            match self.geocoder.geocode(text).await {
                Ok(Some(address)) => out.push(address),
                Ok(None) => {}
                Err(e) => warn!(%text, error = %e, "Geocoding failed"),
            }
        }

        Ok(Suggestions::new(out))
    }

    /// The best candidate for `text`, if any.
    ///
    /// Postcodes resolve directly without a network call.
    pub async fn resolve(&self, text: &str) -> Result<Option<Place>, ResolveError> {
        Ok(self.candidates(text).await?.next())
    }

    /// Like [`Self::suggest`], except that a postcode is its only candidate.
    pub async fn candidates(&self, text: &str) -> Result<Suggestions, ResolveError> {
        if is_postcode(text) {
            return Ok(Suggestions::new(vec![Place::postcode(text)]));
        }
        self.suggest(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, PlaceKind};
    use crate::tfl::mock::{MockGeocoder, MockTransit};
    use proptest::prelude::*;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    fn kings_cross() -> Place {
        Place::token("King's Cross St. Pancras", "940GZZLUKSX", PlaceKind::Stop)
    }

    #[tokio::test]
    async fn kings_cross_yields_single_suggestion() {
        let api = MockTransit::new().with_stop_points(vec![kings_cross()]);
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        let suggestions: Vec<Place> = resolver.suggest("Kings Cross").await.unwrap().collect();

        assert_eq!(suggestions, vec![kings_cross()]);
        assert_eq!(*api.stop_calls.lock().unwrap(), vec!["Kings Cross".to_string()]);
        assert_eq!(*api.place_calls.lock().unwrap(), vec!["Kings Cross".to_string()]);
        assert_eq!(geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let api = MockTransit::new().with_stop_points(vec![kings_cross()]);
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        assert_eq!(resolver.suggest("").await.unwrap().count(), 0);
        assert_eq!(resolver.suggest("   ").await.unwrap().count(), 0);
        assert_eq!(resolver.suggest("K").await.unwrap().count(), 0);
        assert_eq!(api.call_count(), 0);
        assert_eq!(geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn two_characters_skip_place_search() {
        let api = MockTransit::new().with_stop_points(vec![kings_cross()]);
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        let found = resolver.suggest("Ki").await.unwrap().count();
        assert_eq!(found, 1);
        assert!(api.place_calls.lock().unwrap().is_empty());
        assert_eq!(api.stop_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn places_first_and_deduplicated_by_name() {
        let place = Place::token("Euston", "Euston", PlaceKind::Place);
        let dup = Place::token("Euston", "940GZZLUEUS", PlaceKind::Stop);
        let square = Place::token("Euston Square", "940GZZLUESQ", PlaceKind::Stop);
        let api = MockTransit::new()
            .with_places(vec![place.clone()])
            .with_stop_points(vec![dup, square.clone()]);
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        let found: Vec<Place> = resolver.suggest("Euston").await.unwrap().collect();
        assert_eq!(found, vec![place, square]);
    }

    #[tokio::test]
    async fn suggestions_are_capped() {
        let stops = (0..15)
            .map(|i| Place::token(format!("Stop {i}"), format!("ID{i}"), PlaceKind::Stop))
            .collect();
        let api = MockTransit::new().with_stop_points(stops);
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        let suggestions = resolver.suggest("Stop").await.unwrap();
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
    }

    #[tokio::test]
    async fn postcode_comes_first() {
        let api = MockTransit::new().with_stop_points(vec![kings_cross()]);
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        let found: Vec<Place> = resolver.suggest("nw1 2jh").await.unwrap().collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, PlaceKind::Postcode);
        assert_eq!(found[0].name, "NW1 2JH");
    }

    #[tokio::test]
    async fn resolve_postcode_without_network() {
        let api = MockTransit::new();
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        let place = resolver.resolve("EC2M 7PP").await.unwrap().unwrap();
        assert_eq!(place.kind, PlaceKind::Postcode);
        assert_eq!(resolver.candidates("EC2M 7PP").await.unwrap().len(), 1);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn geocoder_is_last_resort() {
        let address = Place::at(
            "221B Baker Street",
            Coordinates {
                lat: 51.5238,
                lon: -0.1586,
            },
            PlaceKind::Address,
        );
        let api = MockTransit::new();
        let geocoder = MockGeocoder::returning(address.clone());
        let resolver = LocationResolver::new(&api, &geocoder);

        let found = resolver.resolve("221B Baker Street").await.unwrap();
        assert_eq!(found, Some(address));
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn geocoder_failure_means_no_address() {
        let api = MockTransit::new();
        let geocoder = MockGeocoder::failing();
        let resolver = LocationResolver::new(&api, &geocoder);

        let found = resolver.suggest("Nowhere Lane").await.unwrap();
        assert_eq!(found.count(), 0);
    }

    #[tokio::test]
    async fn tfl_failure_is_unavailable() {
        let api = MockTransit::new().failing_search(503);
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(&api, &geocoder);

        let err = resolver.suggest("Kings Cross").await.unwrap_err();
        assert!(matches!(err, ResolveError::Unavailable(TflError::Api { status: 503, .. })));
        assert_eq!(geocoder.call_count(), 0);
    }

    proptest! {
        #[test]
        fn short_input_never_calls_out(text in "\\s{0,3}\\PC?\\s{0,3}") {
            let api = MockTransit::new().with_stop_points(vec![kings_cross()]);
            let geocoder = MockGeocoder::new();
            let resolver = LocationResolver::new(&api, &geocoder);

            let count = block_on(resolver.suggest(&text)).unwrap().count();

            prop_assert_eq!(count, 0);
            prop_assert_eq!(api.call_count(), 0);
            prop_assert_eq!(geocoder.call_count(), 0);
        }
    }
}
