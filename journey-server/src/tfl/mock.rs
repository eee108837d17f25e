//! In-memory TfL and geocoder stand-ins for unit tests.
//!
//! Responses are scripted up front; every call is counted so tests can
//! assert that validation short-circuits before any network traffic.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::{JourneyOption, Place};
use crate::geocode::{GeocodeError, Geocoder};
use crate::query::JourneyQuery;

use super::{TflError, TransitApi};

/// Scripted `TransitApi`.
#[derive(Default)]
pub struct MockTransit {
    pub places: Vec<Place>,
    pub stop_points: Vec<Place>,
    /// Autocomplete fails with this status when set.
    pub search_failure: Option<u16>,
    /// Journey responses, consumed one per call.
    pub journeys: Mutex<VecDeque<Result<Vec<JourneyOption>, TflError>>>,
    pub place_calls: Mutex<Vec<String>>,
    pub stop_calls: Mutex<Vec<String>>,
    pub journey_calls: Mutex<Vec<JourneyQuery>>,
}

impl MockTransit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_places(mut self, places: Vec<Place>) -> Self {
        self.places = places;
        self
    }

    pub fn with_stop_points(mut self, stops: Vec<Place>) -> Self {
        self.stop_points = stops;
        self
    }

    pub fn failing_search(mut self, status: u16) -> Self {
        self.search_failure = Some(status);
        self
    }

    pub fn then_journeys(self, response: Result<Vec<JourneyOption>, TflError>) -> Self {
        self.journeys.lock().unwrap().push_back(response);
        self
    }

    /// Total calls across every endpoint.
    pub fn call_count(&self) -> usize {
        self.place_calls.lock().unwrap().len()
            + self.stop_calls.lock().unwrap().len()
            + self.journey_calls.lock().unwrap().len()
    }

    pub fn journey_queries(&self) -> Vec<JourneyQuery> {
        self.journey_calls.lock().unwrap().clone()
    }

    fn search_result(&self, places: &[Place]) -> Result<Vec<Place>, TflError> {
        match self.search_failure {
            Some(status) => Err(TflError::Api {
                status,
                message: "Service Unavailable".to_string(),
            }),
            None => Ok(places.to_vec()),
        }
    }
}

impl TransitApi for MockTransit {
    async fn search_places(&self, query: &str) -> Result<Vec<Place>, TflError> {
        self.place_calls.lock().unwrap().push(query.to_string());
        self.search_result(&self.places)
    }

    async fn search_stop_points(&self, query: &str) -> Result<Vec<Place>, TflError> {
        self.stop_calls.lock().unwrap().push(query.to_string());
        self.search_result(&self.stop_points)
    }

    async fn journey_results(&self, query: &JourneyQuery) -> Result<Vec<JourneyOption>, TflError> {
        self.journey_calls.lock().unwrap().push(query.clone());
        self.journeys
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Scripted `Geocoder`.
#[derive(Default)]
pub struct MockGeocoder {
    pub result: Option<Place>,
    pub fail: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(place: Place) -> Self {
        Self {
            result: Some(place),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Place>, GeocodeError> {
        self.calls.lock().unwrap().push(address.to_string());
        if self.fail {
            return Err(GeocodeError::RateLimited);
        }
        Ok(self.result.clone())
    }
}
