//! The per-request planning pipeline.
//!
//! One submission of the journey form becomes one `PlanForm`, is resolved,
//! validated, sent, and either yields `PlanResults` or an explanation.
//! Nothing is kept between requests.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{JourneyOption, Place};
use crate::geocode::Geocoder;
use crate::query::{JourneyRequest, Preferences, QueryError};
use crate::resolver::{LocationResolver, ResolveError};
use crate::tfl::{TflError, TransitApi};

/// Which form field an input error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Origin,
    Destination,
}

/// An input problem reported next to its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Why planning failed.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The form needs fixing; nothing was sent to TfL.
    #[error("invalid input: {}", join_messages(.0))]
    Invalid(Vec<FieldError>),

    /// Location search failed while auto-resolving typed text.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The journey planner call failed.
    #[error(transparent)]
    Api(#[from] TflError),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// One submission of the journey form.
#[derive(Debug, Clone, Default)]
pub struct PlanForm {
    /// What the user typed for the origin.
    pub origin_text: String,
    /// The suggestion the user picked, if any. Wins over `origin_text`.
    pub origin: Option<Place>,
    pub destination_text: String,
    pub destination: Option<Place>,
    pub prefs: Preferences,
}

/// Journeys found for a request, with the context needed to show them.
#[derive(Debug, Clone)]
pub struct PlanResults {
    pub request: JourneyRequest,
    /// In TfL's order.
    pub options: Vec<JourneyOption>,
    /// Accessibility filters were dropped to find these.
    pub relaxed: bool,
    pub generated_at: DateTime<Tz>,
}

/// Endpoints settled for one submission.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub origin: Option<Place>,
    pub destination: Option<Place>,
    /// Runners-up for typed origin text, best first. Empty for a picked suggestion.
    pub origin_alternatives: Vec<Place>,
    pub destination_alternatives: Vec<Place>,
}

/// The result of a well-formed request.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Found(PlanResults),
    /// TfL had nothing for these inputs. Informational, not an error.
    NoJourneys {
        relaxed: bool,
        message: Option<String>,
    },
}

/// Runs the resolve → build → query pipeline against TfL.
pub struct JourneyPlanner<'a, A, G> {
    api: &'a A,
    resolver: LocationResolver<'a, A, G>,
}

impl<'a, A: TransitApi, G: Geocoder> JourneyPlanner<'a, A, G> {
    pub fn new(api: &'a A, geocoder: &'a G) -> Self {
        Self {
            api,
            resolver: LocationResolver::new(api, geocoder),
        }
    }

    /// Plan a journey for one form submission.
    ///
    /// `now` stamps the results. If TfL finds nothing with accessibility
    /// filters applied, the query is repeated once without them.
    pub async fn plan(&self, form: PlanForm, now: DateTime<Tz>) -> Result<PlanOutcome, PlanError> {
        let resolved = self.resolve(&form).await?;
        self.plan_resolved(&form, &resolved, now).await
    }

    /// Settle both endpoints of `form`.
    ///
    /// A picked suggestion is used as is. Typed text takes its best
    /// candidate, and the rest are kept so the user can switch to one.
    pub async fn resolve(&self, form: &PlanForm) -> Result<Resolved, ResolveError> {
        let (origin, origin_alternatives) = self
            .endpoint(form.origin.as_ref(), &form.origin_text)
            .await?;
        let (destination, destination_alternatives) = self
            .endpoint(form.destination.as_ref(), &form.destination_text)
            .await?;
        Ok(Resolved {
            origin,
            destination,
            origin_alternatives,
            destination_alternatives,
        })
    }

    /// Validate and run the query for endpoints already settled by [`Self::resolve`].
    pub async fn plan_resolved(
        &self,
        form: &PlanForm,
        resolved: &Resolved,
        now: DateTime<Tz>,
    ) -> Result<PlanOutcome, PlanError> {
        let origin = resolved.origin.clone();
        let destination = resolved.destination.clone();

        let mut errors = Vec::new();
        if origin.is_none() {
            errors.push(missing(Field::Origin, &form.origin_text));
        }
        if destination.is_none() {
            errors.push(missing(Field::Destination, &form.destination_text));
        }
        if !errors.is_empty() {
            return Err(PlanError::Invalid(errors));
        }

        let request = JourneyRequest::new(origin, destination, form.prefs.clone()).map_err(|e| {
            let field = match e {
                QueryError::MissingOrigin => Field::Origin,
                QueryError::MissingDestination | QueryError::SameEndpoints => Field::Destination,
            };
            PlanError::Invalid(vec![FieldError::new(field, e.to_string())])
        })?;

        let query = request.to_query();
        info!(from = %query.from, to = %query.to, "Planning journey");

        let (options, relaxed) = match self.api.journey_results(&query).await {
            Ok(options) => (options, false),
            Err(TflError::NotFound { .. }) if query.has_accessibility() => {
                debug!("No journeys with accessibility filters, relaxing");
                match self
                    .api
                    .journey_results(&query.without_accessibility())
                    .await
                {
                    Ok(options) => (options, true),
                    Err(TflError::NotFound { message }) => {
                        return Ok(PlanOutcome::NoJourneys {
                            relaxed: true,
                            message: Some(message),
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(TflError::NotFound { message }) => {
                return Ok(PlanOutcome::NoJourneys {
                    relaxed: false,
                    message: Some(message),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if options.is_empty() {
            return Ok(PlanOutcome::NoJourneys {
                relaxed,
                message: None,
            });
        }

        Ok(PlanOutcome::Found(PlanResults {
            request,
            options,
            relaxed,
            generated_at: now,
        }))
    }

    async fn endpoint(
        &self,
        selected: Option<&Place>,
        text: &str,
    ) -> Result<(Option<Place>, Vec<Place>), ResolveError> {
        if let Some(place) = selected {
            return Ok((Some(place.clone()), Vec::new()));
        }
        if text.trim().is_empty() {
            return Ok((None, Vec::new()));
        }
        let mut candidates = self.resolver.candidates(text).await?;
        let best = candidates.next();
        Ok((best, candidates.collect()))
    }
}

fn missing(field: Field, text: &str) -> FieldError {
    let text = text.trim();
    if text.is_empty() {
        let message = match field {
            Field::Origin => QueryError::MissingOrigin.to_string(),
            Field::Destination => QueryError::MissingDestination.to_string(),
        };
        FieldError::new(field, message)
    } else {
        FieldError::new(field, format!("location not found: \"{text}\""))
    }
}
