//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use chrono_tz::Europe::London;
use reqwest::Url;
use tower_http::services::ServeDir;
use tracing::{error, warn};

use crate::format::format_results;
use crate::plan::{Field, FieldError, JourneyPlanner, PlanError, PlanOutcome, Resolved};
use crate::resolver::{LocationResolver, ResolveError};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

const TIMED_OUT: &str = "Request timed out.";
const NO_JOURNEYS: &str = "No journeys found for the selected options.";
const NO_JOURNEYS_RELAXED: &str =
    "No journeys found, even without the accessibility filters.";

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/about", get(about_page))
        .route("/api/places/search", get(search_places))
        .route("/journey/plan", get(plan_journey))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with the journey form.
async fn index_page() -> IndexTemplate {
    IndexTemplate::blank()
}

/// About page.
async fn about_page() -> AboutTemplate {
    AboutTemplate
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn render(template: &impl Template) -> Result<String, AppError> {
    template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })
}

/// Autocomplete suggestions for a partial location.
async fn search_places(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<PlaceSearchRequest>,
) -> Result<Response, AppError> {
    let resolver = LocationResolver::new(state.tfl.as_ref(), state.geocoder.as_ref());
    let found = resolver.suggest(&req.q).await;

    if accepts_html(&headers) {
        // The fragment reports unavailability inline rather than as an error page
        let (places, unavailable): (Vec<PlaceResult>, Option<String>) = match found {
            Ok(suggestions) => (suggestions.map(|p| PlaceResult::from_place(&p)).collect(), None),
            Err(ResolveError::Unavailable(e)) => {
                warn!(query = %req.q, error = %e, "Location search unavailable");
                (Vec::new(), Some(e.to_string()))
            }
        };
        let html = render(&SuggestionsTemplate {
            query: req.q.trim().to_string(),
            places,
            unavailable,
        })?;
        return Ok(Html(html).into_response());
    }

    let places = found?
        .map(|p| PlaceResult::from_place(&p))
        .collect();
    Ok(Json(PlaceSearchResponse { places }).into_response())
}

/// Plan a journey from the submitted form.
///
/// Query pairs are taken raw since `mode` and `accessibility` repeat.
async fn plan_journey(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let req = PlanJourneyRequest::from_pairs(pairs);
    let now = Utc::now().with_timezone(&London);
    let html = accepts_html(&headers);

    let form = match req.to_form(now) {
        Ok(form) => form,
        Err(e) if html => {
            let mut page = IndexTemplate::refilled(FormView::from_request(&req));
            page.banner = Some(e.to_string());
            return Ok((StatusCode::BAD_REQUEST, Html(render(&page)?)).into_response());
        }
        Err(e) => {
            return Err(AppError::BadRequest {
                message: e.to_string(),
                fields: Vec::new(),
            });
        }
    };

    let planner = JourneyPlanner::new(state.tfl.as_ref(), state.geocoder.as_ref());

    if !html {
        return match planner.plan(form, now).await? {
            PlanOutcome::Found(results) => {
                let results = format_results(&results);
                let notices = results.notice_messages();
                Ok(Json(PlanJourneyResponse::Found { results, notices }).into_response())
            }
            PlanOutcome::NoJourneys { relaxed, message } => {
                Ok(Json(PlanJourneyResponse::NoJourneys {
                    relaxed,
                    message: no_journeys_message(relaxed, message),
                })
                .into_response())
            }
        };
    }

    let mut page = IndexTemplate::refilled(FormView::from_request(&req));
    let outcome = match planner.resolve(&form).await {
        Ok(resolved) => {
            page.alternatives = alternatives(&req, &resolved)?;
            planner.plan_resolved(&form, &resolved, now).await
        }
        Err(e) => Err(e.into()),
    };
    let status = match outcome {
        Ok(PlanOutcome::Found(results)) => {
            page.results = Some(format_results(&results));
            StatusCode::OK
        }
        Ok(PlanOutcome::NoJourneys { relaxed, message }) => {
            page.info = Some(no_journeys_message(relaxed, message));
            StatusCode::OK
        }
        Err(e) => {
            let err = AppError::from(e);
            err.log();
            match &err {
                AppError::BadRequest { fields, .. } if !fields.is_empty() => {
                    page.form = page.form.with_errors(fields);
                }
                other => page.banner = Some(other.message().to_string()),
            }
            err.status()
        }
    };

    Ok((status, Html(render(&page)?)).into_response())
}

/// "Did you mean" links for fields whose typed text had several candidates.
fn alternatives(
    req: &PlanJourneyRequest,
    resolved: &Resolved,
) -> Result<Vec<AlternativesView>, AppError> {
    let fields = [
        (Field::Origin, "From", &req.origin, &resolved.origin_alternatives),
        (
            Field::Destination,
            "To",
            &req.destination,
            &resolved.destination_alternatives,
        ),
    ];
    let mut views = Vec::new();
    for (field, label, text, places) in fields {
        if places.is_empty() {
            continue;
        }
        let choices: Vec<AlternativeView> = places
            .iter()
            .map(|place| -> Result<AlternativeView, AppError> {
                let place = PlaceResult::from_place(place);
                Ok(AlternativeView {
                    href: plan_href(&req.with_selection(field, &place))?,
                    kind: place.kind.label(),
                    display_name: place.display_name,
                })
            })
            .collect::<Result<_, AppError>>()?;
        views.push(AlternativesView {
            label,
            text: text.trim().to_string(),
            choices,
        });
    }
    Ok(views)
}

/// Relative link to the planner for `req`.
fn plan_href(req: &PlanJourneyRequest) -> Result<String, AppError> {
    let mut url = Url::parse("http://localhost/journey/plan").map_err(|e| AppError::Internal {
        message: format!("Link error: {}", e),
    })?;
    url.query_pairs_mut().extend_pairs(req.to_pairs());
    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

fn no_journeys_message(relaxed: bool, message: Option<String>) -> String {
    if relaxed {
        NO_JOURNEYS_RELAXED.to_string()
    } else {
        message.unwrap_or_else(|| NO_JOURNEYS.to_string())
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
        fields: Vec<FieldError>,
    },
    /// An upstream service failed; `message` is passed through verbatim.
    BadGateway { message: String },
    /// An upstream service did not answer in time.
    GatewayTimeout,
    Internal { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message, .. }
            | AppError::BadGateway { message }
            | AppError::Internal { message } => message,
            AppError::GatewayTimeout => TIMED_OUT,
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = self.message(), "Request failed");
        } else {
            warn!(%status, message = self.message(), "Request rejected");
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Unavailable(ref cause) if cause.is_timeout() => AppError::GatewayTimeout,
            e => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Invalid(fields) => AppError::BadRequest {
                message: PlanError::Invalid(fields.clone()).to_string(),
                fields,
            },
            PlanError::Resolve(e) => e.into(),
            PlanError::Api(e) if e.is_timeout() => AppError::GatewayTimeout,
            PlanError::Api(e) => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status();
        let body = match self {
            AppError::BadRequest { message, fields } => ErrorResponse {
                error: message,
                fields,
            },
            AppError::BadGateway { message } | AppError::Internal { message } => ErrorResponse {
                error: message,
                fields: Vec::new(),
            },
            AppError::GatewayTimeout => ErrorResponse {
                error: TIMED_OUT.to_string(),
                fields: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfl::TflError;

    #[test]
    fn accepts_html_header() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_html(&headers));

        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(!accepts_html(&headers));

        headers.insert(
            header::ACCEPT,
            "text/html,application/xhtml+xml".parse().unwrap(),
        );
        assert!(accepts_html(&headers));
    }

    #[test]
    fn plan_errors_map_to_statuses() {
        let err = AppError::from(PlanError::Invalid(vec![FieldError {
            field: Field::Origin,
            message: "please choose where you are travelling from".into(),
        }]));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = AppError::from(PlanError::Api(TflError::Api {
            status: 400,
            message: "The following modes are not valid: hovercraft".into(),
        }));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.message(),
            "API error 400: The following modes are not valid: hovercraft"
        );
    }

    #[test]
    fn no_journeys_messages() {
        assert_eq!(no_journeys_message(false, None), NO_JOURNEYS);
        assert_eq!(
            no_journeys_message(false, Some("No journey found for your inputs.".into())),
            "No journey found for your inputs."
        );
        assert_eq!(
            no_journeys_message(true, Some("ignored".into())),
            NO_JOURNEYS_RELAXED
        );
    }
}
