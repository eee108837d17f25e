//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{AccessibilityPreference, Mode};
use crate::format::FormattedResults;
use crate::plan::{Field, FieldError};

use super::dto::{PlaceResult, PlanJourneyRequest, Selection};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Planner page: the form, and whatever the last submission produced.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub form: FormView,
    /// API failure, shown as a banner above the form
    pub banner: Option<String>,
    /// "No journeys" and similar informational text
    pub info: Option<String>,
    pub results: Option<FormattedResults>,
    /// Other candidates for text that was resolved automatically
    pub alternatives: Vec<AlternativesView>,
}

impl IndexTemplate {
    /// The empty form.
    pub fn blank() -> Self {
        Self::refilled(FormView::default())
    }

    /// The page with `form` and nothing else yet.
    pub fn refilled(form: FormView) -> Self {
        Self {
            form,
            banner: None,
            info: None,
            results: None,
            alternatives: Vec::new(),
        }
    }
}

/// About page.
#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate;

// ============================================================================
// Fragment Templates (no base.html)
// ============================================================================

/// Suggestion list fragment for place search.
#[derive(Template)]
#[template(path = "suggestions.html")]
pub struct SuggestionsTemplate {
    pub query: String,
    pub places: Vec<PlaceResult>,
    pub unavailable: Option<String>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Runners-up for one field's typed text.
#[derive(Debug, Clone)]
pub struct AlternativesView {
    /// "From" or "To"
    pub label: &'static str,
    pub text: String,
    pub choices: Vec<AlternativeView>,
}

/// A link that re-plans with this place picked.
#[derive(Debug, Clone)]
pub struct AlternativeView {
    pub display_name: String,
    pub kind: &'static str,
    pub href: String,
}

/// A checkbox in the form.
#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub value: &'static str,
    pub label: String,
    pub checked: bool,
}

/// The journey form, refilled with what the user submitted.
#[derive(Debug, Clone)]
pub struct FormView {
    pub origin: String,
    pub origin_id: String,
    pub origin_kind: String,
    pub origin_name: String,
    pub origin_error: Option<String>,
    pub destination: String,
    pub destination_id: String,
    pub destination_kind: String,
    pub destination_name: String,
    pub destination_error: Option<String>,
    /// `now`, `depart` or `arrive`
    pub when: String,
    pub date: String,
    pub time: String,
    pub modes: Vec<ChoiceView>,
    pub accessibility: Vec<ChoiceView>,
}

impl Default for FormView {
    fn default() -> Self {
        Self {
            origin: String::new(),
            origin_id: String::new(),
            origin_kind: String::new(),
            origin_name: String::new(),
            origin_error: None,
            destination: String::new(),
            destination_id: String::new(),
            destination_kind: String::new(),
            destination_name: String::new(),
            destination_error: None,
            when: "now".to_string(),
            date: String::new(),
            time: String::new(),
            modes: mode_choices(|m| Mode::DEFAULT.contains(&m)),
            accessibility: accessibility_choices(|_| false),
        }
    }
}

impl FormView {
    /// Refill the form from a submission.
    ///
    /// A picked suggestion is carried forward only while its text is unedited.
    pub fn from_request(req: &PlanJourneyRequest) -> Self {
        let (origin_id, origin_kind, origin_name) = hidden(req.selection(Field::Origin));
        let (destination_id, destination_kind, destination_name) =
            hidden(req.selection(Field::Destination));
        Self {
            origin: req.origin.clone(),
            origin_id,
            origin_kind,
            origin_name,
            origin_error: None,
            destination: req.destination.clone(),
            destination_id,
            destination_kind,
            destination_name,
            destination_error: None,
            when: req.when.clone().unwrap_or_else(|| "now".to_string()),
            date: req.date.clone().unwrap_or_default(),
            time: req.time.clone().unwrap_or_default(),
            modes: mode_choices(|m| req.modes.iter().any(|v| v == m.as_str())),
            accessibility: accessibility_choices(|p| {
                req.accessibility.iter().any(|v| v == p.as_str())
            }),
        }
    }

    /// Attach field errors next to their inputs.
    pub fn with_errors(mut self, errors: &[FieldError]) -> Self {
        for error in errors {
            let slot = match error.field {
                Field::Origin => &mut self.origin_error,
                Field::Destination => &mut self.destination_error,
            };
            slot.get_or_insert_with(|| error.message.clone());
        }
        self
    }

    pub fn is_when(&self, value: &str) -> bool {
        self.when == value
    }
}

fn hidden(selection: Option<Selection<'_>>) -> (String, String, String) {
    match selection {
        Some(s) => (
            s.id.to_string(),
            s.kind.unwrap_or_default().to_string(),
            s.text.to_string(),
        ),
        None => Default::default(),
    }
}

fn mode_choices(checked: impl Fn(Mode) -> bool) -> Vec<ChoiceView> {
    Mode::ALL
        .into_iter()
        .map(|m| ChoiceView {
            value: m.as_str(),
            label: mode_label(m),
            checked: checked(m),
        })
        .collect()
}

fn accessibility_choices(checked: impl Fn(AccessibilityPreference) -> bool) -> Vec<ChoiceView> {
    AccessibilityPreference::ALL
        .into_iter()
        .map(|p| ChoiceView {
            value: p.as_str(),
            label: p.label().to_string(),
            checked: checked(p),
        })
        .collect()
}

fn mode_label(mode: Mode) -> String {
    match mode {
        Mode::Dlr => "DLR".to_string(),
        other => {
            let id = other.as_str().replace('-', " ");
            let mut chars = id.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
