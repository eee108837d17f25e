//! Result formatting.
//!
//! Flattens planned journeys into display rows. Options keep the order TfL
//! returned them in. Missing optional data is spelled out rather than left
//! blank, and a step-free request with no step-free option gets an explicit
//! notice.

use serde::Serialize;

use crate::domain::{JourneyOption, Leg, mode_icon};
use crate::plan::PlanResults;

/// Shown where a stop name is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown where TfL could not price a journey.
pub const NO_FARE: &str = "Fare information not available";

/// Something the user should read before the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Accessibility filters were dropped to find any journey at all.
    Relaxed,
    /// An accessible route was asked for and none of the options is step-free.
    NoStepFreeRoute,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Relaxed => {
                "No journeys matched the accessibility filters; \
                 here are alternative journeys without them."
            }
            Notice::NoStepFreeRoute => "No step-free route was found.",
        }
    }
}

/// Everything the results panel shows.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedResults {
    pub origin: String,
    pub destination: String,
    pub notices: Vec<Notice>,
    pub options: Vec<OptionView>,
    /// London time the results were produced, e.g. "2024-03-15 10:02 GMT".
    pub generated_at: String,
}

impl FormattedResults {
    pub fn notice_messages(&self) -> Vec<&'static str> {
        self.notices.iter().map(Notice::message).collect()
    }
}

/// One route option.
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    /// 1-based position in TfL's ranking.
    pub number: usize,
    pub duration_mins: u32,
    /// "£2.80", or [`NO_FARE`].
    pub fare: String,
    pub fare_known: bool,
    pub walking_mins: u32,
    pub changes: usize,
    /// London "HH:MM".
    pub departs: String,
    pub arrives: String,
    /// London date of departure, e.g. "Fri, 15 Mar 2024".
    pub date: String,
    pub step_free: bool,
    pub legs: Vec<LegView>,
}

impl OptionView {
    /// Summary line, e.g. "Route 1 – 25 mins • £2.80 • Walking 5 mins".
    pub fn header(&self) -> String {
        let fare = if self.fare_known { self.fare.as_str() } else { "-" };
        format!(
            "Route {} – {} mins • {} • Walking {} mins",
            self.number, self.duration_mins, fare, self.walking_mins
        )
    }

    pub fn from_option(number: usize, option: &JourneyOption) -> Self {
        Self {
            number,
            duration_mins: option.duration_mins,
            fare: option
                .fare_pence
                .map(format_pence)
                .unwrap_or_else(|| NO_FARE.to_string()),
            fare_known: option.fare_pence.is_some(),
            walking_mins: option.walking_mins(),
            changes: option.changes(),
            departs: option.start.format("%H:%M").to_string(),
            arrives: option.arrival.format("%H:%M").to_string(),
            date: option.start.format("%a, %d %b %Y").to_string(),
            step_free: option.is_step_free(),
            legs: option
                .legs
                .iter()
                .enumerate()
                .map(|(i, leg)| LegView::from_leg(i + 1, leg))
                .collect(),
        }
    }
}

/// One leg of a route option.
#[derive(Debug, Clone, Serialize)]
pub struct LegView {
    pub step: usize,
    pub icon: &'static str,
    /// Title-cased mode name, e.g. "National-Rail".
    pub mode: String,
    pub instruction: String,
    /// Absent for zero-length legs.
    pub duration_mins: Option<u32>,
    pub from: String,
    pub to: String,
    pub step_free: bool,
}

impl LegView {
    pub fn from_leg(step: usize, leg: &Leg) -> Self {
        Self {
            step,
            icon: mode_icon(&leg.mode),
            mode: title_case(&leg.mode_name),
            instruction: leg.instruction.clone(),
            duration_mins: Some(leg.duration_mins).filter(|d| *d > 0),
            from: leg
                .departure_point
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            to: leg
                .arrival_point
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            step_free: leg.is_step_free(),
        }
    }
}

/// Format planned journeys for display, preserving their order.
pub fn format_results(results: &PlanResults) -> FormattedResults {
    let options: Vec<OptionView> = results
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| OptionView::from_option(i + 1, option))
        .collect();

    let mut notices = Vec::new();
    if results.relaxed {
        notices.push(Notice::Relaxed);
    }
    if results.request.accessible() && !options.iter().any(|o| o.step_free) {
        notices.push(Notice::NoStepFreeRoute);
    }

    FormattedResults {
        origin: results.request.origin().name.clone(),
        destination: results.request.destination().name.clone(),
        notices,
        options,
        generated_at: results
            .generated_at
            .format("%Y-%m-%d %H:%M %Z")
            .to_string(),
    }
}

/// "£x.yy" from pence.
pub fn format_pence(pence: u32) -> String {
    format!("£{}.{:02}", pence / 100, pence % 100)
}

/// Uppercase the first letter of every alphabetic run.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{leg, london, option};
    use crate::domain::{AccessibilityPreference, Obstacle, Place, PlaceKind};
    use crate::query::{JourneyRequest, Preferences};
    use proptest::prelude::*;

    fn request(accessible: bool) -> JourneyRequest {
        let mut prefs = Preferences::default();
        if accessible {
            prefs
                .accessibility
                .insert(AccessibilityPreference::StepFreeToPlatform);
        }
        JourneyRequest::new(
            Some(Place::token("Euston", "940GZZLUEUS", PlaceKind::Stop)),
            Some(Place::token("Brixton", "940GZZLUBXN", PlaceKind::Stop)),
            prefs,
        )
        .unwrap()
    }

    fn results(accessible: bool, options: Vec<JourneyOption>) -> PlanResults {
        PlanResults {
            request: request(accessible),
            options,
            relaxed: false,
            generated_at: london(10, 2),
        }
    }

    #[test]
    fn no_step_free_notice_when_every_option_has_stairs() {
        let stairs = || leg("tube", 10, vec![Obstacle::Stairs]);
        let formatted = format_results(&results(
            true,
            vec![
                option(10, vec![stairs()]),
                option(20, vec![stairs(), leg("bus", 10, vec![Obstacle::Escalator])]),
            ],
        ));

        let count = formatted
            .notices
            .iter()
            .filter(|n| **n == Notice::NoStepFreeRoute)
            .count();
        assert_eq!(count, 1);
        assert_eq!(formatted.options.len(), 2);
        assert!(formatted.options.iter().all(|o| !o.step_free));
        assert_eq!(
            formatted.notice_messages(),
            vec!["No step-free route was found."]
        );
    }

    #[test]
    fn no_notice_when_a_step_free_option_exists() {
        let formatted = format_results(&results(
            true,
            vec![
                option(10, vec![leg("tube", 10, vec![Obstacle::Stairs])]),
                option(15, vec![leg("bus", 15, vec![])]),
            ],
        ));
        assert!(formatted.notices.is_empty());
        assert!(formatted.options[1].step_free);
    }

    #[test]
    fn no_notice_without_accessibility_request() {
        let formatted = format_results(&results(
            false,
            vec![option(10, vec![leg("tube", 10, vec![Obstacle::Stairs])])],
        ));
        assert!(formatted.notices.is_empty());
    }

    #[test]
    fn relaxed_results_say_so() {
        let mut r = results(true, vec![option(10, vec![leg("bus", 10, vec![])])]);
        r.relaxed = true;
        let formatted = format_results(&r);
        assert_eq!(formatted.notices, vec![Notice::Relaxed]);
    }

    #[test]
    fn missing_fields_are_explicit() {
        let mut bare = leg("walking", 0, vec![]);
        bare.departure_point = None;
        bare.arrival_point = None;
        let formatted = format_results(&results(false, vec![option(0, vec![bare])]));

        let view = &formatted.options[0];
        assert_eq!(view.fare, NO_FARE);
        assert!(!view.fare_known);
        assert_eq!(view.header(), "Route 1 – 0 mins • - • Walking 0 mins");
        assert_eq!(view.legs[0].from, NOT_AVAILABLE);
        assert_eq!(view.legs[0].to, NOT_AVAILABLE);
        assert_eq!(view.legs[0].duration_mins, None);
    }

    #[test]
    fn option_view_fields() {
        let mut journey = option(
            25,
            vec![leg("walking", 5, vec![]), leg("national-rail", 20, vec![])],
        );
        journey.fare_pence = Some(280);
        let formatted = format_results(&results(false, vec![journey]));

        let view = &formatted.options[0];
        assert_eq!(view.header(), "Route 1 – 25 mins • £2.80 • Walking 5 mins");
        assert_eq!(view.changes, 1);
        assert_eq!(view.departs, "10:00");
        assert_eq!(view.arrives, "10:25");
        assert_eq!(view.date, "Fri, 15 Mar 2024");
        assert_eq!(view.legs[1].mode, "National-Rail");
        assert_eq!(view.legs[1].icon, "🚂");
        assert_eq!(formatted.generated_at, "2024-03-15 10:02 GMT");
        assert_eq!(formatted.origin, "Euston");
        assert_eq!(formatted.destination, "Brixton");
    }

    #[test]
    fn pence_formatting() {
        assert_eq!(format_pence(0), "£0.00");
        assert_eq!(format_pence(5), "£0.05");
        assert_eq!(format_pence(280), "£2.80");
        assert_eq!(format_pence(1234), "£12.34");
    }

    #[test]
    fn title_casing() {
        assert_eq!(title_case("tube"), "Tube");
        assert_eq!(title_case("elizabeth-line"), "Elizabeth-Line");
        assert_eq!(title_case("DLR"), "Dlr");
        assert_eq!(title_case(""), "");
    }

    proptest! {
        #[test]
        fn order_is_preserved(durations in proptest::collection::vec(0u32..300, 0..12)) {
            let options: Vec<JourneyOption> = durations
                .iter()
                .map(|d| option(*d, vec![leg("bus", *d, vec![])]))
                .collect();
            let formatted = format_results(&results(false, options));

            let got: Vec<u32> = formatted.options.iter().map(|o| o.duration_mins).collect();
            prop_assert_eq!(got, durations);
            let numbers: Vec<usize> = formatted.options.iter().map(|o| o.number).collect();
            prop_assert_eq!(numbers, (1..=formatted.options.len()).collect::<Vec<_>>());
        }
    }
}
