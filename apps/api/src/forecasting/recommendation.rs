//! Recommendation rules — an ordered table of (condition → fixed sentence).
//!
//! The first rule whose condition holds wins. The final rule always matches.

use crate::forecasting::policy::ForecastPolicy;
use crate::models::forecast::Trend;

/// The signals a recommendation is chosen from.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInput {
    pub trend: Trend,
    pub current_interview_rate: f64,
    pub predicted_interview_rate: f64,
}

impl RecommendationInput {
    fn interview_delta(&self) -> f64 {
        self.predicted_interview_rate - self.current_interview_rate
    }
}

pub struct RecommendationRule {
    pub name: &'static str,
    pub applies: fn(&RecommendationInput, &ForecastPolicy) -> bool,
    pub template: &'static str,
}

pub const STRONG_IMPROVING: &str = "This version is gaining momentum with recruiters. \
    Keep using it for similar roles.";
pub const DECLINING_AND_LOW: &str = "Performance is declining and interviews are projected \
    to stay low. Refresh this version or retire it in favour of a stronger one.";
pub const PREDICTED_HIGHER: &str = "Interview rate is projected to rise over the coming weeks. \
    This version is worth prioritising.";
pub const PREDICTED_LOWER: &str = "Interview rate is projected to slip. Review recent \
    applications for mismatched roles before sending this version again.";
pub const STEADY: &str = "Performance is steady. Keep applying with this version to sharpen \
    the forecast.";

pub const RULES: &[RecommendationRule] = &[
    RecommendationRule {
        name: "strong_improving_trend",
        applies: |input, _| input.trend == Trend::Improving,
        template: STRONG_IMPROVING,
    },
    RecommendationRule {
        name: "declining_and_low",
        applies: |input, policy| {
            input.trend == Trend::Declining
                && input.predicted_interview_rate < policy.low_interview_rate
        },
        template: DECLINING_AND_LOW,
    },
    RecommendationRule {
        name: "predicted_higher",
        applies: |input, policy| input.interview_delta() > policy.rate_delta_threshold,
        template: PREDICTED_HIGHER,
    },
    RecommendationRule {
        name: "predicted_lower",
        applies: |input, policy| input.interview_delta() < -policy.rate_delta_threshold,
        template: PREDICTED_LOWER,
    },
    RecommendationRule {
        name: "steady",
        applies: |_, _| true,
        template: STEADY,
    },
];

/// Returns the first matching rule.
pub fn matching_rule(
    input: &RecommendationInput,
    policy: &ForecastPolicy,
) -> &'static RecommendationRule {
    RULES
        .iter()
        .find(|rule| (rule.applies)(input, policy))
        .unwrap_or(&RULES[RULES.len() - 1])
}
