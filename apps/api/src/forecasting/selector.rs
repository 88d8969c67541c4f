use crate::models::forecast::VariantForecast;

/// Picks the variant with the highest predicted interview rate.
///
/// Ties keep the earliest forecast in input order. An empty slice yields `None`,
/// which simply means there is not enough history yet.
pub fn select_best_variant(forecasts: &[VariantForecast]) -> Option<&VariantForecast> {
    forecasts.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.predicted_interview_rate <= current.predicted_interview_rate => {
            Some(current)
        }
        _ => Some(candidate),
    })
}
