//! Win-probability model.
//!
//! Pure function from stats to a prediction. Track history is weighted over
//! recent form (0.6/0.4), and the power term rewards consistently strong
//! combined scores super-linearly. The clamp keeps output in a believable
//! probability band.

use crate::types::{DriverStats, PredictionResult};

const HISTORICAL_WEIGHT: f64 = 0.6;
const FORM_WEIGHT: f64 = 0.4;

const EXPONENT: f64 = 1.8;
const SCALE: f64 = 1.5;

const MIN_PROBABILITY: f64 = 1.0;
const MAX_PROBABILITY: f64 = 96.5;

/// Round to one decimal place.
pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Map stats to a win probability with its contribution breakdown.
///
/// Deterministic and total: identical stats always produce an identical
/// result, and the probability is always within [1.0, 96.5].
pub fn calculate_win_probability(stats: &DriverStats) -> PredictionResult {
    let weighted =
        stats.historical_score * HISTORICAL_WEIGHT + stats.recent_form_score * FORM_WEIGHT;

    let probability = (weighted.powf(EXPONENT) * SCALE).clamp(MIN_PROBABILITY, MAX_PROBABILITY);

    PredictionResult {
        probability: round1(probability),
        historical_contribution: stats.historical_score * HISTORICAL_WEIGHT * 10.0,
        form_contribution: stats.recent_form_score * FORM_WEIGHT * 10.0,
        raw_stats: stats.clone(),
        narrative: None,
    }
}
