//! Result of classifying one image.

use serde::Serialize;

/// Predicted label and the model's probability for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Index of the winning class.
    pub class_index: usize,
    /// Label from the class map, or the index when the map has no entry.
    pub label: String,
    /// Output value at `class_index`, in `[0, 1]`.
    pub confidence: f32,
}

impl Prediction {
    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        confidence_percent(self.confidence)
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.2}%)", self.label, self.confidence_percent())
    }
}

/// Formats a probability as a percentage with two decimals, e.g. `0.8734 -> 87.34`.
pub fn confidence_percent(confidence: f32) -> f64 {
    (confidence as f64 * 10_000.0).round() / 100.0
}
