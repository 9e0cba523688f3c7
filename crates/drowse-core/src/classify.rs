//! Eyes-closed decision.

/// Returns true when the eye-aspect ratio is below the threshold.
///
/// No range checks: negative or >1.0 inputs compare like any other number.
/// A score equal to the threshold counts as open.
pub fn classify(score: f64, threshold: f64) -> bool {
    score < threshold
}
