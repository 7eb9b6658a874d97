//! Loss functions over prediction/target sequences.
//!
//! The cross-entropy derivatives are taken with respect to the logits feeding a softmax layer,
//! which collapses to `p_i - y_i`.

use crate::error::LossError;

/// Default clipping margin keeping `log` away from zero.
pub const DEFAULT_EPSILON: f64 = 1e-12;

/// Targets at or below this are treated as absent from the cross-entropy sum.
const TARGET_THRESHOLD: f64 = 1e-9;

fn check_lengths(predictions: &[f64], targets: &[f64]) -> Result<(), LossError> {
    if predictions.len() != targets.len() {
        return Err(LossError::LengthMismatch {
            predictions: predictions.len(),
            targets: targets.len(),
        });
    }
    Ok(())
}

fn check_class(predictions: &[f64], class: usize) -> Result<(), LossError> {
    if predictions.is_empty() {
        return Err(LossError::EmptyPredictions);
    }
    if class >= predictions.len() {
        return Err(LossError::ClassOutOfRange {
            index: class,
            len: predictions.len(),
        });
    }
    Ok(())
}

fn clip(p: f64, epsilon: f64) -> f64 {
    p.max(epsilon).min(1.0 - epsilon)
}

/// L = (1/N) Σ (p_i - t_i)². Zero for empty input.
pub fn mean_squared_error(predictions: &[f64], targets: &[f64]) -> Result<f64, LossError> {
    check_lengths(predictions, targets)?;
    if predictions.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t) * (p - t))
        .sum();
    Ok(sum / predictions.len() as f64)
}

/// dL/dp_i = (2/N)(p_i - t_i)
pub fn mean_squared_error_derivative(
    predictions: &[f64],
    targets: &[f64],
) -> Result<Vec<f64>, LossError> {
    check_lengths(predictions, targets)?;
    let n = predictions.len() as f64;
    Ok(predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| 2.0 / n * (p - t))
        .collect())
}

/// L = -Σ t_i log(clip(p_i)), with predictions clipped into `[epsilon, 1 - epsilon]`.
pub fn categorical_cross_entropy(
    predictions: &[f64],
    targets: &[f64],
    epsilon: f64,
) -> Result<f64, LossError> {
    check_lengths(predictions, targets)?;
    let loss: f64 = predictions
        .iter()
        .zip(targets)
        .filter(|(_, t)| **t > TARGET_THRESHOLD)
        .map(|(p, t)| t * clip(*p, epsilon).ln())
        .sum();
    Ok(-loss)
}

/// Cross-entropy when the target is given as a class index: L = -log(clip(p_class)).
pub fn categorical_cross_entropy_with_index(
    predictions: &[f64],
    class: usize,
    epsilon: f64,
) -> Result<f64, LossError> {
    check_class(predictions, class)?;
    Ok(-clip(predictions[class], epsilon).ln())
}

pub fn softmax_cross_entropy_derivative(
    predictions: &[f64],
    targets: &[f64],
) -> Result<Vec<f64>, LossError> {
    check_lengths(predictions, targets)?;
    Ok(predictions.iter().zip(targets).map(|(p, t)| p - t).collect())
}

pub fn softmax_cross_entropy_derivative_with_index(
    predictions: &[f64],
    class: usize,
) -> Result<Vec<f64>, LossError> {
    check_class(predictions, class)?;
    Ok(predictions
        .iter()
        .enumerate()
        .map(|(i, p)| if i == class { p - 1.0 } else { *p })
        .collect())
}
