//! Squared-error loss for online training.
//!
//! - [`squared_error`] - per-sample loss and residual, drives every update
//! - [`mean_squared_error`] - dataset-level reporting
//!
//! The residual is `target - prediction`, the error signal the online update
//! adds to the weights.
//!
//! # Example
//!
//! ```rust
//! use rbfn::loss::squared_error;
//!
//! let (loss, residual) = squared_error(&[0.5, 1.0], &[1.0, 1.0]);
//! assert_eq!(loss, 0.25);
//! assert_eq!(residual, vec![0.5, 0.0]);
//! ```

/// Sum of squared errors over the outputs of one sample.
///
/// # Returns
///
/// Tuple of (loss, residual):
/// - `loss`: `sum_o (target[o] - prediction[o])^2`
/// - `residual`: `target - prediction`, one entry per output
pub fn squared_error(predictions: &[f64], targets: &[f64]) -> (f64, Vec<f64>) {
    debug_assert_eq!(predictions.len(), targets.len());

    let residual: Vec<f64> = targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| t - p)
        .collect();
    let loss = residual.iter().map(|e| e * e).sum();
    (loss, residual)
}

/// Mean squared error over flattened predictions and targets.
///
/// Returns `0.0` for empty inputs.
pub fn mean_squared_error(predictions: &[f64], targets: &[f64]) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());

    if predictions.is_empty() {
        return 0.0;
    }
    let (loss, _) = squared_error(predictions, targets);
    loss / predictions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_error_sign() {
        let (loss, residual) = squared_error(&[2.0, -1.0], &[1.0, 1.0]);
        assert_eq!(loss, 5.0);
        assert_eq!(residual, vec![-1.0, 2.0]);
    }

    #[test]
    fn test_mse_perfect() {
        assert_eq!(mean_squared_error(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_mse_average() {
        let mse = mean_squared_error(&[0.0, 0.0, 0.0, 0.0], &[1.0, 1.0, 2.0, 0.0]);
        assert!((mse - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_mse_empty() {
        assert_eq!(mean_squared_error(&[], &[]), 0.0);
    }
}
