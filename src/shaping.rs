//! Output shaping: how kernel activations become network outputs.
//!
//! | Shaping      | Activation         | Output `y[o]`                                      |
//! |--------------|--------------------|----------------------------------------------------|
//! | `Plain`      | `g`                | `sum_b g[b] * w[o][b]`                             |
//! | `Normalized` | `g / sum(g)`       | `sum_b g[b] * w[o][b]`                             |
//! | `Hyperplane` | `g / sum(g)`       | `sum_b g[b] * (w[o][b] + sum_d v[o][b][d] c[b][d])` |
//!
//! where `w` are the output weights (`O x B`), `v` the center weights
//! (`O x B x D`) and `c` the kernel distance (`B x D`).
//!
//! Normalization is an unguarded division: a zero activation sum yields
//! non-finite outputs, which propagate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output-shaping strategy of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutputShaping {
    /// Raw activations weighted by the output matrix.
    #[default]
    Plain,
    /// Activations rescaled to a partition of unity.
    Normalized,
    /// Normalized activations plus a per-center local-linear correction.
    Hyperplane,
}

impl OutputShaping {
    /// Whether activations are rescaled to sum to one.
    #[inline]
    pub fn is_normalized(self) -> bool {
        !matches!(self, OutputShaping::Plain)
    }

    /// Whether the network carries center weights.
    #[inline]
    pub fn has_hyperplane(self) -> bool {
        matches!(self, OutputShaping::Hyperplane)
    }

    /// Applies the activation step in place; returns the raw activation sum.
    pub(crate) fn shape_activation(self, g: &mut [f64]) -> f64 {
        if self.is_normalized() {
            normalize(g)
        } else {
            g.iter().sum()
        }
    }
}

/// Rescales `g` in place so it sums to one and returns the original sum.
///
/// A zero (or non-finite) sum is not guarded: the result is NaN/Inf.
///
/// # Example
///
/// ```rust
/// use rbfn::shaping::normalize;
///
/// let mut g = vec![1.0, 3.0];
/// let raw = normalize(&mut g);
/// assert_eq!(raw, 4.0);
/// assert_eq!(g, vec![0.25, 0.75]);
/// ```
pub fn normalize(g: &mut [f64]) -> f64 {
    let sum: f64 = g.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        log::warn!(
            "degenerate activation sum {} over {} bases, output will be non-finite",
            sum,
            g.len()
        );
    }
    for v in g.iter_mut() {
        *v /= sum;
    }
    sum
}

/// Hyperplane term `hp[o][b] = sum_d v[o][b][d] * c[b][d]`, `[O * B]`.
pub(crate) fn hyperplane_term(
    center_weights: &[f64],
    distance: &[f64],
    output_dim: usize,
    bases: usize,
    input_dim: usize,
) -> Vec<f64> {
    debug_assert_eq!(center_weights.len(), output_dim * bases * input_dim);
    debug_assert_eq!(distance.len(), bases * input_dim);

    center_weights
        .chunks_exact(input_dim)
        .enumerate()
        .map(|(ob, v)| {
            let b = ob % bases;
            let c = &distance[b * input_dim..(b + 1) * input_dim];
            v.iter().zip(c).map(|(vi, ci)| vi * ci).sum()
        })
        .collect()
}

/// Output `y[o] = sum_b g[b] * (w[o][b] + hp[o][b])`, `[O]`.
pub(crate) fn combine(
    weights: &[f64],
    activation: &[f64],
    hyperplane: Option<&[f64]>,
    output_dim: usize,
) -> Vec<f64> {
    let bases = activation.len();
    debug_assert_eq!(weights.len(), output_dim * bases);

    (0..output_dim)
        .map(|o| {
            let row = &weights[o * bases..(o + 1) * bases];
            match hyperplane {
                Some(hp) => {
                    let hp_row = &hp[o * bases..(o + 1) * bases];
                    activation
                        .iter()
                        .zip(row.iter().zip(hp_row))
                        .map(|(g, (w, h))| g * (w + h))
                        .sum()
                }
                None => activation.iter().zip(row).map(|(g, w)| g * w).sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sums_to_one() {
        let mut g = vec![0.2, 0.1, 0.7, 1.3];
        normalize(&mut g);
        let sum: f64 = g.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_sum_propagates_nan() {
        let mut g = vec![0.0, 0.0];
        let raw = normalize(&mut g);
        assert_eq!(raw, 0.0);
        assert!(g.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_plain_keeps_raw_activation() {
        let mut g = vec![0.5, 0.25];
        let raw = OutputShaping::Plain.shape_activation(&mut g);
        assert_eq!(raw, 0.75);
        assert_eq!(g, vec![0.5, 0.25]);
    }

    #[test]
    fn test_hyperplane_term() {
        // O=2, B=2, D=2
        let v = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let c = vec![1.0, -1.0, 0.5, 0.5];
        let hp = hyperplane_term(&v, &c, 2, 2, 2);
        assert_eq!(hp, vec![-1.0, 3.5, -1.0, 7.5]);
    }

    #[test]
    fn test_combine() {
        let w = vec![1.0, 2.0, -1.0, 0.0];
        let g = vec![0.5, 0.25];
        assert_eq!(combine(&w, &g, None, 2), vec![1.0, -0.5]);

        let hp = vec![1.0, 0.0, 0.0, 4.0];
        assert_eq!(combine(&w, &g, Some(&hp), 2), vec![1.5, 0.5]);
    }

    #[test]
    fn test_flags() {
        assert!(!OutputShaping::Plain.is_normalized());
        assert!(OutputShaping::Normalized.is_normalized());
        assert!(OutputShaping::Hyperplane.is_normalized());
        assert!(OutputShaping::Hyperplane.has_hyperplane());
        assert!(!OutputShaping::Normalized.has_hyperplane());
    }
}
