//! Kernel adaptation: whether training also moves centers and widths.
//!
//! With [`Adaptation::Kernel`] every online step, after the output (and
//! center) weights are updated, computes a `B x D` step for the Gaussian
//! kernel parameters:
//!
//! ```text
//! m1[b][d]    = 2 * c[b][d] / sigma[b][d]
//! m2[o][b]    = sum_d v[o][b][d] * c[b][d]          (hyperplane only, else 0)
//! m3[o][b]    = w[o][b] - p[o]
//! m4[o][b][d] = v[o][b][d] / sigma[b][d]            (hyperplane only, else 0)
//!
//! step[b][d]  = eta * sum_o delta[o][b] * (m1[b][d] * (m2[o][b] + m3[o][b]) - m4[o][b][d])
//!
//! mu    += step
//! sigma += step * c
//! ```
//!
//! `delta[o][b] = error[o] * g[b]` is the unscaled output error tiled over
//! the bases, `w` and `v` are the weights *after* this sample's update, and
//! `c`, `p`, `sigma` come from the sample's forward pass. These are
//! approximations rather than exact derivatives (`m3` stands in for the
//! gradient through the normalization); they are kept as-is.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default kernel learning rate used by the config builder.
pub const DEFAULT_ETA: f64 = 0.01;

/// Kernel adaptation strategy of a network.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Adaptation {
    /// Kernel parameters stay fixed; only output weights learn.
    #[default]
    Fixed,
    /// Gaussian centers and widths learn with rate `eta`.
    Kernel {
        /// Kernel-parameter learning rate.
        eta: f64,
    },
}

impl Adaptation {
    /// Kernel learning rate, if the kernel adapts.
    #[inline]
    pub fn eta(self) -> Option<f64> {
        match self {
            Adaptation::Fixed => None,
            Adaptation::Kernel { eta } => Some(eta),
        }
    }

    /// Whether the kernel adapts.
    #[inline]
    pub fn is_adaptive(self) -> bool {
        matches!(self, Adaptation::Kernel { .. })
    }
}

/// Everything one kernel step reads, borrowed from the network and the
/// sample's forward pass.
pub(crate) struct KernelStep<'a> {
    /// Unscaled `error ⊗ g`, `[O * B]`.
    pub delta: &'a [f64],
    /// Updated output weights, `[O * B]`.
    pub weights: &'a [f64],
    /// Updated center weights, `[O * B * D]`.
    pub center_weights: Option<&'a [f64]>,
    /// Prediction of the forward pass, `[O]`.
    pub prediction: &'a [f64],
    /// Kernel distance of the forward pass, `[B * D]`.
    pub distance: &'a [f64],
    /// Gaussian widths before the step, `[B * D]`.
    pub sigma: &'a [f64],
    pub bases: usize,
    pub input_dim: usize,
}

impl KernelStep<'_> {
    /// Computes the `[B * D]` center step scaled by `eta`.
    pub(crate) fn compute(&self, eta: f64) -> Vec<f64> {
        let (bases, dim) = (self.bases, self.input_dim);
        let output_dim = self.prediction.len();
        debug_assert_eq!(self.delta.len(), output_dim * bases);
        debug_assert_eq!(self.weights.len(), output_dim * bases);
        debug_assert_eq!(self.distance.len(), bases * dim);
        debug_assert_eq!(self.sigma.len(), bases * dim);

        let mut step = vec![0.0; bases * dim];
        for (o, &p) in self.prediction.iter().enumerate() {
            for b in 0..bases {
                let ob = o * bases + b;
                let c = &self.distance[b * dim..(b + 1) * dim];
                let sigma = &self.sigma[b * dim..(b + 1) * dim];
                let m3 = self.weights[ob] - p;
                let v = self.center_weights.map(|v| &v[ob * dim..(ob + 1) * dim]);
                let m2: f64 = match v {
                    Some(v) => v.iter().zip(c).map(|(vi, ci)| vi * ci).sum(),
                    None => 0.0,
                };

                for d in 0..dim {
                    let m1 = 2.0 * c[d] / sigma[d];
                    let inner = match v {
                        Some(v) => m1 * (m2 + m3) - v[d] / sigma[d],
                        None => m1 * m3,
                    };
                    step[b * dim + d] += self.delta[ob] * inner;
                }
            }
        }

        for s in step.iter_mut() {
            *s *= eta;
        }
        step
    }
}
