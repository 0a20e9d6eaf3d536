//! RBF network: kernel, output weights and the online training loop.
//!
//! A network is the composition of an [`OutputShaping`](crate::OutputShaping)
//! and an [`Adaptation`](crate::Adaptation) over a [`Kernel`]. One training
//! step for a sample `(x, y)`:
//!
//! 1. forward pass: distance `c`, shaped activation `g`, prediction `p`
//! 2. `error = y - p`, `delta = error ⊗ g` (scaled by `alpha` unless the
//!    kernel adapts)
//! 3. output weights (and center weights for hyperplane shaping)
//! 4. Gaussian centers and widths, if the kernel adapts
//!
//! Every step reads the [`ForwardPass`] of its own sample; the next sample's
//! forward pass sees all updates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::adaptation::KernelStep;
use crate::config::RbfnConfig;
use crate::error::{RbfnError, RbfnResult};
use crate::kernel::Kernel;
use crate::loss;
use crate::shaping;

/// Intermediate values of one forward evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    /// Network output `[O]`.
    pub prediction: Vec<f64>,
    /// Kernel distance `c`, `[B * D]`.
    pub distance: Vec<f64>,
    /// Shaped activation `g`, `[B]` (sums to one under normalization).
    pub activation: Vec<f64>,
    /// Activation sum before shaping.
    pub raw_activation_sum: f64,
}

impl ForwardPass {
    /// Activation tiled across outputs, `h[o][b] = g[b]`, `[O * B]`.
    pub fn broadcast(&self) -> Vec<f64> {
        let mut h = Vec::with_capacity(self.prediction.len() * self.activation.len());
        for _ in 0..self.prediction.len() {
            h.extend_from_slice(&self.activation);
        }
        h
    }
}

/// Radial basis function network.
///
/// # Example
///
/// ```rust
/// use rbfn::{GaussianRbf, Rbfn, RbfnConfig, Variant};
///
/// let kernel = GaussianRbf::grid(5, 1, (0.0, 1.0), 0.25).unwrap();
/// let mut config = RbfnConfig::for_variant(Variant::Normalized, 1, 5, 1, 0.5, 0.0);
/// config.init_seed = Some(1);
/// let mut net = Rbfn::new(config, kernel).unwrap();
///
/// let xs: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64 / 19.0]).collect();
/// let ys: Vec<Vec<f64>> = xs.iter().map(|x| vec![x[0] * x[0]]).collect();
///
/// let before = net.mse(&xs, &ys).unwrap();
/// net.train(&xs, &ys).unwrap().train(&xs, &ys).unwrap();
/// assert!(net.mse(&xs, &ys).unwrap() < before);
/// ```
#[derive(Debug, Clone)]
pub struct Rbfn {
    config: RbfnConfig,
    kernel: Kernel,
    /// Output weights `[O * B]`.
    weights: Vec<f64>,
    /// Center weights `[O * B * D]`, present with hyperplane shaping.
    center_weights: Option<Vec<f64>>,
    num_bases: usize,
}

fn uniform(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

impl Rbfn {
    /// Creates a network over `kernel`; weights are uniform in `[-1, 1)`.
    ///
    /// # Errors
    ///
    /// - [`RbfnError::Config`] if the configuration is invalid
    /// - [`RbfnError::ShapeMismatch`] if the kernel is not `B x D`
    /// - [`RbfnError::KernelNotAdaptive`] if the configuration adapts the
    ///   kernel and the kernel is not Gaussian
    pub fn new(config: RbfnConfig, kernel: impl Into<Kernel>) -> RbfnResult<Self> {
        config.validate()?;
        let kernel = kernel.into();

        let bases = config.num_bases().ok_or_else(|| {
            RbfnError::overflow(format!(
                "{}^{} bases",
                config.bases_per_dim, config.input_dim
            ))
        })?;
        if kernel.num_bases() != bases || kernel.input_dim() != config.input_dim {
            return Err(RbfnError::shape_mismatch(
                &[bases, config.input_dim],
                &[kernel.num_bases(), kernel.input_dim()],
            ));
        }
        // Deserialized kernels skip the constructor checks.
        let param_len = bases
            .checked_mul(config.input_dim)
            .ok_or_else(|| RbfnError::overflow("kernel parameter count"))?;
        for len in [kernel.centers().len(), kernel.widths().len()] {
            if len != param_len {
                return Err(RbfnError::shape_mismatch(&[bases, config.input_dim], &[len]));
            }
        }
        if config.adaptation.is_adaptive() && !kernel.supports_adaptation() {
            return Err(RbfnError::kernel_not_adaptive(kernel.name()));
        }

        let weight_len = config
            .output_dim
            .checked_mul(bases)
            .ok_or_else(|| RbfnError::overflow("output weight count"))?;

        let mut rng = match config.init_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let weights = uniform(&mut rng, weight_len);
        let center_weights = if config.shaping.has_hyperplane() {
            let len = weight_len
                .checked_mul(config.input_dim)
                .ok_or_else(|| RbfnError::overflow("center weight count"))?;
            Some(uniform(&mut rng, len))
        } else {
            None
        };

        log::debug!(
            "rbfn: {} kernel, {} -> {} bases -> {}, {:?}/{:?}",
            kernel.name(),
            config.input_dim,
            bases,
            config.output_dim,
            config.shaping,
            config.adaptation
        );

        Ok(Self {
            config,
            kernel,
            weights,
            center_weights,
            num_bases: bases,
        })
    }

    /// Network configuration.
    #[inline]
    pub fn config(&self) -> &RbfnConfig {
        &self.config
    }

    /// Hidden-layer kernel.
    #[inline]
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Total number of basis functions `B`.
    #[inline]
    pub fn num_bases(&self) -> usize {
        self.num_bases
    }

    /// Input dimension `D`.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.config.input_dim
    }

    /// Output dimension `O`.
    #[inline]
    pub fn output_dim(&self) -> usize {
        self.config.output_dim
    }

    /// Output weights `[O * B]`, Row-Major.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Mutable output weights; the shape is fixed.
    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Center weights `[O * B * D]`, Row-Major, for hyperplane shaping.
    #[inline]
    pub fn center_weights(&self) -> Option<&[f64]> {
        self.center_weights.as_deref()
    }

    /// Mutable center weights; the shape is fixed.
    #[inline]
    pub fn center_weights_mut(&mut self) -> Option<&mut [f64]> {
        self.center_weights.as_deref_mut()
    }

    /// Number of parameters updated by training.
    pub fn param_count(&self) -> usize {
        let kernel = if self.config.adaptation.is_adaptive() {
            2 * self.kernel.centers().len()
        } else {
            0
        };
        self.weights.len() + self.center_weights.as_ref().map_or(0, Vec::len) + kernel
    }

    /// Full forward pass for one input.
    ///
    /// # Errors
    ///
    /// [`RbfnError::ShapeMismatch`] if `x.len() != input_dim`.
    pub fn forward(&self, x: &[f64]) -> RbfnResult<ForwardPass> {
        let (distance, mut activation) = self.kernel.activation(x)?;
        let raw_activation_sum = self.config.shaping.shape_activation(&mut activation);

        let output_dim = self.config.output_dim;
        let hyperplane = self.center_weights.as_deref().map(|v| {
            shaping::hyperplane_term(v, &distance, output_dim, self.num_bases, self.input_dim())
        });
        let prediction =
            shaping::combine(&self.weights, &activation, hyperplane.as_deref(), output_dim);

        Ok(ForwardPass {
            prediction,
            distance,
            activation,
            raw_activation_sum,
        })
    }

    /// Network output for one input, `[O]`.
    pub fn evaluate(&self, x: &[f64]) -> RbfnResult<Vec<f64>> {
        Ok(self.forward(x)?.prediction)
    }

    fn check_sample(&self, x: &[f64], y: &[f64]) -> RbfnResult<()> {
        if x.len() != self.input_dim() {
            return Err(RbfnError::shape_mismatch(&[self.input_dim()], &[x.len()]));
        }
        if y.len() != self.output_dim() {
            return Err(RbfnError::shape_mismatch(&[self.output_dim()], &[y.len()]));
        }
        Ok(())
    }

    fn check_dataset<X, Y>(&self, inputs: &[X], targets: &[Y]) -> RbfnResult<()>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        if inputs.len() != targets.len() {
            return Err(RbfnError::sample_count_mismatch(inputs.len(), targets.len()));
        }
        for (x, y) in inputs.iter().zip(targets) {
            self.check_sample(x.as_ref(), y.as_ref())?;
        }
        Ok(())
    }

    /// One online step. Inputs must already be shape-checked.
    fn step(&mut self, x: &[f64], y: &[f64]) -> RbfnResult<f64> {
        let pass = self.forward(x)?;
        let (sample_loss, error) = loss::squared_error(&pass.prediction, y);

        let bases = self.num_bases;
        let dim = self.config.input_dim;
        let alpha = self.config.alpha;
        let eta = self.config.adaptation.eta();

        // delta = error ⊗ g, alpha-scaled only when the kernel is fixed
        let delta: Vec<f64> = error
            .iter()
            .flat_map(|&e| {
                pass.activation.iter().map(move |&g| match eta {
                    Some(_) => e * g,
                    None => alpha * e * g,
                })
            })
            .collect();

        match eta {
            Some(_) => {
                for (w, d) in self.weights.iter_mut().zip(&delta) {
                    *w += alpha * d;
                }
            }
            None => {
                for (w, d) in self.weights.iter_mut().zip(&delta) {
                    *w += d;
                }
            }
        }

        if let Some(v) = self.center_weights.as_mut() {
            for (ob, row) in v.chunks_exact_mut(dim).enumerate() {
                let b = ob % bases;
                let c = &pass.distance[b * dim..(b + 1) * dim];
                for (vi, ci) in row.iter_mut().zip(c) {
                    *vi += delta[ob] * ci;
                }
            }
        }

        if let (Some(eta), Kernel::Gaussian(gaussian)) = (eta, &mut self.kernel) {
            let kernel_step = KernelStep {
                delta: &delta,
                weights: &self.weights,
                center_weights: self.center_weights.as_deref(),
                prediction: &pass.prediction,
                distance: &pass.distance,
                sigma: &gaussian.sigma,
                bases,
                input_dim: dim,
            }
            .compute(eta);
            gaussian.shift(&kernel_step, &pass.distance);
        }

        log::trace!("rbfn step: loss {:.6e}", sample_loss);
        Ok(sample_loss)
    }

    /// Trains on a single sample and returns its squared error before the
    /// update.
    ///
    /// # Errors
    ///
    /// [`RbfnError::ShapeMismatch`] if `x` or `y` has the wrong length; the
    /// network is left unchanged.
    pub fn train_sample(&mut self, x: &[f64], y: &[f64]) -> RbfnResult<f64> {
        self.check_sample(x, y)?;
        self.step(x, y)
    }

    /// One epoch of online gradient descent over `(inputs[i], targets[i])`,
    /// in order, one update per sample.
    ///
    /// Returns `self` so epochs chain: `net.train(&x, &y)?.train(&x, &y)?`.
    ///
    /// # Errors
    ///
    /// Every sample is shape-checked before the first update; on error the
    /// network is left unchanged.
    pub fn train<X, Y>(&mut self, inputs: &[X], targets: &[Y]) -> RbfnResult<&mut Self>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        self.check_dataset(inputs, targets)?;
        for (x, y) in inputs.iter().zip(targets) {
            self.step(x.as_ref(), y.as_ref())?;
        }
        Ok(self)
    }

    /// Runs `epochs` calls to [`train`](Self::train) and returns the mean
    /// squared error after the last one.
    pub fn train_epochs<X, Y>(
        &mut self,
        inputs: &[X],
        targets: &[Y],
        epochs: usize,
    ) -> RbfnResult<f64>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        let mut mse = self.mse(inputs, targets)?;
        for epoch in 0..epochs {
            self.train(inputs, targets)?;
            mse = self.mse(inputs, targets)?;
            log::debug!("epoch {}/{}: mse {:.6e}", epoch + 1, epochs, mse);
        }
        Ok(mse)
    }

    /// Mean squared error of the network over a dataset, without training.
    pub fn mse<X, Y>(&self, inputs: &[X], targets: &[Y]) -> RbfnResult<f64>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        self.check_dataset(inputs, targets)?;
        let mut predictions = Vec::with_capacity(inputs.len() * self.output_dim());
        let mut flat_targets = Vec::with_capacity(inputs.len() * self.output_dim());
        for (x, y) in inputs.iter().zip(targets) {
            predictions.extend(self.evaluate(x.as_ref())?);
            flat_targets.extend_from_slice(y.as_ref());
        }
        Ok(loss::mean_squared_error(&predictions, &flat_targets))
    }
}
