//! Radial basis kernels: the hidden layer of an RBF network.
//!
//! A kernel owns `B` centers of dimension `D` plus a per-center, per-dimension
//! spread parameter. Given an input `x` it produces:
//!
//! - the **distance** tensor `c` (`B x D`), an elementwise transform of `x`
//!   against every center;
//! - the **activation** vector `g` (`B`), the distance reduced over `D` through
//!   the kernel nonlinearity.
//!
//! | Kernel        | Distance `c[b][d]`                  | Activation `g[b]`             |
//! |---------------|-------------------------------------|-------------------------------|
//! | Gaussian      | `(x[d] - mu[b][d]) / sigma[b][d]`   | `exp(-0.5 * sum_d c[b][d]^2)` |
//! | Von Mises     | `kappa[b][d] * cos(x[d] - mu[b][d])` | `exp(sum_d c[b][d])`          |
//!
//! The distance is returned to the caller together with the activation
//! instead of being cached on the kernel; the training step consumes it
//! directly.
//!
//! # Layout
//!
//! All parameter tensors are Row-Major flat vectors: `mu[b * D + d]`.
//!
//! # Example
//!
//! ```rust
//! use rbfn::kernel::{GaussianRbf, Kernel};
//!
//! // Two centers on the real line at -1 and 1, unit width.
//! let kernel: Kernel = GaussianRbf::new(vec![-1.0, 1.0], vec![1.0, 1.0], 1)
//!     .unwrap()
//!     .into();
//!
//! let (distance, activation) = kernel.activation(&[0.0]).unwrap();
//! assert_eq!(distance, vec![1.0, -1.0]);
//! assert!((activation[0] - (-0.5f64).exp()).abs() < 1e-12);
//! ```

use crate::error::{check_len, RbfnError, RbfnResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Validates a `(mu, spread)` pair and returns the number of centers.
fn basis_count(mu: &[f64], spread: &[f64], input_dim: usize) -> RbfnResult<usize> {
    if input_dim == 0 {
        return Err(RbfnError::shape_mismatch(&[mu.len(), 1], &[mu.len(), 0]));
    }
    if mu.len() % input_dim != 0 {
        return Err(RbfnError::shape_mismatch(
            &[mu.len() / input_dim + 1, input_dim],
            &[mu.len()],
        ));
    }
    let bases = mu.len() / input_dim;
    check_len(&[bases, input_dim], spread.len())?;
    Ok(bases)
}

/// Flattens `B` rows of length `D` into a Row-Major vector.
fn flatten_rows(rows: &[Vec<f64>]) -> RbfnResult<(Vec<f64>, usize)> {
    let dim = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * dim);
    for row in rows {
        if row.len() != dim {
            return Err(RbfnError::shape_mismatch(&[dim], &[row.len()]));
        }
        flat.extend_from_slice(row);
    }
    Ok((flat, dim))
}

/// Computes a uniform lattice of centers covering `range` in every dimension.
///
/// Produces `bases_per_dim ^ input_dim` centers, Row-Major (`[B * D]`). The
/// last dimension varies fastest. With a single basis per dimension the
/// center sits at the midpoint of `range`.
///
/// # Errors
///
/// [`RbfnError::Overflow`] if the center count does not fit in `usize`.
///
/// # Example
///
/// ```rust
/// use rbfn::kernel::grid_centers;
///
/// let centers = grid_centers(3, 1, (0.0, 1.0)).unwrap();
/// assert_eq!(centers, vec![0.0, 0.5, 1.0]);
///
/// let centers = grid_centers(2, 2, (-1.0, 1.0)).unwrap();
/// assert_eq!(centers, vec![-1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0]);
/// ```
pub fn grid_centers(
    bases_per_dim: usize,
    input_dim: usize,
    range: (f64, f64),
) -> RbfnResult<Vec<f64>> {
    let (lo, hi) = range;
    let bases = u32::try_from(input_dim)
        .ok()
        .and_then(|d| bases_per_dim.checked_pow(d))
        .ok_or_else(|| {
            RbfnError::overflow(format!("{}^{} centers", bases_per_dim, input_dim))
        })?;
    let total = bases
        .checked_mul(input_dim)
        .ok_or_else(|| RbfnError::overflow(format!("{} x {} center grid", bases, input_dim)))?;

    let axis: Vec<f64> = match bases_per_dim {
        0 => return Ok(Vec::new()),
        1 => vec![0.5 * (lo + hi)],
        n => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| lo + i as f64 * step).collect()
        }
    };

    let mut centers = Vec::with_capacity(total);
    for b in 0..bases {
        // Mixed-radix decode of b, most significant digit = dimension 0.
        let mut rem = b;
        let start = centers.len();
        centers.resize(start + input_dim, 0.0);
        for d in (0..input_dim).rev() {
            centers[start + d] = axis[rem % bases_per_dim];
            rem /= bases_per_dim;
        }
    }
    Ok(centers)
}

/// Gaussian radial basis neurons.
///
/// Activation is a product-separable multivariate Gaussian bump in
/// coordinates scaled by `sigma`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianRbf {
    mu: Vec<f64>,
    pub(crate) sigma: Vec<f64>,
    input_dim: usize,
    bases: usize,
}

impl GaussianRbf {
    /// Creates Gaussian neurons from flat Row-Major centers and widths.
    ///
    /// # Errors
    ///
    /// [`RbfnError::ShapeMismatch`] if `mu.len()` is not a multiple of
    /// `input_dim` or `sigma.len() != mu.len()`.
    pub fn new(mu: Vec<f64>, sigma: Vec<f64>, input_dim: usize) -> RbfnResult<Self> {
        let bases = basis_count(&mu, &sigma, input_dim)?;
        Ok(Self {
            mu,
            sigma,
            input_dim,
            bases,
        })
    }

    /// Creates Gaussian neurons from one row per center.
    pub fn from_rows(mu: &[Vec<f64>], sigma: &[Vec<f64>]) -> RbfnResult<Self> {
        let (mu, dim) = flatten_rows(mu)?;
        let (sigma, _) = flatten_rows(sigma)?;
        Self::new(mu, sigma, dim)
    }

    /// Places `bases_per_dim ^ input_dim` centers on a uniform lattice over
    /// `range`, all with width `sigma`.
    pub fn grid(
        bases_per_dim: usize,
        input_dim: usize,
        range: (f64, f64),
        sigma: f64,
    ) -> RbfnResult<Self> {
        let mu = grid_centers(bases_per_dim, input_dim, range)?;
        let sigma = vec![sigma; mu.len()];
        Self::new(mu, sigma, input_dim)
    }

    /// Number of centers `B`.
    #[inline]
    pub fn num_bases(&self) -> usize {
        self.bases
    }

    /// Input dimension `D`.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Centers `[B * D]`.
    #[inline]
    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    /// Widths `[B * D]`.
    #[inline]
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// Writes `(x - mu) / sigma` into `out` (`[B * D]`).
    pub fn distance_into(&self, x: &[f64], out: &mut [f64]) {
        debug_assert_eq!(x.len(), self.input_dim);
        debug_assert_eq!(out.len(), self.mu.len());

        for (b, row) in out.chunks_exact_mut(self.input_dim).enumerate() {
            let base = b * self.input_dim;
            for (d, c) in row.iter_mut().enumerate() {
                *c = (x[d] - self.mu[base + d]) / self.sigma[base + d];
            }
        }
    }

    /// Fills the distance `c` and reduces it to `g[b] = exp(-0.5 * sum_d c^2)`.
    pub fn activation_into(&self, x: &[f64], c: &mut [f64], g: &mut [f64]) {
        debug_assert_eq!(g.len(), self.bases);

        self.distance_into(x, c);
        for (gb, row) in g.iter_mut().zip(c.chunks_exact(self.input_dim)) {
            let sq: f64 = row.iter().map(|v| v * v).sum();
            *gb = (-0.5 * sq).exp();
        }
    }

    /// Applies a center/width step: `mu += step`, `sigma += step * c`.
    ///
    /// `c` must be the distance the step was derived from.
    pub(crate) fn shift(&mut self, step: &[f64], c: &[f64]) {
        debug_assert_eq!(step.len(), self.mu.len());
        debug_assert_eq!(c.len(), self.mu.len());

        for ((mu, sigma), (&s, &cv)) in self
            .mu
            .iter_mut()
            .zip(self.sigma.iter_mut())
            .zip(step.iter().zip(c.iter()))
        {
            *mu += s;
            *sigma += s * cv;
        }
    }
}

/// Von Mises (circular) radial basis neurons.
///
/// The activation is a product over dimensions of `exp(kappa * cos(x - mu))`,
/// suited to periodic inputs such as angles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VonMisesRbf {
    mu: Vec<f64>,
    kappa: Vec<f64>,
    input_dim: usize,
    bases: usize,
}

impl VonMisesRbf {
    /// Creates Von Mises neurons from flat Row-Major centers and concentrations.
    pub fn new(mu: Vec<f64>, kappa: Vec<f64>, input_dim: usize) -> RbfnResult<Self> {
        let bases = basis_count(&mu, &kappa, input_dim)?;
        Ok(Self {
            mu,
            kappa,
            input_dim,
            bases,
        })
    }

    /// Creates Von Mises neurons from one row per center.
    pub fn from_rows(mu: &[Vec<f64>], kappa: &[Vec<f64>]) -> RbfnResult<Self> {
        let (mu, dim) = flatten_rows(mu)?;
        let (kappa, _) = flatten_rows(kappa)?;
        Self::new(mu, kappa, dim)
    }

    /// Lattice of centers over `range` with a shared concentration.
    pub fn grid(
        bases_per_dim: usize,
        input_dim: usize,
        range: (f64, f64),
        kappa: f64,
    ) -> RbfnResult<Self> {
        let mu = grid_centers(bases_per_dim, input_dim, range)?;
        let kappa = vec![kappa; mu.len()];
        Self::new(mu, kappa, input_dim)
    }

    /// Number of centers `B`.
    #[inline]
    pub fn num_bases(&self) -> usize {
        self.bases
    }

    /// Input dimension `D`.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Centers `[B * D]`.
    #[inline]
    pub fn mu(&self) -> &[f64] {
        &self.mu
    }

    /// Concentrations `[B * D]`.
    #[inline]
    pub fn kappa(&self) -> &[f64] {
        &self.kappa
    }

    /// Writes `kappa * cos(x - mu)` into `out` (`[B * D]`).
    pub fn distance_into(&self, x: &[f64], out: &mut [f64]) {
        debug_assert_eq!(x.len(), self.input_dim);
        debug_assert_eq!(out.len(), self.mu.len());

        for (b, row) in out.chunks_exact_mut(self.input_dim).enumerate() {
            let base = b * self.input_dim;
            for (d, c) in row.iter_mut().enumerate() {
                *c = self.kappa[base + d] * (x[d] - self.mu[base + d]).cos();
            }
        }
    }

    /// Fills the distance `c` and reduces it to `g[b] = exp(sum_d c)`.
    pub fn activation_into(&self, x: &[f64], c: &mut [f64], g: &mut [f64]) {
        debug_assert_eq!(g.len(), self.bases);

        self.distance_into(x, c);
        for (gb, row) in g.iter_mut().zip(c.chunks_exact(self.input_dim)) {
            *gb = row.iter().sum::<f64>().exp();
        }
    }
}

/// The hidden-layer kernel of a network.
///
/// Only [`Kernel::Gaussian`] exposes a center and width that kernel-adaptive
/// training knows how to update; see [`Kernel::supports_adaptation`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Kernel {
    /// Gaussian neurons.
    Gaussian(GaussianRbf),
    /// Von Mises neurons.
    VonMises(VonMisesRbf),
}

impl From<GaussianRbf> for Kernel {
    fn from(k: GaussianRbf) -> Self {
        Kernel::Gaussian(k)
    }
}

impl From<VonMisesRbf> for Kernel {
    fn from(k: VonMisesRbf) -> Self {
        Kernel::VonMises(k)
    }
}

impl Kernel {
    /// Short kernel name, used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Gaussian(_) => "gaussian",
            Kernel::VonMises(_) => "von-mises",
        }
    }

    /// Number of centers `B`.
    #[inline]
    pub fn num_bases(&self) -> usize {
        match self {
            Kernel::Gaussian(k) => k.num_bases(),
            Kernel::VonMises(k) => k.num_bases(),
        }
    }

    /// Input dimension `D`.
    #[inline]
    pub fn input_dim(&self) -> usize {
        match self {
            Kernel::Gaussian(k) => k.input_dim(),
            Kernel::VonMises(k) => k.input_dim(),
        }
    }

    /// Centers `[B * D]`.
    pub fn centers(&self) -> &[f64] {
        match self {
            Kernel::Gaussian(k) => &k.mu,
            Kernel::VonMises(k) => &k.mu,
        }
    }

    /// Per-center widths `[B * D]`: `sigma` or `kappa`.
    pub fn widths(&self) -> &[f64] {
        match self {
            Kernel::Gaussian(k) => &k.sigma,
            Kernel::VonMises(k) => &k.kappa,
        }
    }

    /// Whether kernel-adaptive training can update this kernel.
    #[inline]
    pub fn supports_adaptation(&self) -> bool {
        matches!(self, Kernel::Gaussian(_))
    }

    /// The Gaussian neurons, if this is a Gaussian kernel.
    pub fn gaussian(&self) -> Option<&GaussianRbf> {
        match self {
            Kernel::Gaussian(k) => Some(k),
            Kernel::VonMises(_) => None,
        }
    }

    /// Mutable Gaussian neurons, if this is a Gaussian kernel.
    pub fn gaussian_mut(&mut self) -> Option<&mut GaussianRbf> {
        match self {
            Kernel::Gaussian(k) => Some(k),
            Kernel::VonMises(_) => None,
        }
    }

    fn check_input(&self, x: &[f64]) -> RbfnResult<()> {
        if x.len() != self.input_dim() {
            return Err(RbfnError::shape_mismatch(&[self.input_dim()], &[x.len()]));
        }
        Ok(())
    }

    /// Distance of `x` from every center, `[B * D]`.
    ///
    /// # Errors
    ///
    /// [`RbfnError::ShapeMismatch`] if `x.len() != D`.
    pub fn distance(&self, x: &[f64]) -> RbfnResult<Vec<f64>> {
        self.check_input(x)?;
        let mut c = vec![0.0; self.num_bases() * self.input_dim()];
        match self {
            Kernel::Gaussian(k) => k.distance_into(x, &mut c),
            Kernel::VonMises(k) => k.distance_into(x, &mut c),
        }
        Ok(c)
    }

    /// Distance `[B * D]` and raw activation `[B]` for `x`.
    ///
    /// # Errors
    ///
    /// [`RbfnError::ShapeMismatch`] if `x.len() != D`.
    pub fn activation(&self, x: &[f64]) -> RbfnResult<(Vec<f64>, Vec<f64>)> {
        self.check_input(x)?;
        let mut c = vec![0.0; self.num_bases() * self.input_dim()];
        let mut g = vec![0.0; self.num_bases()];
        match self {
            Kernel::Gaussian(k) => k.activation_into(x, &mut c, &mut g),
            Kernel::VonMises(k) => k.activation_into(x, &mut c, &mut g),
        }
        Ok((c, g))
    }
}
