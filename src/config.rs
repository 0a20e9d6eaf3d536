//! Network configuration and hyperparameters.
//!
//! This module provides [`RbfnConfig`] for configuring RBF networks:
//! architecture sizes, learning rates, and the two composable strategies
//! ([`OutputShaping`] x [`Adaptation`]) that select a training variant.
//!
//! # Example
//!
//! ```rust
//! use rbfn::{RbfnConfig, Variant};
//!
//! // Preset for one of the five named variants
//! let config = RbfnConfig::for_variant(Variant::AdaptiveHyperplane, 2, 3, 1, 0.1, 0.01);
//! assert_eq!(config.num_bases(), Some(9));
//!
//! // Or customize
//! let config = RbfnConfig {
//!     input_dim: 2,
//!     bases_per_dim: 4,
//!     output_dim: 3,
//!     alpha: 0.05,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```
//!
//! # Variants
//!
//! | Variant              | Shaping      | Adaptation       |
//! |----------------------|--------------|------------------|
//! | `Rbfn`               | `Plain`      | `Fixed`          |
//! | `Normalized`         | `Normalized` | `Fixed`          |
//! | `Hyperplane`         | `Hyperplane` | `Fixed`          |
//! | `Adaptive`           | `Normalized` | `Kernel { eta }` |
//! | `AdaptiveHyperplane` | `Hyperplane` | `Kernel { eta }` |

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adaptation::{Adaptation, DEFAULT_ETA};
use crate::shaping::OutputShaping;

/// Default output-weight learning rate.
pub const DEFAULT_ALPHA: f64 = 0.1;

/// The five named network variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Variant {
    /// Plain RBF network.
    Rbfn,
    /// Normalized activations.
    Normalized,
    /// Normalized activations with per-center hyperplanes.
    Hyperplane,
    /// Normalized activations, adaptive Gaussian kernel.
    Adaptive,
    /// Hyperplanes and an adaptive Gaussian kernel.
    AdaptiveHyperplane,
}

impl Variant {
    /// All variants, in order of increasing complexity.
    pub const ALL: [Variant; 5] = [
        Variant::Rbfn,
        Variant::Normalized,
        Variant::Hyperplane,
        Variant::Adaptive,
        Variant::AdaptiveHyperplane,
    ];

    /// Output shaping used by this variant.
    pub fn shaping(self) -> OutputShaping {
        match self {
            Variant::Rbfn => OutputShaping::Plain,
            Variant::Normalized | Variant::Adaptive => OutputShaping::Normalized,
            Variant::Hyperplane | Variant::AdaptiveHyperplane => OutputShaping::Hyperplane,
        }
    }

    /// Whether this variant adapts the kernel.
    pub fn is_adaptive(self) -> bool {
        matches!(self, Variant::Adaptive | Variant::AdaptiveHyperplane)
    }

    /// Adaptation strategy for this variant with kernel learning rate `eta`.
    pub fn adaptation(self, eta: f64) -> Adaptation {
        if self.is_adaptive() {
            Adaptation::Kernel { eta }
        } else {
            Adaptation::Fixed
        }
    }
}

/// RBF network configuration.
///
/// The network has `bases_per_dim ^ input_dim` basis functions, one per
/// lattice point of a `bases_per_dim`-wide grid in every input dimension.
/// The kernel passed to [`Rbfn::new`](crate::Rbfn::new) must have exactly
/// that many centers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RbfnConfig {
    /// Input dimension `D`.
    pub input_dim: usize,

    /// Basis functions per input dimension `b`.
    pub bases_per_dim: usize,

    /// Output dimension `O`.
    pub output_dim: usize,

    /// Output-weight learning rate.
    pub alpha: f64,

    /// How activations are turned into outputs.
    pub shaping: OutputShaping,

    /// Whether training also updates the kernel.
    pub adaptation: Adaptation,

    /// Optional seed for deterministic weight initialization (None => random).
    pub init_seed: Option<u64>,
}

impl Default for RbfnConfig {
    fn default() -> Self {
        Self {
            input_dim: 1,
            bases_per_dim: 1,
            output_dim: 1,
            alpha: DEFAULT_ALPHA,
            shaping: OutputShaping::Plain,
            adaptation: Adaptation::Fixed,
            init_seed: None,
        }
    }
}

impl RbfnConfig {
    /// Creates the configuration of a named variant.
    ///
    /// `eta` is ignored by variants that keep the kernel fixed.
    pub fn for_variant(
        variant: Variant,
        input_dim: usize,
        bases_per_dim: usize,
        output_dim: usize,
        alpha: f64,
        eta: f64,
    ) -> Self {
        Self {
            input_dim,
            bases_per_dim,
            output_dim,
            alpha,
            shaping: variant.shaping(),
            adaptation: variant.adaptation(eta),
            init_seed: None,
        }
    }

    /// The named variant this configuration corresponds to, if any.
    ///
    /// Returns `None` for compositions outside the five presets (plain
    /// shaping with an adaptive kernel).
    pub fn variant(&self) -> Option<Variant> {
        match (self.shaping, self.adaptation.is_adaptive()) {
            (OutputShaping::Plain, false) => Some(Variant::Rbfn),
            (OutputShaping::Normalized, false) => Some(Variant::Normalized),
            (OutputShaping::Hyperplane, false) => Some(Variant::Hyperplane),
            (OutputShaping::Normalized, true) => Some(Variant::Adaptive),
            (OutputShaping::Hyperplane, true) => Some(Variant::AdaptiveHyperplane),
            (OutputShaping::Plain, true) => None,
        }
    }

    /// Total number of basis functions `B = bases_per_dim ^ input_dim`.
    ///
    /// `None` on overflow.
    #[inline]
    pub fn num_bases(&self) -> Option<usize> {
        u32::try_from(self.input_dim)
            .ok()
            .and_then(|d| self.bases_per_dim.checked_pow(d))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - any dimension is zero
    /// - `bases_per_dim ^ input_dim` overflows
    /// - `alpha` or `eta` is negative or not finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dim == 0 {
            return Err(ConfigError::InvalidDimension("input_dim must be > 0"));
        }
        if self.output_dim == 0 {
            return Err(ConfigError::InvalidDimension("output_dim must be > 0"));
        }
        if self.bases_per_dim == 0 {
            return Err(ConfigError::InvalidDimension("bases_per_dim must be > 0"));
        }
        if self.num_bases().is_none() {
            return Err(ConfigError::BasisOverflow {
                bases_per_dim: self.bases_per_dim,
                input_dim: self.input_dim,
            });
        }
        check_rate("alpha", self.alpha)?;
        if let Some(eta) = self.adaptation.eta() {
            check_rate("eta", eta)?;
        }
        Ok(())
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidLearningRate { name, value });
    }
    Ok(())
}

/// Fluent builder for [`RbfnConfig`]; [`build`](Self::build) validates.
///
/// ```rust
/// use rbfn::{RbfnConfigBuilder, Variant};
///
/// let config = RbfnConfigBuilder::new()
///     .input_dim(2)
///     .bases_per_dim(5)
///     .output_dim(1)
///     .variant(Variant::Adaptive)
///     .alpha(0.2)
///     .eta(0.005)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.num_bases(), Some(25));
/// assert_eq!(config.adaptation.eta(), Some(0.005));
/// ```
#[derive(Debug, Clone)]
pub struct RbfnConfigBuilder {
    config: RbfnConfig,
    adaptive: bool,
    eta: f64,
}

impl Default for RbfnConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RbfnConfigBuilder {
    /// Starts from [`RbfnConfig::default`].
    pub fn new() -> Self {
        Self {
            config: RbfnConfig::default(),
            adaptive: false,
            eta: DEFAULT_ETA,
        }
    }

    /// Sets the input dimension.
    pub fn input_dim(mut self, dim: usize) -> Self {
        self.config.input_dim = dim;
        self
    }

    /// Sets the number of bases per input dimension.
    pub fn bases_per_dim(mut self, bases: usize) -> Self {
        self.config.bases_per_dim = bases;
        self
    }

    /// Sets the output dimension.
    pub fn output_dim(mut self, dim: usize) -> Self {
        self.config.output_dim = dim;
        self
    }

    /// Sets the output-weight learning rate.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    /// Sets the kernel learning rate (used only when the kernel adapts).
    pub fn eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    /// Sets the output shaping.
    pub fn shaping(mut self, shaping: OutputShaping) -> Self {
        self.config.shaping = shaping;
        self
    }

    /// Enables or disables kernel adaptation.
    pub fn adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Sets shaping and adaptation from a named variant.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.config.shaping = variant.shaping();
        self.adaptive = variant.is_adaptive();
        self
    }

    /// Sets the weight-initialization seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.init_seed = Some(seed);
        self
    }

    /// Finalizes and validates the configuration.
    pub fn build(self) -> Result<RbfnConfig, ConfigError> {
        let mut config = self.config;
        config.adaptation = if self.adaptive {
            Adaptation::Kernel { eta: self.eta }
        } else {
            Adaptation::Fixed
        };
        config.validate()?;
        Ok(config)
    }
}

/// Errors returned by [`RbfnConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A dimension parameter is invalid (zero).
    #[error("Invalid dimension: {0}")]
    InvalidDimension(&'static str),

    /// `bases_per_dim ^ input_dim` does not fit in `usize`.
    #[error("Basis count {bases_per_dim}^{input_dim} overflows")]
    BasisOverflow {
        /// Bases per dimension.
        bases_per_dim: usize,
        /// Input dimension.
        input_dim: usize,
    },

    /// A learning rate is negative or not finite.
    #[error("Learning rate {name} must be finite and >= 0, got {value}")]
    InvalidLearningRate {
        /// Name of the rate (`alpha` or `eta`).
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}
