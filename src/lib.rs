//! # rbfn - Radial Basis Function Networks
//!
//! Single-hidden-layer function approximators: a Gaussian or Von Mises
//! kernel layer followed by a linear output layer, trained online by
//! stochastic gradient descent, one sample at a time.
//!
//! ## Architecture
//! - Row-Major parameter layout: centers `[B, D]`, weights `[O, B]`,
//!   center weights `[O, B, D]`
//! - Two orthogonal strategies per network: [`OutputShaping`]
//!   (plain / normalized / hyperplane) and [`Adaptation`] (fixed kernel /
//!   adaptive Gaussian kernel)
//! - Forward intermediates are returned as a [`ForwardPass`] value, not
//!   cached on the network
//!
//! ## Usage
//! ```rust
//! use rbfn::{GaussianRbf, Rbfn, RbfnConfig};
//!
//! let kernel = GaussianRbf::new(vec![0.0], vec![1.0], 1).unwrap();
//! let config = RbfnConfig { alpha: 0.1, ..Default::default() };
//! let mut net = Rbfn::new(config, kernel).unwrap();
//!
//! for _ in 0..100 {
//!     net.train(&[[0.0]], &[[1.0]]).unwrap();
//! }
//! assert!((net.evaluate(&[0.0]).unwrap()[0] - 1.0).abs() < 0.01);
//! ```

pub mod adaptation;
pub mod config;
pub mod error;
pub mod kernel;
pub mod loss;
pub mod network;
pub mod shaping;

// Re-exports
pub use adaptation::{Adaptation, DEFAULT_ETA};
pub use config::{ConfigError, RbfnConfig, RbfnConfigBuilder, Variant, DEFAULT_ALPHA};
pub use error::{RbfnError, RbfnResult};
pub use kernel::{grid_centers, GaussianRbf, Kernel, VonMisesRbf};
pub use loss::{mean_squared_error, squared_error};
pub use network::{ForwardPass, Rbfn};
pub use shaping::OutputShaping;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
