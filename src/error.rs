//! Unified error types for rbfn.
//!
//! [`RbfnError`] covers every failure surfaced at the library boundary:
//! shape mismatches between inputs and the network architecture, mismatched
//! sample counts, invalid configuration and kernel/variant incompatibility.
//! It uses the `thiserror` crate for ergonomic error handling.
//!
//! Numerical degeneracy (a zero activation sum under normalization, NaN
//! weights) is *not* an error: non-finite values propagate through the
//! network the same way they would in the underlying arithmetic.
//!
//! # Example
//!
//! ```rust
//! use rbfn::RbfnError;
//!
//! fn validate_shape(expected: &[usize], got: &[usize]) -> Result<(), RbfnError> {
//!     if expected != got {
//!         return Err(RbfnError::shape_mismatch(expected, got));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_shape(&[4, 2], &[4, 3]).is_err());
//! ```

use thiserror::Error;

use crate::config::ConfigError;

/// Unified error type for rbfn operations.
#[derive(Error, Debug)]
pub enum RbfnError {
    /// Shape mismatch between expected and actual tensor shapes.
    ///
    /// Returned when an input vector does not have `input_dim` entries, a
    /// target does not have `output_dim` entries, or kernel parameters do
    /// not form a `bases x input_dim` grid.
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected tensor shape.
        expected: Vec<usize>,
        /// Actual tensor shape received.
        got: Vec<usize>,
    },

    /// Inputs and targets passed to training have different lengths.
    #[error("Sample count mismatch: {inputs} inputs, {targets} targets")]
    SampleCountMismatch {
        /// Number of input vectors.
        inputs: usize,
        /// Number of target vectors.
        targets: usize,
    },

    /// Kernel-adaptive training was requested for a kernel that does not
    /// expose a mutable center and width.
    ///
    /// Only the Gaussian kernel supports adaptation.
    #[error("Kernel '{0}' does not support center/width adaptation")]
    KernelNotAdaptive(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Integer overflow in size calculations.
    ///
    /// Occurs when `bases_per_dim ^ input_dim` (or a derived tensor size)
    /// does not fit in `usize`.
    #[error("Integer overflow: {0}")]
    Overflow(String),
}

/// Result type alias for rbfn operations.
pub type RbfnResult<T> = Result<T, RbfnError>;

impl RbfnError {
    /// Creates a shape mismatch error.
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        RbfnError::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Creates a sample count mismatch error.
    pub fn sample_count_mismatch(inputs: usize, targets: usize) -> Self {
        RbfnError::SampleCountMismatch { inputs, targets }
    }

    /// Creates a kernel-not-adaptive error for the named kernel.
    pub fn kernel_not_adaptive(kernel: &'static str) -> Self {
        RbfnError::KernelNotAdaptive(kernel)
    }

    /// Creates an overflow error.
    pub fn overflow<S: Into<String>>(msg: S) -> Self {
        RbfnError::Overflow(msg.into())
    }
}

/// Returns `Ok(())` when `got == expected`, a shape mismatch otherwise.
#[inline]
pub(crate) fn check_len(expected: &[usize], got: usize) -> RbfnResult<()> {
    let want: usize = expected.iter().product();
    if want != got {
        return Err(RbfnError::shape_mismatch(expected, &[got]));
    }
    Ok(())
}
