//! Error types for the Gaussian elimination solver.
//!
//! Both variants are terminal: the solver does not retry with pivoting and
//! never returns a partial solution.

use thiserror::Error;

/// Errors that can occur while solving a dense linear system.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// A pivot used as a divisor during forward elimination is exactly zero.
    #[error("zero pivot at row {index} during forward elimination")]
    SingularPivot {
        /// Row (and column) of the offending pivot
        index: usize,
    },

    /// A pivot used as a divisor during back-substitution is below the
    /// near-zero tolerance.
    #[error("near-zero pivot {value:e} at row {index} during back-substitution")]
    NearSingularPivot {
        /// Row (and column) of the offending pivot
        index: usize,
        /// The pivot value that was rejected
        value: f64,
    },
}

/// A specialized `Result` type for solver operations.
pub type Result<T> = std::result::Result<T, SolveError>;

impl SolveError {
    /// Returns `true` if elimination hit an exact-zero pivot.
    pub fn is_singular_pivot(&self) -> bool {
        matches!(self, SolveError::SingularPivot { .. })
    }

    /// Returns `true` if back-substitution hit a near-zero pivot.
    pub fn is_near_singular_pivot(&self) -> bool {
        matches!(self, SolveError::NearSingularPivot { .. })
    }

    /// Row of the pivot that caused the failure.
    pub fn pivot_index(&self) -> usize {
        match *self {
            SolveError::SingularPivot { index } | SolveError::NearSingularPivot { index, .. } => {
                index
            }
        }
    }
}
