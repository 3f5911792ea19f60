pub mod error;
pub mod gauss;
mod math;
pub mod system;

pub use error::SolveError;
pub use gauss::{solve, solve_with, Elimination};
pub use math::{Matrix, Vector};
pub use system::LinearSystem;
