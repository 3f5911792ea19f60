mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .fold(0.0, |dot, (&lhs, &rhs)| dot + lhs * rhs)
}
