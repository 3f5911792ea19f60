use super::{dot, Vector};
use core::ops::Mul;
use serde::{Deserialize, Serialize};

/// Dense square matrix stored as a list of rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: Vec<Vector>,
}

impl Matrix {
    pub fn zero(dimension: usize) -> Self {
        Matrix {
            rows: vec![Vector::zero(dimension); dimension],
        }
    }

    pub fn identity(dimension: usize) -> Self {
        let mut mat = Matrix::zero(dimension);
        for i in 0..dimension {
            mat.rows[i][i] = 1.0;
        }
        mat
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.rows.len()
    }

    /// True when every row has as many columns as there are rows.
    pub fn is_square(&self) -> bool {
        let n = self.rows.len();
        self.rows.iter().all(|row| row.len() == n)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }
}

impl<const N: usize> From<&[[f64; N]; N]> for Matrix {
    fn from(a: &[[f64; N]; N]) -> Self {
        Matrix {
            rows: a.iter().map(|row| Vector::from(&row[..])).collect(),
        }
    }
}

impl From<Vec<Vec<f64>>> for Matrix {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Matrix {
            rows: rows.into_iter().map(Vector::from).collect(),
        }
    }
}

impl Mul<&Vector> for &Matrix {
    type Output = Vector;
    #[inline]
    fn mul(self, rhs: &Vector) -> Self::Output {
        let mut tmp = Vector::zero(self.rows.len());
        for (m, row) in self.rows.iter().enumerate() {
            tmp[m] = dot(row, rhs);
        }
        tmp
    }
}

#[test]
fn test_matrix_mul_vector() {
    let m = Matrix::from(&[[1., 2.], [3., 4.]]);
    let v = Vector::from(vec![1., -1.]);
    assert_eq!(&m * &v, Vector::from(vec![-1., -1.]));
    assert_eq!(&Matrix::identity(2) * &v, v);
}

#[test]
fn test_matrix_shape() {
    assert!(Matrix::zero(3).is_square());
    assert_eq!(Matrix::zero(3).dimension(), 3);
    let ragged = Matrix::from(vec![vec![1., 2.], vec![3.]]);
    assert!(!ragged.is_square());
}
