use super::dot;
use core::ops::{Deref, DerefMut, Sub};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(pub(crate) Vec<f64>);

impl Vector {
    #[inline]
    pub fn zero(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    #[inline]
    pub fn dot(&self, rhs: &Self) -> f64 {
        debug_assert!(self.len() == rhs.len());
        dot(&self.0, &rhs.0)
    }

    /// Largest absolute entry, or zero for an empty vector.
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0, |max, &v| f64::max(max, v.abs()))
    }
}

impl Deref for Vector {
    type Target = [f64];
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Vector {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<f64>> for Vector {
    #[inline]
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}

impl From<&[f64]> for Vector {
    #[inline]
    fn from(v: &[f64]) -> Self {
        Self(v.to_vec())
    }
}

impl Sub<&Vector> for &Vector {
    type Output = Vector;
    #[inline]
    fn sub(self, rhs: &Vector) -> Self::Output {
        debug_assert!(self.len() == rhs.len());
        let mut tmp = self.clone();
        for (lhs, &rhs) in tmp.iter_mut().zip(rhs.iter()) {
            *lhs -= rhs;
        }
        tmp
    }
}

#[test]
fn test_vector_sub_and_max_abs() {
    let a = Vector::from(vec![1.0, -2.0, 3.5]);
    let b = Vector::from(vec![0.5, 1.0, 3.5]);
    let d = &a - &b;
    assert_eq!(d, Vector::from(vec![0.5, -3.0, 0.0]));
    assert_eq!(d.max_abs(), 3.0);
    assert_eq!(Vector::zero(0).max_abs(), 0.0);
    assert_eq!(a.dot(&b), 0.5 - 2.0 + 12.25);
}
