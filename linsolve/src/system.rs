use crate::math::{Matrix, Vector};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// A square system `a * x = b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearSystem {
    pub a: Matrix,
    pub b: Vector,
}

impl LinearSystem {
    pub fn new(a: Matrix, b: Vector) -> Self {
        debug_assert!(a.is_square() && a.dimension() == b.len());
        LinearSystem { a, b }
    }

    /// Fills `a` row by row, then `b`, with values drawn uniformly from [0, 1).
    pub fn from_rng<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut a = Matrix::zero(n);
        for row in a.rows.iter_mut() {
            for value in row.iter_mut() {
                *value = rng.gen::<f64>();
            }
        }
        let mut b = Vector::zero(n);
        for value in b.iter_mut() {
            *value = rng.gen::<f64>();
        }
        LinearSystem { a, b }
    }

    /// Random system from a dedicated generator seeded with `seed`.
    pub fn random(n: usize, seed: i64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed as u64);
        Self::from_rng(n, &mut rng)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.b.len()
    }

    /// Largest absolute entry of `a * x - b`.
    pub fn max_residual(&self, x: &Vector) -> f64 {
        (&(&self.a * x) - &self.b).max_abs()
    }

    fn validate(&self) -> Result<(), String> {
        let n = self.b.len();
        if !self.a.is_square() || self.a.dimension() != n {
            return Err(format!(
                "expected a {0}x{0} matrix for a right-hand side of length {0}",
                n
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SystemFile {
    n: usize,
    seed: i64,
    #[serde(flatten)]
    system: LinearSystem,
}

/// Reads a system written by [`save_system`], returning its seed alongside it.
pub fn load_system<P: AsRef<Path>>(path: P) -> Result<(i64, LinearSystem), Box<dyn Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let file: SystemFile = serde_json::from_reader(reader)?;
    if file.n != file.system.dimension() {
        return Err(format!(
            "system declares n = {} but holds {} equations",
            file.n,
            file.system.dimension()
        )
        .into());
    }
    file.system.validate()?;

    Ok((file.seed, file.system))
}

pub fn save_system<P: AsRef<Path>>(
    path: P,
    seed: i64,
    system: &LinearSystem,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(
        writer,
        &SystemFile {
            n: system.dimension(),
            seed,
            system: system.clone(),
        },
    )?;

    Ok(())
}
