//! Parameterised unitary matrices.
//!
//! An `N×N` unitary is described by `N²` real parameters in `-1..1`:
//! `N(N-1)/2` real rotation angles, `N(N-1)/2` complex rotation phases (one
//! pair per plane spanned by two standard basis vectors) and `N` column
//! phases. Every angle is expressed in units of π.

use crate::{Error, Result};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt;

/// Square complex matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    dim: usize,
    data: Vec<Complex64>,
}

impl ComplexMatrix {
    /// The `n×n` identity.
    pub fn identity(n: usize) -> Self {
        let mut data = vec![Complex64::new(0.0, 0.0); n * n];
        for i in 0..n {
            data[i * n + i] = Complex64::new(1.0, 0.0);
        }
        Self { dim: n, data }
    }

    /// Builds a matrix from rows. All rows must have as many entries as there are rows.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> Result<Self> {
        let dim = rows.len();
        if rows.iter().any(|row| row.len() != dim) {
            return Err(Error::validation_field("rows", "matrix must be square"));
        }
        Ok(Self {
            dim,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim + col]
    }

    /// Row `row` as a slice.
    pub fn row(&self, row: usize) -> &[Complex64] {
        &self.data[row * self.dim..(row + 1) * self.dim]
    }

    /// Whether `self · self†` is the identity within `tolerance` per entry.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let n = self.dim;
        for i in 0..n {
            for j in 0..n {
                let product: Complex64 = (0..n)
                    .map(|k| self.get(i, k) * self.get(j, k).conj())
                    .sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                if (product - Complex64::new(expected, 0.0)).norm() > tolerance {
                    return false;
                }
            }
        }
        true
    }
}

fn format_entry(c: Complex64) -> String {
    if c.im.abs() < 0.001 {
        format!("{:.2}", c.re)
    } else if c.re.abs() < 0.001 {
        format!("{:.2}j", c.im)
    } else if c.im < 0.0 {
        format!("{:.2}-{:.2}j", c.re, -c.im)
    } else {
        format!("{:.2}+{:.2}j", c.re, c.im)
    }
}

impl fmt::Display for ComplexMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.dim {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "|")?;
            for c in self.row(i) {
                write!(f, "{:^12}", format_entry(*c))?;
            }
            write!(f, "|")?;
        }
        Ok(())
    }
}

/// Builds an `N×N` unitary from separate angle lists, `N = gamma.len()`.
///
/// `theta` and `phi` must each hold `N(N-1)/2` values, one per plane
/// `(j1, j2)` with `j1 < j2` in lexicographic order.
pub fn unitary_from_parts(theta: &[f64], phi: &[f64], gamma: &[f64]) -> Result<ComplexMatrix> {
    let n = gamma.len();
    let planes = n * n.saturating_sub(1) / 2;
    let len = theta.len() + phi.len() + gamma.len();
    if n == 0 {
        return Err(Error::unitary_parameters(len, "at least one column phase is required"));
    }
    if theta.len() != planes || phi.len() != planes {
        return Err(Error::unitary_parameters(
            len,
            format!("a {n}x{n} unitary needs {planes} rotation angles and {planes} phases"),
        ));
    }

    let mut rows: Vec<Vec<Complex64>> = ComplexMatrix::identity(n)
        .data
        .chunks(n)
        .map(<[Complex64]>::to_vec)
        .collect();

    let mut k = 0;
    for j1 in 0..n.saturating_sub(1) {
        for j2 in (j1 + 1)..n {
            let ep = Complex64::from_polar(1.0, PI * phi[k]);
            let (st, ct) = (PI * theta[k]).sin_cos();
            let (upper, lower) = (rows[j1].clone(), rows[j2].clone());
            rows[j1] = upper
                .iter()
                .zip(&lower)
                .map(|(&u, &l)| u * ct + l * st * ep)
                .collect();
            rows[j2] = upper
                .iter()
                .zip(&lower)
                .map(|(&u, &l)| u * st / ep - l * ct)
                .collect();
            k += 1;
        }
    }

    for row in rows.iter_mut() {
        for (entry, g) in row.iter_mut().zip(gamma) {
            *entry *= Complex64::from_polar(1.0, PI * *g);
        }
    }

    ComplexMatrix::from_rows(rows)
}

/// Builds an `N×N` unitary from `N²` packed parameters.
///
/// The first `N² − N` values alternate rotation angle and phase per plane,
/// the last `N` values are the column phases.
///
/// # Examples
///
/// ```
/// use corral_core::unitary::unitary;
///
/// let not = unitary(&[0.5, 0.0, 0.0, 0.0]).unwrap();
/// assert!((not.get(0, 1).re - 1.0).abs() < 1e-12);
/// assert!(not.get(0, 0).norm() < 1e-12);
/// ```
pub fn unitary(params: &[f64]) -> Result<ComplexMatrix> {
    let n = side_of_square(params.len()).ok_or_else(|| {
        Error::unitary_parameters(params.len(), "expected N*N parameters with N >= 1")
    })?;
    let (rotations, gamma) = params.split_at(params.len() - n);
    let theta: Vec<f64> = rotations.iter().step_by(2).copied().collect();
    let phi: Vec<f64> = rotations.iter().skip(1).step_by(2).copied().collect();
    unitary_from_parts(&theta, &phi, gamma)
}

/// `Some(n)` when `len == n²` for some `n ≥ 1`.
pub fn side_of_square(len: usize) -> Option<usize> {
    let n = (len as f64).sqrt().round() as usize;
    (n >= 1 && n * n == len).then_some(n)
}
