//! Small numeric kernels shared by correlations and automata.

use crate::{Error, Result};
use rand::Rng;

/// Tolerance below which squared distances and norms count as zero.
pub const EPSILON: f64 = 0.00001;

/// Scales the absolute values of `weights` so that they sum to one.
///
/// The result can serve as a probability distribution over a finite set.
/// When every weight is (nearly) zero the uniform distribution is returned.
///
/// # Examples
///
/// ```
/// use corral_core::math::normalized_to_one;
///
/// let p = normalized_to_one(&[1.0, -3.0]).unwrap();
/// assert_eq!(p, vec![0.25, 0.75]);
/// ```
pub fn normalized_to_one(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(Error::EmptyWeights);
    }
    let total: f64 = weights.iter().map(|w| w.abs()).sum();
    if !total.is_finite() {
        return Err(Error::invalid_weights("sum of weights is not finite"));
    }
    if total < EPSILON {
        let uniform = 1.0 / weights.len() as f64;
        return Ok(vec![uniform; weights.len()]);
    }
    Ok(weights.iter().map(|w| w.abs() / total).collect())
}

/// Draws an index `0..weights.len()` with probability proportional to its weight.
pub fn weighted_choice<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Result<usize> {
    if weights.is_empty() {
        return Err(Error::EmptyWeights);
    }
    if weights.iter().any(|w| *w < 0.0) {
        return Err(Error::invalid_weights("weights must not be negative"));
    }
    let total: f64 = weights.iter().sum();
    if !total.is_finite() {
        return Err(Error::invalid_weights("sum of weights is not finite"));
    }
    if total == 0.0 {
        return Ok(0);
    }

    let r = rng.gen_range(0.0..=total);
    let mut upto = 0.0;
    let mut last_positive = 0;
    for (i, w) in weights.iter().enumerate().filter(|(_, w)| **w > 0.0) {
        if upto + w >= r {
            return Ok(i);
        }
        upto += w;
        last_positive = i;
    }
    // Round-off can leave `r` a hair above the running sum.
    Ok(last_positive)
}

/// Returns `d` orthonormal real vectors of dimension `d`.
///
/// Components are drawn uniformly from `[-1, 1]` and orthogonalised with
/// Gram–Schmidt; a draw that is (nearly) linearly dependent on the previous
/// vectors is discarded and redrawn.
pub fn random_basis<R: Rng + ?Sized>(rng: &mut R, d: usize) -> Vec<Vec<f64>> {
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(d);
    let mut norms2: Vec<f64> = Vec::with_capacity(d);

    while basis.len() < d {
        let mut candidate: Vec<f64> = (0..d).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        for (previous, norm2) in basis.iter().zip(&norms2) {
            let projection = dot(&candidate, previous) / norm2;
            for (c, p) in candidate.iter_mut().zip(previous) {
                *c -= projection * p;
            }
        }
        let norm2 = dot(&candidate, &candidate);
        if norm2 > EPSILON {
            basis.push(candidate);
            norms2.push(norm2);
        }
    }

    for (vector, norm2) in basis.iter_mut().zip(&norms2) {
        let norm = norm2.sqrt();
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
    basis
}

/// Squared Euclidean distance over the common prefix of two vectors.
pub fn distance_squared(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
