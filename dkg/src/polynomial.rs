//! Generation and evaluation of the random polynomials used for secret sharing. Each participant
//! of the DKG creates one polynomial of degree `t - 1` whose constant term is its contribution to
//! the distributed secret.

use ark_ff::PrimeField;
use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Polynomial};
use ark_std::{rand::RngCore, vec::Vec};

use crate::{
    common::{ParticipantId, ShareId},
    error::DkgError,
};

/// Generate a polynomial with `threshold` coefficients, all sampled uniformly at random using `rng`.
/// The leading coefficient is non-zero so that the degree is exactly `threshold - 1`.
pub fn generate_polynomial<R: RngCore, F: PrimeField>(
    rng: &mut R,
    threshold: ShareId,
) -> Result<DensePolynomial<F>, DkgError> {
    let secret = F::rand(rng);
    generate_polynomial_with_secret(rng, secret, threshold)
}

/// Same as `generate_polynomial` above but accepts the constant term
pub fn generate_polynomial_with_secret<R: RngCore, F: PrimeField>(
    rng: &mut R,
    secret: F,
    threshold: ShareId,
) -> Result<DensePolynomial<F>, DkgError> {
    if threshold < 1 {
        return Err(DkgError::InvalidThresholdOrTotal(threshold, threshold));
    }
    let mut coeffs = Vec::with_capacity(threshold as usize);
    coeffs.push(secret);
    if threshold > 1 {
        coeffs.extend((0..threshold - 2).map(|_| F::rand(rng)));
        let mut leading = F::rand(rng);
        while leading.is_zero() {
            leading = F::rand(rng);
        }
        coeffs.push(leading);
    }
    Ok(DensePolynomial::from_coefficients_vec(coeffs))
}

/// Evaluate the polynomial at the point corresponding to participant `id`. `id` 0 is the point
/// of the secret and is never a participant.
pub fn evaluate_at<F: PrimeField>(
    poly: &DensePolynomial<F>,
    id: ParticipantId,
) -> Result<F, DkgError> {
    if id == 0 {
        return Err(DkgError::InvalidParticipantId(id));
    }
    Ok(poly.evaluate(&F::from(id as u64)))
}

/// Number of coefficients of the polynomial, which is the threshold it shares with
pub fn threshold_of<F: PrimeField>(poly: &DensePolynomial<F>) -> usize {
    poly.coeffs.len()
}
