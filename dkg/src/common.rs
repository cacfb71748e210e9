use ark_ec::{AffineRepr, VariableBaseMSM};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{cfg_into_iter, cfg_iter, collections::BTreeSet, vec::Vec};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use threshold_te_utils::{ff::powers, serde_utils::ArkObjectBytes};
use zeroize::Zeroize;

use crate::error::DkgError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub type ShareId = u16;

pub type ParticipantId = u16;

/// The threshold `t` and the total number of participants `n`. Any `t` of the `n` participants
/// can reconstruct the distributed secret (or decrypt), fewer learn nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdConfig {
    threshold: ShareId,
    total: ShareId,
}

impl ThresholdConfig {
    /// Requires `1 <= threshold <= total`
    pub fn new(threshold: ShareId, total: ShareId) -> Result<Self, DkgError> {
        if threshold < 1 || threshold > total {
            return Err(DkgError::InvalidThresholdOrTotal(threshold, total));
        }
        Ok(Self { threshold, total })
    }

    pub fn threshold(&self) -> ShareId {
        self.threshold
    }

    pub fn total(&self) -> ShareId {
        self.total
    }

    /// Participant ids are 1-based, i.e. in `[1, total]`
    pub fn is_valid_participant_id(&self, id: ParticipantId) -> bool {
        id >= 1 && id <= self.total
    }

    pub fn check_participant_id(&self, id: ParticipantId) -> Result<(), DkgError> {
        if !self.is_valid_participant_id(id) {
            return Err(DkgError::InvalidParticipantId(id));
        }
        Ok(())
    }

    /// Ids of all participants, `1, 2, ..., total`
    pub fn participant_ids(&self) -> impl Iterator<Item = ParticipantId> {
        1..=self.total
    }
}

/// Share of a secret, i.e. the evaluation of the sharing polynomial at `id`.
#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Zeroize,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(bound = "")]
pub struct Share<F: PrimeField> {
    pub id: ShareId,
    pub threshold: ShareId,
    #[serde_as(as = "ArkObjectBytes")]
    pub share: F,
}

/// Collection of `Share`s. A sufficient number of `Share`s reconstruct the secret.
/// Expects unique shares, i.e. each share has a different `ShareId` and each has the same threshold.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Shares<F: PrimeField>(pub Vec<Share<F>>);

/// The coefficients of a sharing polynomial, each multiplied by a public generator. The first element
/// corresponds to the shared secret. Lets anyone check that a share is an evaluation of the
/// polynomial without learning the polynomial.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct VerificationVector<G: AffineRepr>(#[serde_as(as = "Vec<ArkObjectBytes>")] pub Vec<G>);

impl<F: PrimeField> Drop for Share<F> {
    fn drop(&mut self) {
        self.share.zeroize();
    }
}

impl<F: PrimeField> From<(ShareId, ShareId, F)> for Share<F> {
    fn from((i, t, s): (ShareId, ShareId, F)) -> Self {
        Share {
            id: i,
            threshold: t,
            share: s,
        }
    }
}

impl<F: PrimeField> Zeroize for Shares<F> {
    fn zeroize(&mut self) {
        self.0.iter_mut().for_each(|s| s.zeroize())
    }
}

impl<F: PrimeField> Shares<F> {
    /// Threshold of the first share, `None` when there are no shares
    pub fn threshold(&self) -> Option<ShareId> {
        self.0.first().map(|s| s.threshold)
    }

    /// Share for participant `id`, if present
    pub fn get(&self, id: ParticipantId) -> Option<&Share<F>> {
        self.0.iter().find(|s| s.id == id)
    }

    /// Reconstruct the secret from the first `threshold` shares by Lagrange interpolation at 0.
    /// Assumes that shares have the same threshold.
    pub fn reconstruct_secret(&self) -> Result<F, DkgError> {
        let threshold = self.threshold().ok_or(DkgError::BelowThreshold(1, 0))?;
        let len = self.0.len() as ShareId;
        if threshold > len {
            return Err(DkgError::BelowThreshold(threshold, len));
        }
        let shares = &self.0[0..threshold as usize];
        let share_ids = shares.iter().map(|s| s.id).collect::<Vec<_>>();
        let basis = lagrange_basis_at_0_for_all::<F>(share_ids)?;
        Ok(cfg_into_iter!(basis)
            .zip(cfg_iter!(shares))
            .map(|(b, s)| b * s.share)
            .sum::<F>())
    }
}

impl<G: AffineRepr> From<Vec<G>> for VerificationVector<G> {
    fn from(coeffs: Vec<G>) -> Self {
        VerificationVector(coeffs)
    }
}

impl<G: AffineRepr> VerificationVector<G> {
    /// The constant coefficient is the secret and thus returns the commitment to that.
    pub fn commitment_to_secret(&self) -> Option<&G> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A polynomial for threshold `t` has `t` coefficients
    pub fn supports_threshold(&self, threshold: ShareId) -> bool {
        self.0.len() == threshold as usize
    }

    /// The committed polynomial evaluated at `id` "in the exponent", i.e. `\sum_k{vv[k] * id^k}`.
    /// Equals `g * f(id)` where `f` is the committed polynomial and `g` the generator.
    pub fn evaluate_at(&self, id: ShareId) -> G::Group {
        let powers = powers(&G::ScalarField::from(id as u64), self.0.len());
        G::Group::msm_unchecked(&self.0, &powers)
    }
}

/// Return the Lagrange basis polynomial at x = 0 for each of the given `x` coordinates, i.e. for each `x_i`,
/// `\prod_{j != i}{x_j} / \prod_{j != i}{x_j - x_i}`.
/// Fails if any coordinate is 0 or if coordinates repeat.
pub fn lagrange_basis_at_0_for_all<F: PrimeField>(x_coords: Vec<ShareId>) -> Result<Vec<F>, DkgError> {
    let mut seen = BTreeSet::new();
    for x in &x_coords {
        if *x == 0 {
            return Err(DkgError::InvalidParticipantId(0));
        }
        if !seen.insert(*x) {
            return Err(DkgError::DuplicateParticipantId(*x));
        }
    }

    let x = cfg_iter!(x_coords)
        .map(|x| F::from(*x as u64))
        .collect::<Vec<_>>();

    // Product of all `x`, i.e. \prod_{i}(x_i}
    let product = cfg_iter!(x).product::<F>();

    // The numerator for `x_i` is the product of all `x` except `x_i`, so fold `x_i` into the
    // denominator and invert all denominators at once.
    let mut denominators = cfg_iter!(x)
        .map(|i| {
            cfg_iter!(x)
                .filter(|&j| i != j)
                .map(|&j| j - i)
                .product::<F>()
                * i
        })
        .collect::<Vec<_>>();
    ark_ff::batch_inversion(&mut denominators);

    Ok(cfg_into_iter!(denominators)
        .map(|d| product * d)
        .collect::<Vec<_>>())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use ark_ec::CurveGroup;
    use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };
    use test_utils::{test_serialization, Fr, G2};

    #[test]
    fn threshold_config() {
        assert!(ThresholdConfig::new(0, 3).is_err());
        assert!(ThresholdConfig::new(4, 3).is_err());
        assert!(ThresholdConfig::new(0, 0).is_err());

        let config = ThresholdConfig::new(1, 1).unwrap();
        assert!(config.is_valid_participant_id(1));
        assert!(!config.is_valid_participant_id(0));
        assert!(!config.is_valid_participant_id(2));

        let config = ThresholdConfig::new(3, 5).unwrap();
        assert_eq!(config.threshold(), 3);
        assert_eq!(config.total(), 5);
        assert_eq!(config.participant_ids().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(
            config.check_participant_id(6),
            Err(DkgError::InvalidParticipantId(6))
        );
        config.check_participant_id(5).unwrap();
    }

    #[test]
    fn lagrange_basis_interpolates_constant_term() {
        let mut rng = StdRng::seed_from_u64(0u64);
        // f(x) = a + b*x + c*x^2
        let coeffs = (0..3).map(|_| Fr::rand(&mut rng)).collect::<Vec<_>>();
        let f = |x: u64| {
            let x = Fr::from(x);
            coeffs[0] + coeffs[1] * x + coeffs[2] * x * x
        };

        for ids in [vec![1, 2, 3], vec![2, 5, 9], vec![7, 3, 100]] {
            let basis = lagrange_basis_at_0_for_all::<Fr>(ids.clone()).unwrap();
            let at_0 = basis
                .iter()
                .zip(ids.iter())
                .map(|(b, i)| *b * f(*i as u64))
                .sum::<Fr>();
            assert_eq!(at_0, coeffs[0]);
        }

        assert_eq!(
            lagrange_basis_at_0_for_all::<Fr>(vec![1, 0, 3]),
            Err(DkgError::InvalidParticipantId(0))
        );
        assert_eq!(
            lagrange_basis_at_0_for_all::<Fr>(vec![1, 3, 3]),
            Err(DkgError::DuplicateParticipantId(3))
        );
    }

    #[test]
    fn verification_vector_evaluation() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let g = G2::rand(&mut rng);
        let coeffs = (0..4).map(|_| Fr::rand(&mut rng)).collect::<Vec<_>>();
        let vv = VerificationVector::<G2>::from(
            coeffs
                .iter()
                .map(|c| (g * c).into_affine())
                .collect::<Vec<_>>(),
        );
        assert!(vv.supports_threshold(4));
        assert!(!vv.supports_threshold(3));
        assert_eq!(*vv.commitment_to_secret().unwrap(), (g * coeffs[0]).into_affine());

        let x = Fr::from(6u64);
        let f_x = coeffs[0] + coeffs[1] * x + coeffs[2] * x * x + coeffs[3] * x * x * x;
        assert_eq!(vv.evaluate_at(6), g * f_x);

        test_serialization!(VerificationVector<G2>, vv);
    }

    #[test]
    fn reconstruct_needs_threshold_shares() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let secret = Fr::rand(&mut rng);
        let slope = Fr::rand(&mut rng);
        let shares = Shares(
            (1..=3u16)
                .map(|i| (i, 2, secret + slope * Fr::from(i as u64)).into())
                .collect::<Vec<Share<Fr>>>(),
        );
        assert_eq!(shares.threshold(), Some(2));
        assert_eq!(shares.reconstruct_secret().unwrap(), secret);
        assert_eq!(shares.get(2).unwrap().share, secret + slope * Fr::from(2u64));

        let too_few = Shares(vec![shares.0[0].clone()]);
        assert_eq!(
            too_few.reconstruct_secret(),
            Err(DkgError::BelowThreshold(2, 1))
        );
        assert!(Shares::<Fr>(vec![]).reconstruct_secret().is_err());

        test_serialization!(Shares<Fr>, shares);
        test_serialization!(Share<Fr>, shares.0[0]);
    }
}
