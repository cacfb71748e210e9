//! Per-participant driver of the distributed key generation. Every participant acts as a Feldman VSS
//! dealer of its own random polynomial and as a verifier of the shares dealt to it by others.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{PrimeField, Zero};
use ark_poly::{univariate::DensePolynomial, Polynomial};
use ark_std::{cfg_into_iter, cfg_iter, rand::RngCore, vec::Vec};
use tracing::warn;

use crate::{
    common::{ParticipantId, Share, ShareId, Shares, ThresholdConfig, VerificationVector},
    error::DkgError,
    polynomial,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs the computational steps of one DKG participant. `ck` is the public generator the polynomial
/// coefficients are multiplied with to create the verification vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dkg<G: AffineRepr> {
    config: ThresholdConfig,
    ck: G,
}

/// Outcome of verifying shares received from several senders. Shares from `rejected` senders must
/// not be used when creating the secret key share.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub accepted: Vec<ParticipantId>,
    pub rejected: Vec<(ParticipantId, DkgError)>,
}

impl VerificationReport {
    /// Whether enough senders remain for the threshold
    pub fn has_quorum(&self, threshold: ShareId) -> bool {
        self.accepted.len() >= threshold as usize
    }
}

impl<G: AffineRepr> Dkg<G> {
    pub fn new(config: ThresholdConfig, ck: G) -> Self {
        Self { config, ck }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn threshold(&self) -> ShareId {
        self.config.threshold()
    }

    pub fn total(&self) -> ShareId {
        self.config.total()
    }

    pub fn generator(&self) -> &G {
        &self.ck
    }

    /// Generate this participant's secret polynomial of degree `threshold - 1`
    pub fn generate_polynomial<R: RngCore>(
        &self,
        rng: &mut R,
    ) -> Result<DensePolynomial<G::ScalarField>, DkgError> {
        polynomial::generate_polynomial(rng, self.threshold())
    }

    /// Shares of the polynomial for all participants, the share for participant `i` is the polynomial
    /// evaluated at `i`. Share `i` is at index `i - 1`.
    pub fn secret_key_contribution(
        &self,
        poly: &DensePolynomial<G::ScalarField>,
    ) -> Result<Shares<G::ScalarField>, DkgError> {
        self.check_polynomial(poly)?;
        let threshold = self.threshold();
        let shares = cfg_into_iter!(1..=self.total())
            .map(|i| {
                (
                    i as ShareId,
                    threshold,
                    poly.evaluate(&G::ScalarField::from(i as u64)),
                )
                    .into()
            })
            .collect::<Vec<_>>();
        Ok(Shares(shares))
    }

    /// Commit to each coefficient of the polynomial by multiplying it with the generator
    pub fn verification_vector(
        &self,
        poly: &DensePolynomial<G::ScalarField>,
    ) -> Result<VerificationVector<G>, DkgError> {
        self.check_polynomial(poly)?;
        Ok(commit_to_poly(poly, &self.ck).into())
    }

    /// Executed by each participant to verify a share it received against the sender's verification vector.
    /// Checks that `\sum_k{vv[k] * id^k} == g * share`.
    pub fn verify_share(
        &self,
        share: &Share<G::ScalarField>,
        sender_vv: &VerificationVector<G>,
    ) -> Result<(), DkgError> {
        let threshold = self.threshold();
        if share.threshold != threshold {
            return Err(DkgError::UnequalThresholdInReceivedShare(
                threshold,
                share.threshold,
            ));
        }
        self.config.check_participant_id(share.id)?;
        if !sender_vv.supports_threshold(threshold) {
            return Err(DkgError::DoesNotSupportThreshold(threshold));
        }
        if sender_vv.evaluate_at(share.id) != self.ck.mul_bigint(share.share.into_bigint()) {
            return Err(DkgError::InvalidShare(share.id));
        }
        Ok(())
    }

    /// Verify shares received from several senders. Each verification is independent of the others.
    pub fn verify_shares(
        &self,
        received: &[(
            ParticipantId,
            &Share<G::ScalarField>,
            &VerificationVector<G>,
        )],
    ) -> VerificationReport {
        let results = cfg_iter!(received)
            .map(|(sender, share, vv)| (*sender, self.verify_share(share, vv)))
            .collect::<Vec<_>>();
        let mut report = VerificationReport::default();
        for (sender, result) in results {
            match result {
                Ok(()) => report.accepted.push(sender),
                Err(e) => {
                    warn!(sender, error = ?e, "rejected DKG share");
                    report.rejected.push((sender, e))
                }
            }
        }
        report
    }

    /// Add the verified shares received by participant `own_id` (including its own) to get its share
    /// of the distributed secret. Needs shares from at least `threshold` senders, one share per sender.
    /// Shares don't carry their sender so only a repeated share is detected, use
    /// `ContributionAccumulator` to key them by sender.
    pub fn secret_key_share_create<'a>(
        &self,
        own_id: ParticipantId,
        received: impl IntoIterator<Item = &'a Share<G::ScalarField>>,
    ) -> Result<Share<G::ScalarField>, DkgError> {
        self.config.check_participant_id(own_id)?;
        let threshold = self.threshold();
        let mut count = 0;
        let mut sum = G::ScalarField::zero();
        let mut seen = Vec::new();
        for share in received {
            if seen.contains(&&share.share) {
                return Err(DkgError::DuplicateShare(own_id));
            }
            seen.push(&share.share);
            if share.id != own_id {
                return Err(DkgError::UnequalParticipantAndShareId(own_id, share.id));
            }
            if share.threshold != threshold {
                return Err(DkgError::UnequalThresholdInReceivedShare(
                    threshold,
                    share.threshold,
                ));
            }
            sum += share.share;
            count += 1;
        }
        if count < threshold {
            return Err(DkgError::BelowThreshold(threshold, count));
        }
        Ok(Share {
            id: own_id,
            threshold,
            share: sum,
        })
    }

    /// The threshold public key, i.e. sum of the commitments to the secrets of all qualified participants.
    /// Needs no secret and can be computed by anyone holding the verification vectors. Each qualified
    /// participant's vector must be given once.
    pub fn public_key_from_verification_vectors(
        &self,
        vvs: &[VerificationVector<G>],
    ) -> Result<G, DkgError> {
        check_distinct(vvs)?;
        let mut pk = G::Group::zero();
        for vv in vvs {
            pk += *self.checked_commitment_to_secret(vv)?;
        }
        Ok(pk.into_affine())
    }

    /// The public share of participant `id`, i.e. `g` multiplied by its share of the distributed secret.
    /// Computed from the verification vectors of all qualified participants.
    pub fn public_share_from_verification_vectors(
        &self,
        id: ParticipantId,
        vvs: &[VerificationVector<G>],
    ) -> Result<G, DkgError> {
        self.config.check_participant_id(id)?;
        check_distinct(vvs)?;
        let threshold = self.threshold();
        if vvs.iter().any(|vv| !vv.supports_threshold(threshold)) {
            return Err(DkgError::DoesNotSupportThreshold(threshold));
        }
        Ok(cfg_iter!(vvs)
            .map(|vv| vv.evaluate_at(id))
            .sum::<G::Group>()
            .into_affine())
    }

    fn checked_commitment_to_secret<'a>(
        &self,
        vv: &'a VerificationVector<G>,
    ) -> Result<&'a G, DkgError> {
        let threshold = self.threshold();
        if !vv.supports_threshold(threshold) {
            return Err(DkgError::DoesNotSupportThreshold(threshold));
        }
        vv.commitment_to_secret()
            .ok_or(DkgError::DoesNotSupportThreshold(threshold))
    }

    fn check_polynomial(&self, poly: &DensePolynomial<G::ScalarField>) -> Result<(), DkgError> {
        if polynomial::threshold_of(poly) != self.threshold() as usize {
            return Err(DkgError::DoesNotSupportThreshold(self.threshold()));
        }
        Ok(())
    }
}

fn check_distinct<G: AffineRepr>(vvs: &[VerificationVector<G>]) -> Result<(), DkgError> {
    for (i, vv) in vvs.iter().enumerate() {
        if vvs[..i].contains(vv) {
            return Err(DkgError::DuplicateVerificationVector(i));
        }
    }
    Ok(())
}

pub(crate) fn commit_to_poly<G: AffineRepr>(
    poly: &DensePolynomial<G::ScalarField>,
    ck: &G,
) -> Vec<G> {
    G::Group::normalize_batch(
        &cfg_iter!(poly.coeffs)
            .map(|i| ck.mul_bigint(i.into_bigint()))
            .collect::<Vec<_>>(),
    )
}
