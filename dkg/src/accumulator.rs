//! Used by a DKG participant to collect the shares and verification vectors dealt to it, reject
//! the senders whose shares don't verify and finally compute its share of the distributed secret.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    collections::{BTreeMap, BTreeSet},
    end_timer, start_timer, vec,
    vec::Vec,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::{
    common::{ParticipantId, Share, ShareId, ThresholdConfig, VerificationVector},
    dkg::Dkg,
    error::DkgError,
};

/// Used by a participant to store received shares and verification vectors.
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct ContributionAccumulator<G: AffineRepr> {
    pub participant_id: ParticipantId,
    pub threshold: ShareId,
    pub total: ShareId,
    pub shares: BTreeMap<ParticipantId, Share<G::ScalarField>>,
    pub verification_vectors: BTreeMap<ParticipantId, VerificationVector<G>>,
    /// Senders whose share failed verification. Their contribution is excluded.
    pub rejected: BTreeSet<ParticipantId>,
}

/// Result of a participant's DKG run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DkgOutput<G: AffineRepr> {
    /// Share of the distributed secret
    pub share: Share<G::ScalarField>,
    /// `g * share`
    pub public_share: G,
    /// `g * secret`
    pub threshold_public_key: G,
    /// Senders whose contributions make up the distributed secret
    pub qualified: Vec<ParticipantId>,
}

impl<G: AffineRepr> Zeroize for ContributionAccumulator<G> {
    fn zeroize(&mut self) {
        self.shares.values_mut().for_each(|v| v.zeroize())
    }
}

impl<G: AffineRepr> Drop for ContributionAccumulator<G> {
    fn drop(&mut self) {
        self.zeroize()
    }
}

impl<G: AffineRepr> ContributionAccumulator<G> {
    pub fn new(id: ParticipantId, config: &ThresholdConfig) -> Result<Self, DkgError> {
        config.check_participant_id(id)?;
        Ok(Self {
            participant_id: id,
            threshold: config.threshold(),
            total: config.total(),
            shares: Default::default(),
            verification_vectors: Default::default(),
            rejected: Default::default(),
        })
    }

    /// Called by a participant when it creates a share for itself
    pub fn add_self_share(
        &mut self,
        share: Share<G::ScalarField>,
        verification_vector: VerificationVector<G>,
    ) {
        self.update_unchecked(self.participant_id, share, verification_vector)
    }

    /// Called by a participant when it receives a share from another participant. A share failing
    /// verification marks the sender as rejected and further shares from it are refused.
    pub fn add_received_share<'a>(
        &mut self,
        sender_id: ParticipantId,
        share: Share<G::ScalarField>,
        verification_vector: VerificationVector<G>,
        ck: impl Into<&'a G>,
    ) -> Result<(), DkgError> {
        if sender_id == self.participant_id {
            return Err(DkgError::SenderIdSameAsReceiver(
                sender_id,
                self.participant_id,
            ));
        }
        if sender_id < 1 || sender_id > self.total {
            return Err(DkgError::InvalidParticipantId(sender_id));
        }
        if self.shares.contains_key(&sender_id) || self.rejected.contains(&sender_id) {
            return Err(DkgError::AlreadyProcessedFromSender(sender_id));
        }
        if self.participant_id != share.id {
            return Err(DkgError::UnequalParticipantAndShareId(
                self.participant_id,
                share.id,
            ));
        }
        let ck: &G = ck.into();
        let dkg = Dkg::new(self.config()?, *ck);
        if let Err(e) = dkg.verify_share(&share, &verification_vector) {
            warn!(
                receiver = self.participant_id,
                sender = sender_id,
                error = ?e,
                "excluding DKG sender"
            );
            self.rejected.insert(sender_id);
            return Err(e);
        }
        self.update_unchecked(sender_id, share, verification_vector);
        Ok(())
    }

    /// Senders whose contributions were accepted, in ascending order
    pub fn qualified(&self) -> Vec<ParticipantId> {
        self.shares.keys().copied().collect()
    }

    /// Senders whose contributions were rejected, in ascending order
    pub fn rejected(&self) -> Vec<ParticipantId> {
        self.rejected.iter().copied().collect()
    }

    /// Whether shares from at least `threshold` senders have been accepted
    pub fn has_quorum(&self) -> bool {
        self.shares.len() >= self.threshold as usize
    }

    /// Called by a participant when it has received shares from all participants. Computes the final
    /// share of the distributed secret, own public share and the threshold public key
    pub fn finalize<'a>(mut self, ck: impl Into<&'a G>) -> Result<DkgOutput<G>, DkgError> {
        let shares = core::mem::take(&mut self.shares);
        let vvs = core::mem::take(&mut self.verification_vectors);
        Self::gen_final_share_and_public_key(
            self.participant_id,
            self.config()?,
            shares,
            vvs,
            ck.into(),
        )
    }

    /// Compute the final share after receiving shares from all other participants. Also returns
    /// own public share and the threshold public key
    pub fn gen_final_share_and_public_key(
        participant_id: ParticipantId,
        config: ThresholdConfig,
        shares: BTreeMap<ParticipantId, Share<G::ScalarField>>,
        verification_vectors: BTreeMap<ParticipantId, VerificationVector<G>>,
        ck: &G,
    ) -> Result<DkgOutput<G>, DkgError> {
        let threshold = config.threshold();
        // Check early that sufficient shares present
        let len = shares.len() as ShareId;
        if threshold > len {
            return Err(DkgError::BelowThreshold(threshold, len));
        }

        let timer = start_timer!(|| "Finalize DKG share");
        let dkg = Dkg::new(config, *ck);
        let qualified = shares.keys().copied().collect::<Vec<_>>();
        let final_share = dkg.secret_key_share_create(participant_id, shares.values())?;

        let mut final_comm_coeffs = vec![G::Group::zero(); threshold as usize];
        let mut threshold_pk = G::Group::zero();
        for vv in verification_vectors.values() {
            if !vv.supports_threshold(threshold) {
                return Err(DkgError::DoesNotSupportThreshold(threshold));
            }
            for (c, v) in final_comm_coeffs.iter_mut().zip(vv.0.iter()) {
                *c += *v;
            }
            threshold_pk += vv.0[0];
        }
        let final_vv = VerificationVector(G::Group::normalize_batch(&final_comm_coeffs));
        dkg.verify_share(&final_share, &final_vv)?;

        let public_share = ck.mul_bigint(final_share.share.into_bigint()).into_affine();
        debug!(
            participant = participant_id,
            qualified = qualified.len(),
            "finalized DKG share"
        );
        end_timer!(timer);
        Ok(DkgOutput {
            share: final_share,
            public_share,
            threshold_public_key: threshold_pk.into_affine(),
            qualified,
        })
    }

    fn config(&self) -> Result<ThresholdConfig, DkgError> {
        ThresholdConfig::new(self.threshold, self.total)
    }

    /// Update accumulator on share created by self. Assumes the share is valid
    fn update_unchecked(
        &mut self,
        id: ParticipantId,
        share: Share<G::ScalarField>,
        verification_vector: VerificationVector<G>,
    ) {
        self.shares.insert(id, share);
        self.verification_vectors.insert(id, verification_vector);
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::common::Shares;
    use ark_ec::Group;
    use ark_ff::One;
    use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };
    use test_utils::{test_serialization, G1, G2};

    #[test]
    fn accumulate_contributions() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let g1 = G1::rand(&mut rng);
        let g2 = G2::rand(&mut rng);

        fn check<G: AffineRepr>(rng: &mut StdRng, g: &G) {
            let mut checked_serialization = false;
            for (threshold, total) in vec![(1, 2), (2, 3), (3, 5), (4, 8), (5, 5), (7, 10)] {
                let config = ThresholdConfig::new(threshold, total).unwrap();
                let dkg = Dkg::new(config, *g);
                // There are `total` number of participants
                let mut accumulators = (1..=total)
                    .map(|i| ContributionAccumulator::new(i, &config).unwrap())
                    .collect::<Vec<_>>();
                let mut secrets = vec![];

                // Each participant creates a secret and secret-shares it with other participants
                for sender_id in 1..=total {
                    let poly = dkg.generate_polynomial(rng).unwrap();
                    secrets.push(poly.coeffs[0]);
                    let shares = dkg.secret_key_contribution(&poly).unwrap();
                    let vv = dkg.verification_vector(&poly).unwrap();
                    for receiver_id in 1..=total {
                        let acc = &mut accumulators[receiver_id as usize - 1];
                        let share = shares.get(receiver_id).unwrap().clone();
                        if sender_id != receiver_id {
                            // Participant rejects shares meant for someone else
                            let mut share_with_wrong_id = share.clone();
                            share_with_wrong_id.id = (receiver_id % total) + 1;
                            if share_with_wrong_id.id != receiver_id {
                                assert!(acc
                                    .add_received_share(sender_id, share_with_wrong_id, vv.clone(), g)
                                    .is_err());
                            }

                            acc.add_received_share(sender_id, share.clone(), vv.clone(), g)
                                .unwrap();

                            // Adding duplicate share not allowed
                            assert_eq!(
                                acc.add_received_share(sender_id, share, vv.clone(), g),
                                Err(DkgError::AlreadyProcessedFromSender(sender_id))
                            );
                        } else {
                            acc.add_self_share(share.clone(), vv.clone());

                            // Cannot add share with own id
                            assert!(acc.add_received_share(sender_id, share, vv.clone(), g).is_err());
                        }
                    }
                }

                if !checked_serialization {
                    test_serialization!(ContributionAccumulator<G>, accumulators[0].clone());
                    checked_serialization = true;
                }

                let mut tk = None;
                let mut final_shares = vec![];
                for accumulator in accumulators {
                    assert!(accumulator.has_quorum());
                    assert!(accumulator.rejected().is_empty());
                    let output = accumulator.finalize(g).unwrap();
                    assert_eq!(
                        g.mul_bigint(output.share.share.into_bigint()).into_affine(),
                        output.public_share
                    );
                    assert_eq!(output.qualified.len(), total as usize);
                    if tk.is_none() {
                        tk = Some(output.threshold_public_key);
                    } else {
                        // All generate the same threshold key
                        assert_eq!(tk, Some(output.threshold_public_key));
                    }
                    final_shares.push(output.share);
                }

                let final_secret = secrets.iter().sum::<G::ScalarField>();
                assert_eq!(Shares(final_shares).reconstruct_secret().unwrap(), final_secret);
                assert_eq!(
                    tk,
                    Some(g.mul_bigint(final_secret.into_bigint()).into_affine())
                );
            }
        }

        check(&mut rng, &g1);
        check(&mut rng, &g2);
    }

    #[test]
    fn rejected_sender_is_excluded() {
        let mut rng = StdRng::seed_from_u64(1u64);
        let g = G2::rand(&mut rng);
        let config = ThresholdConfig::new(2, 3).unwrap();
        let dkg = Dkg::new(config, g);

        let polys = (0..3)
            .map(|_| dkg.generate_polynomial(&mut rng).unwrap())
            .collect::<Vec<_>>();
        let vvs = polys
            .iter()
            .map(|p| dkg.verification_vector(p).unwrap())
            .collect::<Vec<_>>();
        let contributions = polys
            .iter()
            .map(|p| dkg.secret_key_contribution(p).unwrap())
            .collect::<Vec<_>>();

        let mut acc = ContributionAccumulator::new(1, &config).unwrap();
        assert!(ContributionAccumulator::<G2>::new(4, &config).is_err());

        // Not enough shares yet
        assert!(acc.clone().finalize(&g).is_err());

        acc.add_self_share(contributions[0].get(1).unwrap().clone(), vvs[0].clone());

        // Sender 2's share is corrupted
        let mut bad = contributions[1].get(1).unwrap().clone();
        bad.share += <G2 as AffineRepr>::ScalarField::one();
        assert_eq!(
            acc.add_received_share(2, bad, vvs[1].clone(), &g),
            Err(DkgError::InvalidShare(1))
        );
        assert_eq!(acc.rejected(), vec![2]);

        // A second attempt from the rejected sender, even with a valid share, is refused
        assert_eq!(
            acc.add_received_share(2, contributions[1].get(1).unwrap().clone(), vvs[1].clone(), &g),
            Err(DkgError::AlreadyProcessedFromSender(2))
        );

        // Verification vector committing to a different secret
        let mut wrong_vv = vvs[2].clone();
        wrong_vv.0[0] = wrong_vv.0[0].into_group().double().into_affine();
        let mut acc_copy = acc.clone();
        assert!(acc_copy
            .add_received_share(3, contributions[2].get(1).unwrap().clone(), wrong_vv, &g)
            .is_err());

        // Unknown sender
        assert_eq!(
            acc.add_received_share(4, contributions[2].get(1).unwrap().clone(), vvs[2].clone(), &g),
            Err(DkgError::InvalidParticipantId(4))
        );

        acc.add_received_share(3, contributions[2].get(1).unwrap().clone(), vvs[2].clone(), &g)
            .unwrap();
        assert!(acc.has_quorum());
        assert_eq!(acc.qualified(), vec![1, 3]);

        let output = acc.finalize(&g).unwrap();
        assert_eq!(output.qualified, vec![1, 3]);
        assert_eq!(
            output.threshold_public_key,
            (vvs[0].0[0] + vvs[2].0[0]).into_affine()
        );
        assert_eq!(
            output.share.share,
            contributions[0].get(1).unwrap().share + contributions[2].get(1).unwrap().share
        );
    }
}
