//! Collects decryption shares for one ciphertext and combines `threshold` of them into the plaintext.

use ark_ec::{pairing::Pairing, CurveGroup, VariableBaseMSM};
use ark_std::{collections::BTreeMap, end_timer, start_timer, vec::Vec};
use threshold_dkg::common::{lagrange_basis_at_0_for_all, ParticipantId, ShareId, ThresholdConfig};
use tracing::{debug, warn};

use crate::{
    ciphertext::Ciphertext, decryption::DecryptionShare, error::TEError, keys::TEPublicKeyShare,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecryptSetState {
    /// No share added yet
    Empty,
    /// Fewer than `threshold` shares
    Collecting,
    /// At least `threshold` shares, can be merged
    Ready,
    /// Plaintext recovered. Terminal.
    Merged,
}

/// Decryption shares for one ciphertext, at most one per signer
#[derive(Clone, Debug)]
pub struct DecryptSet<E: Pairing> {
    config: ThresholdConfig,
    shares: BTreeMap<ParticipantId, DecryptionShare<E>>,
    merged: bool,
}

impl<E: Pairing> DecryptSet<E> {
    pub fn new(threshold: ShareId, total: ShareId) -> Result<Self, TEError> {
        Ok(Self {
            config: ThresholdConfig::new(threshold, total)?,
            shares: BTreeMap::new(),
            merged: false,
        })
    }

    pub fn threshold(&self) -> ShareId {
        self.config.threshold()
    }

    pub fn total(&self) -> ShareId {
        self.config.total()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Indices of signers whose shares were added, in ascending order
    pub fn signers(&self) -> Vec<ParticipantId> {
        self.shares.keys().copied().collect()
    }

    pub fn state(&self) -> DecryptSetState {
        if self.merged {
            DecryptSetState::Merged
        } else if self.shares.is_empty() {
            DecryptSetState::Empty
        } else if self.shares.len() < self.threshold() as usize {
            DecryptSetState::Collecting
        } else {
            DecryptSetState::Ready
        }
    }

    /// Add a share. Returns `Ok(false)` and leaves the set unchanged if a share from the same signer
    /// is already present. The share isn't verified, use `add_verified_decrypt` for shares from
    /// untrusted sources.
    pub fn add_decrypt(&mut self, share: DecryptionShare<E>) -> Result<bool, TEError> {
        if self.merged {
            return Err(TEError::AlreadyMerged);
        }
        let signer = share.signer_index;
        if !self.config.is_valid_participant_id(signer) {
            return Err(TEError::IndexOutOfRange(signer, self.total()));
        }
        if let Some(existing) = self.shares.get(&signer) {
            if *existing == share {
                debug!(signer, "ignoring repeated decryption share");
            } else {
                warn!(signer, "ignoring different decryption share from same signer");
            }
            return Ok(false);
        }
        self.shares.insert(signer, share);
        debug!(
            signer,
            shares_collected = self.shares.len(),
            threshold = self.threshold(),
            "added decryption share"
        );
        Ok(true)
    }

    /// Verify the share against the signer's public key share and the ciphertext before adding it
    pub fn add_verified_decrypt(
        &mut self,
        share: DecryptionShare<E>,
        public_key_share: &TEPublicKeyShare<E>,
        ciphertext: &Ciphertext<E>,
    ) -> Result<bool, TEError> {
        if let Err(e) = public_key_share.verify(ciphertext, &share) {
            warn!(signer = share.signer_index, error = ?e, "rejected decryption share");
            return Err(e);
        }
        self.add_decrypt(share)
    }

    /// Remove the share of `signer`, e.g. after a failed `merge` showed that an unverified share is
    /// bad. Returns the removed share, if any.
    pub fn remove(&mut self, signer: ParticipantId) -> Result<Option<DecryptionShare<E>>, TEError> {
        if self.merged {
            return Err(TEError::AlreadyMerged);
        }
        let removed = self.shares.remove(&signer);
        if removed.is_some() {
            debug!(signer, "removed decryption share");
        }
        Ok(removed)
    }

    /// Drop every share that doesn't verify against its signer's public key share. `public_key_shares`
    /// has the share of participant `i` at index `i - 1`. Returns the signers whose shares were dropped.
    pub fn retain_verified(
        &mut self,
        public_key_shares: &[TEPublicKeyShare<E>],
        ciphertext: &Ciphertext<E>,
    ) -> Result<Vec<ParticipantId>, TEError> {
        if self.merged {
            return Err(TEError::AlreadyMerged);
        }
        ciphertext.verify()?;
        let mut dropped = Vec::new();
        for (signer, share) in self.shares.iter() {
            let verified = public_key_shares
                .get(*signer as usize - 1)
                .ok_or(TEError::IndexOutOfRange(*signer, public_key_shares.len() as ShareId))
                .and_then(|pk| pk.verify(ciphertext, share));
            if let Err(e) = verified {
                warn!(signer, error = ?e, "dropping decryption share");
                dropped.push(*signer);
            }
        }
        for signer in &dropped {
            self.shares.remove(signer);
        }
        Ok(dropped)
    }

    /// Recover the plaintext of `ciphertext`. Needs `threshold` shares and uses the ones with the
    /// smallest signer indices when there are more.
    pub fn merge(&mut self, ciphertext: &Ciphertext<E>) -> Result<Vec<u8>, TEError> {
        if self.merged {
            return Err(TEError::AlreadyMerged);
        }
        let threshold = self.threshold();
        if self.shares.len() < threshold as usize {
            return Err(TEError::InsufficientShares {
                required: threshold,
                received: self.shares.len() as ShareId,
            });
        }
        ciphertext.verify()?;

        let timer = start_timer!(|| "Merge decryption shares");
        let (ids, points): (Vec<_>, Vec<_>) = self
            .shares
            .values()
            .take(threshold as usize)
            .map(|s| (s.signer_index, s.share))
            .unzip();
        let basis = lagrange_basis_at_0_for_all::<E::ScalarField>(ids)?;
        // U * s
        let y = E::G2::msm_unchecked(&points, &basis).into_affine();
        let message = ciphertext.unmask(&y)?;

        self.merged = true;
        debug!(message_len = message.len(), "merged decryption shares");
        end_timer!(timer);
        Ok(message)
    }
}
