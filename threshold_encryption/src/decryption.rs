//! Decryption shares. A participant with private key share `s_i` computes `D_i = U * s_i` for a
//! ciphertext `(U, V, W)`. Anyone with the participant's public key share `PK_i = g * s_i` can check
//! `e(H(U, V), D_i) == e(W, PK_i)`, which holds since both sides equal `e(H(U, V), g)^{r * s_i}`.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use threshold_dkg::common::ParticipantId;
use threshold_te_utils::serde_utils::ArkObjectBytes;

use crate::{
    ciphertext::Ciphertext,
    error::TEError,
    keys::{TEPrivateKeyShare, TEPublicKeyShare},
};

/// A participant's partial decryption of a ciphertext
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct DecryptionShare<E: Pairing> {
    pub signer_index: ParticipantId,
    /// `U * s_i`
    #[serde_as(as = "ArkObjectBytes")]
    pub share: E::G2Affine,
}

impl<E: Pairing> TEPrivateKeyShare<E> {
    /// Partial decryption of a well-formed ciphertext. Deterministic.
    pub fn get_decryption_share(
        &self,
        ciphertext: &Ciphertext<E>,
    ) -> Result<DecryptionShare<E>, TEError> {
        ciphertext.verify()?;
        Ok(DecryptionShare {
            signer_index: self.signer_index,
            share: ciphertext.u.mul_bigint(self.share.into_bigint()).into_affine(),
        })
    }
}

impl<E: Pairing> TEPublicKeyShare<E> {
    /// Check that `share` was created by this participant for `ciphertext`
    pub fn verify(
        &self,
        ciphertext: &Ciphertext<E>,
        share: &DecryptionShare<E>,
    ) -> Result<(), TEError> {
        ciphertext.verify()?;
        if share.signer_index != self.signer_index {
            return Err(TEError::UnequalSignerAndShareId(
                self.signer_index,
                share.signer_index,
            ));
        }
        let h = ciphertext.hash_to_g1()?;
        // e(H(U, V), D_i) * e(-W, PK_i) == 1
        if !E::multi_pairing(
            [
                E::G1Prepared::from(h),
                E::G1Prepared::from(-ciphertext.w.into_group()),
            ],
            [
                E::G2Prepared::from(share.share),
                E::G2Prepared::from(self.public_key_share),
            ],
        )
        .is_zero()
        {
            return Err(TEError::InvalidDecryptionShare(share.signer_index));
        }
        Ok(())
    }
}
