//! Keys of the threshold encryption scheme. Public keys and public key shares are in group G2,
//! multiples of its fixed generator.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, vec::Vec, UniformRand};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use threshold_dkg::{
    common::{lagrange_basis_at_0_for_all, ParticipantId, ShareId, ThresholdConfig},
    polynomial::{evaluate_at, generate_polynomial_with_secret},
};
use threshold_te_utils::serde_utils::ArkObjectBytes;
use zeroize::Zeroize;

use crate::{ciphertext::Ciphertext, error::TEError};

/// Public key to encrypt to. Its secret key is never held by a single party.
#[serde_as]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct TEPublicKey<E: Pairing>(#[serde_as(as = "ArkObjectBytes")] pub E::G2Affine);

/// The full secret key. Only exists when reconstructed from `threshold` private key shares or when
/// created by a trusted dealer.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TEPrivateKey<E: Pairing>(#[serde_as(as = "ArkObjectBytes")] pub E::ScalarField);

/// A participant's share of the secret key
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TEPrivateKeyShare<E: Pairing> {
    pub signer_index: ParticipantId,
    #[serde_as(as = "ArkObjectBytes")]
    pub share: E::ScalarField,
    pub threshold: ShareId,
    pub total: ShareId,
}

/// `g * share` for a participant's private key share. Used to verify its decryption shares.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TEPublicKeyShare<E: Pairing> {
    pub signer_index: ParticipantId,
    #[serde_as(as = "ArkObjectBytes")]
    pub public_key_share: E::G2Affine,
    pub threshold: ShareId,
    pub total: ShareId,
}

impl<E: Pairing> Drop for TEPrivateKey<E> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<E: Pairing> Drop for TEPrivateKeyShare<E> {
    fn drop(&mut self) {
        self.share.zeroize();
    }
}

impl<E: Pairing> TEPublicKey<E> {
    pub fn from_private_key(key: &TEPrivateKey<E>) -> Self {
        Self(
            E::G2Affine::generator()
                .mul_bigint(key.0.into_bigint())
                .into_affine(),
        )
    }

    /// The identity can't be a public key as every ciphertext would decrypt with the zero key
    pub fn is_valid(&self) -> bool {
        !self.0.is_zero()
    }

    /// Encrypt `message` using fresh randomness from `rng`. Encrypting the same message twice gives
    /// different ciphertexts.
    pub fn encrypt<R: RngCore>(&self, rng: &mut R, message: &[u8]) -> Result<Ciphertext<E>, TEError> {
        if !self.is_valid() {
            return Err(TEError::InvalidPublicKey);
        }
        Ciphertext::new(rng, &self.0, message)
    }
}

impl<E: Pairing> TEPrivateKey<E> {
    pub fn new<R: RngCore>(rng: &mut R) -> Self {
        Self(E::ScalarField::rand(rng))
    }

    /// Reconstruct the secret key from the first `threshold` of the given shares
    pub fn from_shares(shares: &[TEPrivateKeyShare<E>]) -> Result<Self, TEError> {
        let first = shares.first().ok_or(TEError::InsufficientShares {
            required: 1,
            received: 0,
        })?;
        let threshold = first.threshold;
        if shares.len() < threshold as usize {
            return Err(TEError::InsufficientShares {
                required: threshold,
                received: shares.len() as ShareId,
            });
        }
        let shares = &shares[..threshold as usize];
        let basis = lagrange_basis_at_0_for_all::<E::ScalarField>(
            shares.iter().map(|s| s.signer_index).collect(),
        )?;
        Ok(Self(
            basis
                .into_iter()
                .zip(shares.iter())
                .map(|(b, s)| b * s.share)
                .sum(),
        ))
    }

    pub fn public_key(&self) -> TEPublicKey<E> {
        TEPublicKey::from_private_key(self)
    }
}

impl<E: Pairing> TEPrivateKeyShare<E> {
    pub fn new(
        signer_index: ParticipantId,
        share: E::ScalarField,
        threshold: ShareId,
        total: ShareId,
    ) -> Result<Self, TEError> {
        let config = ThresholdConfig::new(threshold, total)?;
        if !config.is_valid_participant_id(signer_index) {
            return Err(TEError::IndexOutOfRange(signer_index, total));
        }
        Ok(Self {
            signer_index,
            share,
            threshold,
            total,
        })
    }

    pub fn signer_index(&self) -> ParticipantId {
        self.signer_index
    }

    pub fn threshold(&self) -> ShareId {
        self.threshold
    }

    pub fn total(&self) -> ShareId {
        self.total
    }

    /// Trusted dealer setup: shares of a fresh random secret key for `total` participants, any
    /// `threshold` of which can decrypt, and the public key.
    pub fn generate_sample_keys<R: RngCore>(
        rng: &mut R,
        threshold: ShareId,
        total: ShareId,
    ) -> Result<(Vec<Self>, TEPublicKey<E>), TEError> {
        let config = ThresholdConfig::new(threshold, total)?;
        let secret = TEPrivateKey::<E>::new(rng);
        let mut poly = generate_polynomial_with_secret(rng, secret.0, threshold)?;
        let shares = config
            .participant_ids()
            .map(|i| -> Result<Self, TEError> {
                Self::new(i, evaluate_at(&poly, i)?, threshold, total)
            })
            .collect::<Result<Vec<_>, TEError>>();
        poly.coeffs.zeroize();
        Ok((shares?, secret.public_key()))
    }
}

impl<E: Pairing> TEPublicKeyShare<E> {
    pub fn new(private_share: &TEPrivateKeyShare<E>) -> Self {
        Self {
            signer_index: private_share.signer_index,
            public_key_share: E::G2Affine::generator()
                .mul_bigint(private_share.share.into_bigint())
                .into_affine(),
            threshold: private_share.threshold,
            total: private_share.total,
        }
    }

    pub fn signer_index(&self) -> ParticipantId {
        self.signer_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use test_utils::test_serialization;

    type E = ark_bls12_381::Bls12_381;

    #[test]
    fn sample_keys_reconstruct() {
        let mut rng = StdRng::seed_from_u64(0u64);
        for (threshold, total) in [(1, 1), (1, 3), (2, 3), (3, 5), (5, 5)] {
            let (shares, pk) =
                TEPrivateKeyShare::<E>::generate_sample_keys(&mut rng, threshold, total).unwrap();
            assert_eq!(shares.len(), total as usize);
            assert!(pk.is_valid());
            for (i, s) in shares.iter().enumerate() {
                assert_eq!(s.signer_index(), i as ParticipantId + 1);
                assert_eq!(s.threshold(), threshold);
                assert_eq!(s.total(), total);
            }

            // Any window of `threshold` shares gives the same key
            for start in 0..=(total - threshold) as usize {
                let sk = TEPrivateKey::from_shares(&shares[start..]).unwrap();
                assert_eq!(sk.public_key(), pk);
            }

            if threshold > 1 {
                assert!(matches!(
                    TEPrivateKey::from_shares(&shares[..threshold as usize - 1]),
                    Err(TEError::InsufficientShares { required, received })
                        if required == threshold && received == threshold - 1
                ));
            }
        }
        assert!(TEPrivateKey::<E>::from_shares(&[]).is_err());
        assert!(TEPrivateKeyShare::<E>::generate_sample_keys(&mut rng, 4, 3).is_err());
    }

    #[test]
    fn key_share_construction() {
        let mut rng = StdRng::seed_from_u64(1u64);
        let share = <E as Pairing>::ScalarField::rand(&mut rng);
        assert!(matches!(
            TEPrivateKeyShare::<E>::new(0, share, 2, 3),
            Err(TEError::IndexOutOfRange(0, 3))
        ));
        assert!(matches!(
            TEPrivateKeyShare::<E>::new(4, share, 2, 3),
            Err(TEError::IndexOutOfRange(4, 3))
        ));
        assert!(TEPrivateKeyShare::<E>::new(1, share, 0, 3).is_err());

        let sk_share = TEPrivateKeyShare::<E>::new(3, share, 2, 3).unwrap();
        let pk_share = TEPublicKeyShare::new(&sk_share);
        assert_eq!(pk_share.signer_index(), 3);
        assert_eq!(
            pk_share.public_key_share,
            (<E as Pairing>::G2Affine::generator() * share).into_affine()
        );

        test_serialization!(TEPrivateKeyShare<E>, sk_share);
        test_serialization!(TEPublicKeyShare<E>, pk_share);
    }

    #[test]
    fn zero_public_key_is_rejected() {
        let mut rng = StdRng::seed_from_u64(2u64);
        let pk = TEPublicKey::<E>(<E as Pairing>::G2Affine::zero());
        assert!(!pk.is_valid());
        assert!(matches!(
            pk.encrypt(&mut rng, b"msg"),
            Err(TEError::InvalidPublicKey)
        ));

        let sk = TEPrivateKey::<E>::new(&mut rng);
        let pk = sk.public_key();
        assert!(pk.is_valid());
        test_serialization!(TEPublicKey<E>, pk);
        test_serialization!(TEPrivateKey<E>, sk);
    }
}
