//! Ciphertext of the threshold encryption scheme and the hashing it relies on.
//!
//! Encryption of message `m` under public key `PK = g * s`, for the fixed generator `g` of group G2:
//!
//! 1. pick a fresh random `r` and compute `U = g * r` and `Y = PK * r`
//! 2. derive a mask from `Y` and `U` with HKDF-SHA256 and set `V = (m || checksum(m)) XOR mask`
//! 3. `W = H(U, V) * r` where `H` hashes to group G1
//!
//! Anyone can check a ciphertext is well-formed as `e(W, g) == e(H(U, V), U)` which binds `V` and `W`
//! to `U`. Decryption needs `Y` which equals `U * s` and is recovered from decryption shares.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{end_timer, rand::RngCore, start_timer, vec::Vec, UniformRand};
use digest::Digest;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sha2::Sha256;
use threshold_te_utils::{
    concat_slices,
    hashing_utils::{
        affine_group_elem_from_try_and_incr, expand_to_mask, xor_in_place, MAX_MASK_BYTE_SIZE,
    },
    serde_utils::ArkObjectBytes,
};

use crate::error::TEError;

/// Domain separation tag when hashing `U` and `V` to group G1
pub const HASH_TO_G1_DOMAIN: &[u8] = b"THRESHOLD-TE:HASH-TO-G1:";
/// Salt of the HKDF that expands `Y` into the mask
pub const MASK_SALT: &[u8] = b"THRESHOLD-TE:MASK:";
const CHECKSUM_DOMAIN: &[u8] = b"THRESHOLD-TE:CHECKSUM:";

/// Size of the checksum appended to the message before masking
pub const CHECKSUM_SIZE: usize = 32;
/// Longest message that can be encrypted
pub const MAX_MESSAGE_SIZE: usize = MAX_MASK_BYTE_SIZE - CHECKSUM_SIZE;

#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct Ciphertext<E: Pairing> {
    /// `g * r`
    #[serde_as(as = "ArkObjectBytes")]
    pub u: E::G2Affine,
    /// Masked message followed by its masked checksum
    pub v: Vec<u8>,
    /// `H(U, V) * r`
    #[serde_as(as = "ArkObjectBytes")]
    pub w: E::G1Affine,
}

impl<E: Pairing> Ciphertext<E> {
    /// Encrypt `message` for the holders of the secret key of `pk` using fresh randomness from `rng`
    pub(crate) fn new<R: RngCore>(
        rng: &mut R,
        pk: &E::G2Affine,
        message: &[u8],
    ) -> Result<Self, TEError> {
        if message.len() > MAX_MESSAGE_SIZE {
            return Err(TEError::MessageTooLong(message.len()));
        }
        let timer = start_timer!(|| "Encrypt");
        let r = E::ScalarField::rand(rng).into_bigint();
        let u = E::G2Affine::generator().mul_bigint(r).into_affine();
        let y = pk.mul_bigint(r).into_affine();

        let mut v = concat_slices!(message, checksum(message));
        let mask = derive_mask::<E>(&y, &u, v.len())?;
        xor_in_place(&mut v, &mask);

        let w = hash_to_g1::<E>(&u, &v)?.mul_bigint(r).into_affine();
        end_timer!(timer);
        Ok(Self { u, v, w })
    }

    /// `H(U, V)`
    pub fn hash_to_g1(&self) -> Result<E::G1Affine, TEError> {
        hash_to_g1::<E>(&self.u, &self.v)
    }

    /// Check that the ciphertext is well-formed, i.e. `e(W, g) == e(H(U, V), U)`. Decryption shares
    /// are only created and combined for well-formed ciphertexts.
    pub fn verify(&self) -> Result<(), TEError> {
        if self.u.is_zero() || self.w.is_zero() || self.v.len() < CHECKSUM_SIZE {
            return Err(TEError::InvalidCiphertext);
        }
        let h = self.hash_to_g1()?;
        // e(W, g) * e(-H(U, V), U) == 1
        if !E::multi_pairing(
            [E::G1Prepared::from(self.w), E::G1Prepared::from(-h.into_group())],
            [
                E::G2Prepared::from(E::G2Affine::generator()),
                E::G2Prepared::from(self.u),
            ],
        )
        .is_zero()
        {
            return Err(TEError::InvalidCiphertext);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Length of the plaintext
    pub fn message_len(&self) -> usize {
        self.v.len().saturating_sub(CHECKSUM_SIZE)
    }

    /// Remove the mask derived from `y = U * s` and check the checksum of the recovered message
    pub(crate) fn unmask(&self, y: &E::G2Affine) -> Result<Vec<u8>, TEError> {
        if self.v.len() < CHECKSUM_SIZE {
            return Err(TEError::InvalidCiphertext);
        }
        let mask = derive_mask::<E>(y, &self.u, self.v.len())?;
        let mut payload = self.v.clone();
        xor_in_place(&mut payload, &mask);
        let expected = payload.split_off(self.message_len());
        if checksum(&payload)[..] != expected[..] {
            return Err(TEError::IntegrityCheckFailure);
        }
        Ok(payload)
    }
}

pub(crate) fn hash_to_g1<E: Pairing>(u: &E::G2Affine, v: &[u8]) -> Result<E::G1Affine, TEError> {
    let mut u_bytes = Vec::new();
    u.serialize_compressed(&mut u_bytes)?;
    Ok(affine_group_elem_from_try_and_incr::<E::G1Affine, Sha256>(
        &concat_slices!(HASH_TO_G1_DOMAIN, u_bytes, v),
    ))
}

fn derive_mask<E: Pairing>(
    y: &E::G2Affine,
    u: &E::G2Affine,
    size: usize,
) -> Result<Vec<u8>, TEError> {
    let mut y_bytes = Vec::new();
    y.serialize_compressed(&mut y_bytes)?;
    let mut u_bytes = Vec::new();
    u.serialize_compressed(&mut u_bytes)?;
    expand_to_mask(&y_bytes, MASK_SALT, &u_bytes, size)
        .map_err(|_| TEError::MessageTooLong(size.saturating_sub(CHECKSUM_SIZE)))
}

fn checksum(message: &[u8]) -> [u8; CHECKSUM_SIZE] {
    Sha256::new()
        .chain_update(CHECKSUM_DOMAIN)
        .chain_update(message)
        .finalize()
        .into()
}
