use ark_ec::{AffineRepr, CurveGroup};
use ark_std::{vec, vec::Vec, Zero};
use digest::Digest;
use hkdf::{Hkdf, InvalidLength};
use sha2::Sha256;

/// Largest number of bytes HKDF-SHA256 can expand a single key into.
pub const MAX_MASK_BYTE_SIZE: usize = 255 * 32;

/// Hash bytes to a point on the curve. Returns as Projective coordinates. This is vulnerable to timing attack and is only used when input
/// is public anyway like when hashing a ciphertext.
/// The returned point is never the identity and lies in the prime order subgroup.
pub fn projective_group_elem_from_try_and_incr<G: AffineRepr, D: Digest>(bytes: &[u8]) -> G::Group {
    let mut hash = D::digest(bytes);
    let mut j = 1u64;
    loop {
        if let Some(g) = G::from_random_bytes(&hash) {
            let g = g.mul_by_cofactor_to_group();
            if !g.is_zero() {
                return g;
            }
        }
        hash = D::digest(concat_slices!(bytes, b"-attempt-", j.to_le_bytes()));
        j += 1;
    }
}

/// Hash bytes to a point on the curve. Returns as Affine coordinates. This is vulnerable to timing attack and is only used when input
/// is public anyway like when hashing a ciphertext.
pub fn affine_group_elem_from_try_and_incr<G: AffineRepr, D: Digest>(bytes: &[u8]) -> G {
    projective_group_elem_from_try_and_incr::<G, D>(bytes).into_affine()
}

/// Derive `size` pseudorandom bytes from the input key material `ikm` using HKDF with SHA-256.
/// `salt` is for domain separation and `info` binds the output to a context. Fails only when
/// `size` exceeds [`MAX_MASK_BYTE_SIZE`].
pub fn expand_to_mask(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    size: usize,
) -> Result<Vec<u8>, InvalidLength> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; size];
    hk.expand(info, &mut okm)?;
    Ok(okm)
}

/// XOR `mask` into `target`. Only the first `min(target.len(), mask.len())` bytes are touched.
pub fn xor_in_place(target: &mut [u8], mask: &[u8]) {
    target.iter_mut().zip(mask).for_each(|(t, m)| *t ^= m);
}
