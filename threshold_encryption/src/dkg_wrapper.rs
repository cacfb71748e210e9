//! Binds the DKG to the threshold encryption keys. Each participant creates a `DkgTeWrapper`, deals
//! shares of its secret polynomial to the others and turns the verified shares it receives into
//! its private key share. The public key and every participant's public key share only need the
//! published verification vectors.

use ark_ec::{pairing::Pairing, AffineRepr};
use ark_poly::univariate::DensePolynomial;
use ark_std::{cfg_into_iter, rand::RngCore, vec::Vec};
use threshold_dkg::{
    common::{ParticipantId, Share, ShareId, Shares, ThresholdConfig, VerificationVector},
    dkg::Dkg,
    polynomial::threshold_of,
};
use zeroize::Zeroize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    error::TEError,
    keys::{TEPrivateKeyShare, TEPublicKey, TEPublicKeyShare},
};

/// A participant's DKG state. Verification vectors are in G2, committed with its fixed generator.
pub struct DkgTeWrapper<E: Pairing> {
    dkg: Dkg<E::G2Affine>,
    secret: Option<DensePolynomial<E::ScalarField>>,
}

impl<E: Pairing> Drop for DkgTeWrapper<E> {
    fn drop(&mut self) {
        if let Some(poly) = self.secret.as_mut() {
            poly.coeffs.zeroize();
        }
    }
}

impl<E: Pairing> DkgTeWrapper<E> {
    pub fn new(threshold: ShareId, total: ShareId) -> Result<Self, TEError> {
        Ok(Self {
            dkg: dkg_for::<E>(threshold, total)?,
            secret: None,
        })
    }

    pub fn threshold(&self) -> ShareId {
        self.dkg.threshold()
    }

    pub fn total(&self) -> ShareId {
        self.dkg.total()
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Generate a fresh secret polynomial, replacing any existing one
    pub fn generate_dkg_secret<R: RngCore>(&mut self, rng: &mut R) -> Result<(), TEError> {
        let poly = self.dkg.generate_polynomial(rng)?;
        self.replace_secret(poly);
        Ok(())
    }

    /// Use the given polynomial as the secret. It must have exactly `threshold` coefficients.
    pub fn set_dkg_secret(&mut self, poly: DensePolynomial<E::ScalarField>) -> Result<(), TEError> {
        let found = threshold_of(&poly);
        if found != self.threshold() as usize {
            return Err(TEError::WrongPolynomialDegree {
                expected: self.threshold() as usize,
                found,
            });
        }
        self.replace_secret(poly);
        Ok(())
    }

    /// Shares of the secret for all participants, share of participant `i` at index `i - 1`
    pub fn create_dkg_secret_shares(&self) -> Result<Shares<E::ScalarField>, TEError> {
        Ok(self.dkg.secret_key_contribution(self.secret()?)?)
    }

    /// Verification vector of the secret, to be published
    pub fn create_dkg_public_shares(&self) -> Result<VerificationVector<E::G2Affine>, TEError> {
        Ok(self.dkg.verification_vector(self.secret()?)?)
    }

    /// Verify a share received from another participant against that participant's verification vector
    pub fn verify_dkg_share(
        &self,
        share: &Share<E::ScalarField>,
        sender_vv: &VerificationVector<E::G2Affine>,
    ) -> Result<(), TEError> {
        Ok(self.dkg.verify_share(share, sender_vv)?)
    }

    /// Sum the verified shares received by participant `own_index`, including its own, into its
    /// private key share. Each share must come from a different sender, `ContributionAccumulator`
    /// keys them by sender.
    pub fn create_te_private_key_share<'a>(
        &self,
        own_index: ParticipantId,
        received: impl IntoIterator<Item = &'a Share<E::ScalarField>>,
    ) -> Result<TEPrivateKeyShare<E>, TEError> {
        let share = self.dkg.secret_key_share_create(own_index, received)?;
        TEPrivateKeyShare::new(own_index, share.share, self.threshold(), self.total())
    }

    /// The public key from the verification vectors of all qualified participants, one per participant.
    /// Doesn't need any secret. Fails with `DuplicateVerificationVector` if a vector is repeated.
    pub fn create_te_public_key(
        all_vvs: &[VerificationVector<E::G2Affine>],
        threshold: ShareId,
        total: ShareId,
    ) -> Result<TEPublicKey<E>, TEError> {
        let dkg = dkg_for::<E>(threshold, total)?;
        check_vv_count(all_vvs, threshold, total)?;
        let pk = TEPublicKey(dkg.public_key_from_verification_vectors(all_vvs)?);
        if !pk.is_valid() {
            return Err(TEError::InvalidPublicKey);
        }
        Ok(pk)
    }

    /// Public key shares of all participants from the verification vectors of all qualified
    /// participants. Share of participant `i` at index `i - 1`.
    pub fn create_te_public_key_shares(
        all_vvs: &[VerificationVector<E::G2Affine>],
        threshold: ShareId,
        total: ShareId,
    ) -> Result<Vec<TEPublicKeyShare<E>>, TEError> {
        let dkg = dkg_for::<E>(threshold, total)?;
        check_vv_count(all_vvs, threshold, total)?;
        cfg_into_iter!(1..=total)
            .map(|i| -> Result<TEPublicKeyShare<E>, TEError> {
                Ok(TEPublicKeyShare {
                    signer_index: i,
                    public_key_share: dkg.public_share_from_verification_vectors(i, all_vvs)?,
                    threshold,
                    total,
                })
            })
            .collect()
    }

    fn secret(&self) -> Result<&DensePolynomial<E::ScalarField>, TEError> {
        self.secret.as_ref().ok_or(TEError::DkgSecretNotSet)
    }

    fn replace_secret(&mut self, poly: DensePolynomial<E::ScalarField>) {
        if let Some(mut old) = self.secret.replace(poly) {
            old.coeffs.zeroize();
        }
    }
}

fn dkg_for<E: Pairing>(threshold: ShareId, total: ShareId) -> Result<Dkg<E::G2Affine>, TEError> {
    Ok(Dkg::new(
        ThresholdConfig::new(threshold, total)?,
        E::G2Affine::generator(),
    ))
}

fn check_vv_count<G: AffineRepr>(
    vvs: &[VerificationVector<G>],
    threshold: ShareId,
    total: ShareId,
) -> Result<(), TEError> {
    if vvs.len() < threshold as usize || vvs.len() > total as usize {
        return Err(TEError::UnexpectedNumberOfVerificationVectors {
            min: threshold as usize,
            max: total as usize,
            found: vvs.len(),
        });
    }
    Ok(())
}
