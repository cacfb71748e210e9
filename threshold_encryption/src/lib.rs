#![cfg_attr(not(feature = "std"), no_std)]

//! # Threshold encryption
//!
//! Encryption to a public key whose secret key is shared among `n` participants such that any
//! `threshold` of them can decrypt and fewer learn nothing about the plaintext. The keys come from
//! the DKG in [`threshold_dkg`] so no participant ever holds the secret key.
//!
//! - [`dkg_wrapper::DkgTeWrapper`] runs a participant's side of the DKG and derives its private key
//!   share, the public key and the public key shares of all participants.
//! - [`keys::TEPublicKey::encrypt`] creates a [`ciphertext::Ciphertext`].
//! - [`keys::TEPrivateKeyShare::get_decryption_share`] creates a participant's
//!   [`decryption::DecryptionShare`] which anyone can check with the participant's
//!   [`keys::TEPublicKeyShare`].
//! - [`decrypt_set::DecryptSet`] collects the decryption shares for a ciphertext and combines
//!   `threshold` of them into the plaintext using Lagrange interpolation.
//!
//! Ciphertexts and decryption shares are in group G2 while the ciphertext's proof of well-formedness
//! is in group G1 so that both checks are pairing equations.

pub mod ciphertext;
pub mod decrypt_set;
pub mod decryption;
pub mod dkg_wrapper;
pub mod error;
pub mod keys;

pub use ciphertext::Ciphertext;
pub use decrypt_set::{DecryptSet, DecryptSetState};
pub use decryption::DecryptionShare;
pub use dkg_wrapper::DkgTeWrapper;
pub use error::TEError;
pub use keys::{TEPrivateKey, TEPrivateKeyShare, TEPublicKey, TEPublicKeyShare};
