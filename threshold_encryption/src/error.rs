use ark_serialize::SerializationError;
use threshold_dkg::{
    common::{ParticipantId, ShareId},
    error::DkgError,
};

#[derive(Debug)]
pub enum TEError {
    Dkg(DkgError),
    Serialization(SerializationError),
    /// The wrapper has no secret polynomial yet
    DkgSecretNotSet,
    /// Number of coefficients expected for the threshold and the number found in the polynomial
    WrongPolynomialDegree {
        expected: usize,
        found: usize,
    },
    InvalidCiphertext,
    InvalidDecryptionShare(ParticipantId),
    /// Signer index of the public key share and of the decryption share differ
    UnequalSignerAndShareId(ParticipantId, ParticipantId),
    InsufficientShares {
        required: ShareId,
        received: ShareId,
    },
    /// Signer index and the total number of participants
    IndexOutOfRange(ParticipantId, ShareId),
    /// The unmasked payload did not match its checksum
    IntegrityCheckFailure,
    AlreadyMerged,
    MessageTooLong(usize),
    UnexpectedNumberOfVerificationVectors {
        min: usize,
        max: usize,
        found: usize,
    },
    InvalidPublicKey,
}

impl From<DkgError> for TEError {
    fn from(e: DkgError) -> Self {
        Self::Dkg(e)
    }
}

impl From<SerializationError> for TEError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
