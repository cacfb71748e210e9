use crate::common::{ParticipantId, ShareId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DkgError {
    InvalidThresholdOrTotal(ShareId, ShareId),
    BelowThreshold(ShareId, ShareId),
    InvalidShare(ShareId),
    InvalidParticipantId(ParticipantId),
    DuplicateParticipantId(ParticipantId),
    AlreadyProcessedFromSender(ParticipantId),
    SenderIdSameAsReceiver(ParticipantId, ParticipantId),
    UnequalThresholdInReceivedShare(ShareId, ShareId),
    UnequalParticipantAndShareId(ParticipantId, ShareId),
    DoesNotSupportThreshold(ShareId),
    /// The same share was given twice for the participant
    DuplicateShare(ParticipantId),
    /// Index of a verification vector that repeats an earlier one
    DuplicateVerificationVector(usize),
}
