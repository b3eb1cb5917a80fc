use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("sequence field lengths disagree: {actions} actions, {ids} ids, {calls} calldata")]
    LengthMismatch {
        actions: usize,
        ids: usize,
        calls: usize,
    },

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signature recovery failed: {0}")]
    Recovery(String),

    #[error("unknown action type: {0}")]
    UnknownActionType(u8),

    #[error("unknown refund recipient: {0}")]
    UnknownRefundRecipient(u8),
}

pub type Result<T> = std::result::Result<T, TypesError>;
