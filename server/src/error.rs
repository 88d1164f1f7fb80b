use livepoll_protocol::DecodeError;
use thiserror::Error;

/// Client-input failures. All of them are reported to the offending
/// connection only and never change poll state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Invalid name")]
    InvalidName,
    #[error("Invalid option")]
    InvalidOption,
    #[error("Invalid message format")]
    MalformedMessage,
    #[error("Unknown message type")]
    UnknownMessageKind(String),
}

impl From<DecodeError> for PollError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Malformed => PollError::MalformedMessage,
            DecodeError::UnknownKind(kind) => PollError::UnknownMessageKind(kind),
            DecodeError::InvalidOption => PollError::InvalidOption,
        }
    }
}
