//! Error types for control requests
//!
//! Every variant is a definitive rejection of one request. None of them are
//! fatal to the server: the worst case is a single 500 response.

use http::StatusCode;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ControlError>;

/// Error returned by a control action or by the session walk
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// `srv` does not name a configured server
    #[error("Server index out of range")]
    ServerIndexOutOfRange,

    /// The walk visited no application, so there is nothing to bind a relay to
    #[error("Application not found")]
    ApplicationNotFound,

    /// Method segment is not one the section understands
    #[error("Undefined method")]
    UndefinedMethod,

    /// Method segment of drop/redirect is not a known role filter
    #[error("Undefined filter")]
    UndefinedFilter,

    #[error("Recorder not found")]
    RecorderNotFound,

    #[error("Recorder error: {0}")]
    RecorderError(HostError),

    #[error("newname not specified")]
    NewNameNotSpecified,

    #[error("publish failed: {0}")]
    PublishFailed(HostError),

    #[error("play failed: {0}")]
    PlayFailed(HostError),

    /// Neither `push` nor `pull` was supplied
    #[error("unknown relay type")]
    UnknownRelayType,

    #[error("invalid relay url")]
    InvalidRelayUrl,

    #[error("invalid relay args")]
    InvalidRelayArgs,

    #[error("no relay url")]
    NoRelayUrl,

    #[error("static push is not allowed")]
    StaticPushNotAllowed,

    #[error("stream name missing in static pull declaration")]
    StreamNameMissingForStaticPull,
}

impl ControlError {
    /// HTTP status reported to the caller
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Failure reported by an external collaborator primitive
/// (publish, play, record open/close, relay argument parsing)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The session is no longer known to the host
    #[error("session {0} not found")]
    SessionNotFound(u64),

    /// Target stream already has a publisher
    #[error("stream already publishing: {0}")]
    AlreadyPublishing(String),

    /// Application is not configured on the server
    #[error("application not found: {0}")]
    ApplicationNotFound(String),

    /// Anything else, described by the collaborator
    #[error("{0}")]
    Other(String),
}
