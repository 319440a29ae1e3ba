//! Error types for the REST dispatch pipeline.
//!
//! Every phase of a call maps to one variant: registry resolution,
//! parameter encoding, token lookup, the network round trip, body
//! streaming, and the service-level success envelope. Errors are `Clone`
//! because a terminal error is stored on the [`RestResult`](crate::RestResult)
//! and surfaced again on every subsequent read.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while dispatching a request or consuming its result.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum ClientError {
    /// Named configuration is not present in the dispatcher registry
    #[error("config not registered: {0}")]
    ConfigNotFound(String),

    /// Operation key is not present in the capability object's table
    #[error("no endpoint for operation: {0}")]
    EndpointNotFound(String),

    /// Request parameters could not be encoded
    #[error("parameter encoding failed: {0}")]
    Serialize(String),

    /// Token lookup on the capability object failed
    #[error("token lookup failed: {0}")]
    Token(String),

    /// Connection, timeout or other network failure before or during the send
    #[error("transport error: {0}")]
    Transport(String),

    /// Failure while reading a live response body after headers were received
    #[error("stream error: {0}")]
    Stream(String),

    /// Well-formed response whose success envelope indicates failure
    #[error("server returned failure [{code}/{state}]: {message}")]
    Service {
        /// Remote result code (`result.code`)
        code: String,
        /// Remote result state (`result.state`)
        state: String,
        /// Remote message (`result.message`, or the raw body when absent)
        message: String,
    },

    /// Unrecoverable fault inside the dispatched unit of work, converted
    /// at the task boundary instead of propagating
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Create a service-level error from the remote envelope fields.
    pub fn service(
        code: impl Into<String>,
        state: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Service {
            code: code.into(),
            state: state.into(),
            message: message.into(),
        }
    }

    /// Returns true if this is a service-level (envelope) failure.
    pub fn is_service_error(&self) -> bool {
        matches!(self, ClientError::Service { .. })
    }

    /// Returns true if the failure happened before any network I/O.
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            ClientError::ConfigNotFound(_)
                | ClientError::EndpointNotFound(_)
                | ClientError::Serialize(_)
                | ClientError::Token(_)
        )
    }

    /// Returns the remote result code for service-level errors.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            ClientError::Service { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialize(err.to_string())
    }
}
