//! Error types for the bridge integration
use crate::session::SessionState;
use thiserror::Error;

/// Bridge integration errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Missing or unusable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The bridge REST API rejected a request
    #[error("Bridge API error: {0}")]
    Api(String),

    /// HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PSK key material is not valid hex
    #[error("Invalid PSK key material: {0}")]
    PskKey(#[from] hex::FromHexError),

    /// DTLS handshake or connection error
    #[error("DTLS error: {0}")]
    Dtls(#[from] webrtc_dtls::Error),

    /// Datagram transport error
    #[error("Transport error: {0}")]
    Transport(#[from] webrtc_util::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The DTLS handshake did not complete in time
    #[error("Connect timed out after {0} ms")]
    ConnectTimeout(u64),

    /// An operation was attempted in the wrong session state
    #[error("Operation invalid in session state {0:?}")]
    InvalidState(SessionState),
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, ControlError>;
