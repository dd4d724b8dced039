//! HuePulse Control - Hue Bridge Integration
//!
//! Everything that talks to the bridge lives here:
//! - [`protocol`] - the HueStream binary frame encoder
//! - [`session`] - the DTLS-PSK streaming session over UDP
//! - [`activation`] - the REST call that switches the entertainment
//!   configuration into streaming mode
//! - [`config`] - bridge connection parameters from the environment
//! - [`engine`] - the event loop wiring the mapping pipeline to the session
//! - [`error`] - error types
//!
//! The signal mapping itself is pure and lives in `huepulse-core`.

#![warn(missing_docs)]

/// REST activation of the entertainment configuration
pub mod activation;
/// Bridge connection parameters
pub mod config;
/// Event-processing engine
pub mod engine;
/// Error types
pub mod error;
/// HueStream frame encoding
pub mod protocol;
/// DTLS streaming session
pub mod session;

pub use config::BridgeConfig;
pub use engine::{FrameSink, StreamEngine};
pub use error::{ControlError, Result};
pub use session::{SessionState, StreamingSession};
