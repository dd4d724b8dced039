//! Bridge connection parameters.
//!
//! The binary is configured entirely through the environment, matching how
//! it gets launched from audio host sessions. Numeric variables fall back to
//! their defaults when unset or unparsable.

use crate::error::{ControlError, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default UDP port of the Hue Entertainment DTLS endpoint.
pub const DEFAULT_BRIDGE_PORT: u16 = 2100;
/// Default DTLS connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Everything needed to activate and stream to one entertainment area.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Bridge network address (IP or hostname).
    pub bridge_address: String,
    /// UDP port of the entertainment streaming endpoint.
    pub port: u16,
    /// REST application key (`hue-application-key` header).
    pub app_key: String,
    /// PSK identity presented during the DTLS handshake.
    pub psk_identity: String,
    /// Hex-encoded PSK key material (the bridge "client key").
    pub psk_key: String,
    /// Entertainment configuration UUID to activate and address.
    pub entertainment_area_id: String,
    /// DTLS connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl BridgeConfig {
    /// Load the configuration from the environment.
    ///
    /// Required: `HUE_BRIDGE_ADDRESS`, `HUE_APPLICATION_KEY`,
    /// `HUE_CLIENT_KEY`, `HUE_ENTERTAINMENT_AREA_ID`.
    /// Optional: `HUE_PSK_IDENTITY` (defaults to the application key, which
    /// is what older bridge firmware expects), `HUE_BRIDGE_PORT`,
    /// `HUE_CONNECT_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        let app_key = require_env("HUE_APPLICATION_KEY")?;
        let psk_identity = env::var("HUE_PSK_IDENTITY").unwrap_or_else(|_| app_key.clone());

        Ok(Self {
            bridge_address: require_env("HUE_BRIDGE_ADDRESS")?,
            port: env_number("HUE_BRIDGE_PORT", DEFAULT_BRIDGE_PORT),
            app_key,
            psk_identity,
            psk_key: require_env("HUE_CLIENT_KEY")?,
            entertainment_area_id: require_env("HUE_ENTERTAINMENT_AREA_ID")?,
            connect_timeout_ms: env_number("HUE_CONNECT_TIMEOUT_MS", DEFAULT_CONNECT_TIMEOUT_MS),
        })
    }

    /// The connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Decode the hex PSK key material into raw bytes.
    pub fn decode_psk(&self) -> Result<Vec<u8>> {
        Ok(hex::decode(&self.psk_key)?)
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("bridge_address", &self.bridge_address)
            .field("port", &self.port)
            .field("app_key", &"***REDACTED***")
            .field("psk_identity", &self.psk_identity)
            .field("psk_key", &"***REDACTED***")
            .field("entertainment_area_id", &self.entertainment_area_id)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| ControlError::Config(format!("{name} is not set")))
}

/// Read a numeric variable, falling back to `default` when the variable is
/// unset or does not parse.
fn env_number<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
