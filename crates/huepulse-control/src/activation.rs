//! REST activation of the entertainment configuration.
//!
//! The bridge only accepts the DTLS handshake while the entertainment
//! configuration is in "active streaming" state, so this call has to
//! succeed before [`crate::StreamingSession::connect`] is attempted.

use crate::config::BridgeConfig;
use crate::error::{ControlError, Result};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct StreamAction {
    action: &'static str,
}

// Hue bridges present a self-signed certificate on the local network, so
// certificate verification has to be disabled for the CLIP v2 endpoint.
fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(ControlError::Network)
}

/// Start or stop streaming mode for the configured entertainment area.
///
/// Uses the CLIP v2 API with `{"action": "start"}` or `{"action": "stop"}`.
pub async fn set_stream_active(config: &BridgeConfig, active: bool) -> Result<()> {
    let client = build_client()?;

    let url = format!(
        "https://{}/clip/v2/resource/entertainment_configuration/{}",
        config.bridge_address, config.entertainment_area_id
    );

    let action = if active { "start" } else { "stop" };

    let resp = client
        .put(&url)
        .header("hue-application-key", &config.app_key)
        .json(&StreamAction { action })
        .send()
        .await?;

    let status = resp.status();
    let response_text = resp.text().await?;

    if !status.is_success() {
        return Err(ControlError::Api(format!(
            "Failed to {action} stream: HTTP {status} - {response_text}"
        )));
    }

    // The bridge can answer 200 with an error list in the body.
    if response_text.contains("\"error\"") {
        return Err(ControlError::Api(format!(
            "Failed to {action} stream: {response_text}"
        )));
    }

    info!(
        "Entertainment streaming {} for area {}",
        if active { "activated" } else { "deactivated" },
        config.entertainment_area_id
    );

    Ok(())
}
