//! HuePulse - Audio-Reactive Hue Entertainment Streaming
//!
//! Reads newline-delimited JSON sound events from stdin, maps them to
//! chromaticity and brightness targets, and streams the result to a Hue
//! Bridge over a DTLS-PSK session. Configuration comes from the
//! environment; see `BridgeConfig::from_env`.

use anyhow::{Context, Result};
use huepulse_control::{activation, BridgeConfig, StreamEngine, StreamingSession};
use huepulse_core::{FrequencyRange, Pipeline, SoundEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Inbound events buffered ahead of the engine.
const EVENT_QUEUE_DEPTH: usize = 64;

fn init_logging() {
    // Logs go to stderr; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = BridgeConfig::from_env().context("Failed to load bridge configuration")?;
    info!("Loaded configuration: {config:?}");

    // The bridge only accepts the DTLS handshake while streaming mode is
    // active, so the REST call has to come first.
    activation::set_stream_active(&config, true)
        .await
        .context("Failed to activate streaming mode on the bridge")?;

    let session = StreamingSession::connect(&config)
        .await
        .context("Failed to establish the DTLS session")?;

    let (events_tx, events_rx) = mpsc::channel::<SoundEvent>(EVENT_QUEUE_DEPTH);
    let engine = StreamEngine::new(
        Pipeline::new(FrequencyRange::default()),
        session,
        config.entertainment_area_id.clone(),
        events_rx,
    );
    let engine_task = tokio::spawn(engine.run());

    read_events(events_tx).await;

    // Dropping the sender above stops the engine, which hands the session
    // back for an orderly shutdown.
    let session = engine_task.await.context("Stream engine panicked")?;
    session.close().await;

    if let Err(e) = activation::set_stream_active(&config, false).await {
        warn!("Failed to deactivate streaming mode: {e}");
    }

    Ok(())
}

/// Forward stdin NDJSON events into the engine until EOF or Ctrl-C.
///
/// Malformed lines are logged and skipped; the stream keeps going.
async fn read_events(events: mpsc::Sender<SoundEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<SoundEvent>(line) {
                        Ok(event) => {
                            if events.send(event).await.is_err() {
                                // Engine is gone; nothing left to feed.
                                break;
                            }
                        }
                        Err(e) => warn!("Skipping malformed event: {e}"),
                    }
                }
                Ok(None) => {
                    info!("Input stream ended");
                    break;
                }
                Err(e) => {
                    error!("Error reading input: {e}");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }
}
