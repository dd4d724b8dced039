//! Event-processing engine.
//!
//! Bridges the pure mapping pipeline and the streaming session: one inbound
//! sound event becomes one encoded frame handed to the sink. Events are
//! consumed serially from a channel, which is what keeps the smoothing
//! filters consistent; a sink error is logged and the loop moves on.

use crate::error::Result;
use crate::protocol;
use crate::session::StreamingSession;
use huepulse_core::{Pipeline, SoundEvent};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Where encoded frames go. Implemented by [`StreamingSession`]; tests use
/// an in-memory sink.
pub trait FrameSink {
    /// Hand one encoded frame to the transport, without blocking.
    fn submit(&self, frame: Vec<u8>) -> Result<()>;
}

impl FrameSink for StreamingSession {
    fn submit(&self, frame: Vec<u8>) -> Result<()> {
        self.send(frame)
    }
}

/// Consumes sound events and streams the mapped frames to a sink.
pub struct StreamEngine<S: FrameSink> {
    pipeline: Pipeline,
    sink: S,
    area_id: String,
    events: mpsc::Receiver<SoundEvent>,
}

impl<S: FrameSink> StreamEngine<S> {
    /// Create an engine streaming to `sink` for the given entertainment area.
    pub fn new(
        pipeline: Pipeline,
        sink: S,
        area_id: String,
        events: mpsc::Receiver<SoundEvent>,
    ) -> Self {
        Self {
            pipeline,
            sink,
            area_id,
            events,
        }
    }

    /// Process events until the channel closes, then hand the sink back so
    /// the caller can shut it down.
    pub async fn run(mut self) -> S {
        while let Some(event) = self.events.recv().await {
            let target = self.pipeline.process(&event);
            let frame = protocol::encode_frame(&self.area_id, target.xy, target.brightness);
            if let Err(e) = self.sink.submit(frame) {
                warn!("Dropping frame: {e}");
            }
        }
        info!("Event channel closed, stream engine stopping");
        self.sink
    }
}
