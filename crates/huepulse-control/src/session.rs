//! DTLS-PSK streaming session.
//!
//! Owns the secure datagram connection to the bridge. Frames are handed to
//! [`StreamingSession::send`] fire-and-forget: they travel over a bounded
//! channel to a sender task so the event-processing path never blocks on the
//! transport. UDP semantics apply end to end; a full queue drops the frame
//! and a send failure is logged, not retried.

use crate::config::BridgeConfig;
use crate::error::{ControlError, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, trace};
use webrtc_dtls::cipher_suite::CipherSuiteId;
use webrtc_dtls::config::Config as DtlsConfig;
use webrtc_dtls::conn::DTLSConn;
use webrtc_util::Conn;

/// Frames buffered between the event path and the sender task. Events
/// arriving faster than the transport drains are dropped, by design.
const FRAME_QUEUE_DEPTH: usize = 64;

/// Lifecycle states of the streaming session.
///
/// `Errored` is not terminal: the transport may recover on a later send, in
/// which case the session reports `Connected` again. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// No connection attempt has been made.
    Disconnected = 0,
    /// The DTLS handshake is in progress.
    Connecting = 1,
    /// The session is established and accepting frames.
    Connected = 2,
    /// The transport reported an error; the session is still open.
    Errored = 3,
    /// The session was closed locally or by the bridge.
    Closed = 4,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Disconnected,
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Errored,
            _ => Self::Closed,
        }
    }
}

/// Shared, lock-free session state cell.
#[derive(Debug)]
struct StateCell {
    state: AtomicU8,
}

impl StateCell {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Disconnected as u8),
        }
    }

    fn get(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set(&self, next: SessionState) {
        let previous = SessionState::from_u8(self.state.swap(next as u8, Ordering::SeqCst));
        if previous != next {
            debug!("Session state: {previous:?} -> {next:?}");
        }
    }
}

/// Seam between the sender loop and the DTLS connection, so the loop's error
/// semantics can be tested without a bridge.
trait FrameTransport: Send + Sync + 'static {
    async fn transmit(&self, frame: &[u8]) -> Result<()>;
    async fn shutdown(&self);
}

struct DtlsTransport {
    conn: Arc<DTLSConn>,
}

impl FrameTransport for DtlsTransport {
    async fn transmit(&self, frame: &[u8]) -> Result<()> {
        self.conn.send(frame).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        if let Err(e) = self.conn.close().await {
            debug!("Error closing DTLS connection: {e}");
        }
    }
}

/// The secure streaming session to the bridge. At most one exists per
/// process; every emitted frame goes through it.
pub struct StreamingSession {
    state: Arc<StateCell>,
    frames: mpsc::Sender<Vec<u8>>,
    sender_task: JoinHandle<()>,
}

impl StreamingSession {
    /// Establish the DTLS-PSK session described by `config`.
    ///
    /// Binds an ephemeral UDP socket, connects it to the bridge's
    /// entertainment port and performs the PSK handshake with the
    /// TLS_PSK_WITH_AES_128_GCM_SHA256 cipher under the configured timeout.
    /// The REST activation call must already have succeeded, otherwise the
    /// bridge silently ignores the handshake until it times out.
    pub async fn connect(config: &BridgeConfig) -> Result<Self> {
        let state = Arc::new(StateCell::new());
        state.set(SessionState::Connecting);

        let psk_key = config.decode_psk()?;

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket
            .connect((config.bridge_address.as_str(), config.port))
            .await?;

        let dtls_config = DtlsConfig {
            psk: Some(Arc::new(move |_hint: &[u8]| Ok(psk_key.clone()))),
            psk_identity_hint: Some(config.psk_identity.as_bytes().to_vec()),
            cipher_suites: vec![CipherSuiteId::Tls_Psk_With_Aes_128_Gcm_Sha256],
            ..Default::default()
        };

        let handshake = DTLSConn::new(Arc::new(socket), dtls_config, true, None);
        let conn = match timeout(config.connect_timeout(), handshake).await {
            Ok(Ok(conn)) => Arc::new(conn),
            Ok(Err(e)) => {
                state.set(SessionState::Errored);
                return Err(e.into());
            }
            Err(_) => {
                state.set(SessionState::Errored);
                return Err(ControlError::ConnectTimeout(config.connect_timeout_ms));
            }
        };

        state.set(SessionState::Connected);
        info!(
            "Connected to Hue Bridge at {}:{}",
            config.bridge_address, config.port
        );

        // The bridge rarely talks back; log whatever arrives and treat a
        // receive failure as a remote close.
        let reader_conn = Arc::clone(&conn);
        let reader_state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];
            loop {
                match reader_conn.recv(&mut buf).await {
                    Ok(len) => debug!("Received {len} bytes from bridge"),
                    Err(e) => {
                        if reader_state.get() != SessionState::Closed {
                            debug!("Bridge connection read ended: {e}");
                            reader_state.set(SessionState::Closed);
                        }
                        break;
                    }
                }
            }
        });

        let (tx, rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let transport = DtlsTransport { conn };
        let sender_task = tokio::spawn(run_sender_loop(transport, rx, Arc::clone(&state)));

        Ok(Self {
            state,
            frames: tx,
            sender_task,
        })
    }

    /// Queue one frame for transmission. Fire-and-forget: the call never
    /// blocks, a full queue drops the frame, and transmission failures are
    /// reported by the sender task, not here.
    ///
    /// Sending is accepted in `Connected` and `Errored` (a send is how the
    /// session discovers the transport recovered) and rejected otherwise.
    pub fn send(&self, frame: Vec<u8>) -> Result<()> {
        match self.state.get() {
            SessionState::Connected | SessionState::Errored => {
                match self.frames.try_send(frame) {
                    Ok(()) => Ok(()),
                    Err(TrySendError::Full(_)) => {
                        trace!("Frame queue full, dropping frame");
                        Ok(())
                    }
                    Err(TrySendError::Closed(_)) => {
                        Err(ControlError::InvalidState(SessionState::Closed))
                    }
                }
            }
            other => Err(ControlError::InvalidState(other)),
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Close the session. Pending frames are flushed by the sender task,
    /// the DTLS connection is shut down and the state becomes `Closed`.
    pub async fn close(self) {
        drop(self.frames);
        if let Err(e) = self.sender_task.await {
            debug!("Sender task ended abnormally: {e}");
        }
        info!("Streaming session closed");
    }
}

/// Drains queued frames into the transport until the channel closes.
///
/// A failed send marks the session `Errored` but keeps draining; a later
/// successful send marks it `Connected` again. When the channel closes the
/// transport is shut down and the session becomes `Closed`.
async fn run_sender_loop<T: FrameTransport>(
    transport: T,
    mut frames: mpsc::Receiver<Vec<u8>>,
    state: Arc<StateCell>,
) {
    while let Some(frame) = frames.recv().await {
        match transport.transmit(&frame).await {
            Ok(()) => {
                trace!(len = frame.len(), "Sent stream frame");
                if state.get() == SessionState::Errored {
                    state.set(SessionState::Connected);
                }
            }
            Err(e) => {
                error!("Error sending stream frame: {e}");
                if state.get() == SessionState::Connected {
                    state.set(SessionState::Errored);
                }
            }
        }
    }
    transport.shutdown().await;
    state.set(SessionState::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_state_round_trip() {
        for state in [
            SessionState::Disconnected,
            SessionState::Connecting,
            SessionState::Connected,
            SessionState::Errored,
            SessionState::Closed,
        ] {
            assert_eq!(SessionState::from_u8(state as u8), state);
        }
    }

    #[test]
    fn test_state_cell_transitions() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), SessionState::Disconnected);
        cell.set(SessionState::Connecting);
        cell.set(SessionState::Connected);
        assert_eq!(cell.get(), SessionState::Connected);
    }

    /// Transport that records frames and fails on request.
    struct MockTransport {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        failures_left: Arc<Mutex<u32>>,
    }

    impl FrameTransport for MockTransport {
        async fn transmit(&self, frame: &[u8]) -> Result<()> {
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(ControlError::Api("simulated send failure".to_string()));
            }
            self.sent.lock().unwrap().push(frame.to_vec());
            Ok(())
        }

        async fn shutdown(&self) {}
    }

    #[tokio::test]
    async fn test_sender_loop_delivers_frames_and_closes() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = MockTransport {
            sent: Arc::clone(&sent),
            failures_left: Arc::new(Mutex::new(0)),
        };
        let state = Arc::new(StateCell::new());
        state.set(SessionState::Connected);

        let (tx, rx) = mpsc::channel(8);
        tx.send(vec![1, 2, 3]).await.unwrap();
        tx.send(vec![4, 5]).await.unwrap();
        drop(tx);

        run_sender_loop(transport, rx, Arc::clone(&state)).await;

        assert_eq!(*sent.lock().unwrap(), vec![vec![1, 2, 3], vec![4, 5]]);
        assert_eq!(state.get(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_send_error_is_nonterminal() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = MockTransport {
            sent: Arc::clone(&sent),
            failures_left: Arc::new(Mutex::new(1)),
        };
        let state = Arc::new(StateCell::new());
        state.set(SessionState::Connected);

        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(run_sender_loop(transport, rx, Arc::clone(&state)));

        // First frame fails, second succeeds and recovers the state.
        tx.send(vec![1]).await.unwrap();
        tx.send(vec![2]).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(*sent.lock().unwrap(), vec![vec![2]]);
        assert_eq!(state.get(), SessionState::Closed);
    }

    fn session_with_capacity(capacity: usize) -> (StreamingSession, mpsc::Receiver<Vec<u8>>) {
        let state = Arc::new(StateCell::new());
        state.set(SessionState::Connected);
        let (tx, rx) = mpsc::channel(capacity);
        let session = StreamingSession {
            state,
            frames: tx,
            sender_task: tokio::spawn(async {}),
        };
        (session, rx)
    }

    #[tokio::test]
    async fn test_full_queue_drops_frame_without_error() {
        let (session, _rx) = session_with_capacity(1);

        session.send(vec![1]).unwrap();
        // Queue full: the frame is dropped, not an error and not a block.
        session.send(vec![2]).unwrap();
    }

    #[tokio::test]
    async fn test_send_rejected_after_close() {
        let (session, rx) = session_with_capacity(1);
        drop(rx);
        session.state.set(SessionState::Closed);

        assert!(matches!(
            session.send(vec![1]),
            Err(ControlError::InvalidState(SessionState::Closed))
        ));
    }
}
