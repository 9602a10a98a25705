use std::time::Duration;

use crate::session::ConnectionState;

/// Handshake-phase failures. Terminal per `Connection::establish` call; the
/// session controller decides whether to try again at a higher level.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("handshake attempt timed out after {0:?}")]
    Timeout(Duration),
    #[error("handshake failed: {0}")]
    Handshake(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("all {attempts} connection attempts failed, last error: {last}")]
    AttemptsExhausted {
        attempts: u32,
        #[source]
        last: Box<ConnectError>,
    },
}

/// Post-handshake stream faults. Non-terminal: reported to the session
/// controller as a lost-connection signal, which owns reconnection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("stream closed by remote: {0:?}")]
    Closed(Option<String>),
    #[error("stream read failed: {0}")]
    Read(String),
    #[error("stream ended unexpectedly")]
    Ended,
    #[error("too many consecutive undecodable frames")]
    CorruptStream,
}

/// Failure reported by the capture collaborator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("capture error: {0}")]
pub struct CaptureError(pub String);

/// Failure reported by the playback collaborator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("playback error: {0}")]
pub struct PlaybackError(pub String);

/// Errors surfaced by the public session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("operation requires a ready session, current state: {state:?}")]
    NotReady { state: ConnectionState },
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error("outbound send failed: {0}")]
    Send(String),
    #[error("invalid tool call: {0}")]
    InvalidToolCall(String),
}
