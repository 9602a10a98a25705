use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CaptureError, PlaybackError};

/// Callback handed to the capture collaborator; invoked once per captured
/// PCM16 chunk, in capture order.
pub type ChunkSink = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Microphone-side collaborator. Implementations own device selection and
/// sample capture; this crate only consumes the chunk stream.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    async fn init(&self) -> Result<(), CaptureError>;

    /// Start capturing, delivering chunks to `on_chunk`. Returns `false` when
    /// capture was already running.
    async fn start_capture(&self, on_chunk: ChunkSink) -> Result<bool, CaptureError>;

    /// Stop capturing. Returns `false` when capture was not running.
    async fn stop_capture(&self) -> Result<bool, CaptureError>;
}

/// Speaker-side collaborator. `play_chunk` resolves once the chunk has
/// finished playing; the gateway relies on that to keep at most one chunk in
/// flight.
#[async_trait]
pub trait AudioPlayback: Send + Sync {
    async fn play_chunk(&self, pcm16: &[u8], sample_rate: u32) -> Result<(), PlaybackError>;

    /// Abort any in-flight chunk and discard buffered device-side audio.
    async fn stop_and_flush(&self) -> Result<(), PlaybackError>;
}
