mod connection;
mod error;
mod gateway;
mod media;
mod session;
mod tools;
mod transcript;

pub use voicewire_types as types;
pub use voicewire_utils as utils;

pub use connection::{
    CommandTx, ConnectOptions, ConnectOptionsBuilder, Connection, ConnectionEvent, EventRx,
};
pub use error::{
    CaptureError, ConnectError, PlaybackError, SessionError, TransportError,
};
pub use gateway::AudioGateway;
pub use media::{AudioCapture, AudioPlayback, ChunkSink};
pub use session::{ConnectionState, SessionController, StatusKind, StatusUpdate};
pub use tools::PendingToolCall;
pub use transcript::{Role, TranscriptAssembler, Turn};
