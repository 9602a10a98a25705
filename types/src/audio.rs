mod consts;
mod transcription;
mod turn_detection;

pub use consts::{AudioFormat, TranscriptionModel, Voice};
pub use transcription::InputTranscription;
pub use turn_detection::{SemanticVadTurnDetection, ServerVadTurnDetection, TurnDetection, VadEagerness};

/// Audio data encoded as base64
pub type Base64EncodedAudioBytes = String;
