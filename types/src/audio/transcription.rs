use crate::audio::consts::TranscriptionModel;

/// Input-audio transcription settings sent as part of `session.update`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputTranscription {
    /// The model to use for transcription, e.g. "whisper-1"
    model: TranscriptionModel,
}

impl Default for InputTranscription {
    fn default() -> Self {
        Self {
            model: TranscriptionModel::Whisper,
        }
    }
}

impl InputTranscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: TranscriptionModel) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &TranscriptionModel {
        &self.model
    }
}
