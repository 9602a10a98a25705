use crate::audio::Base64EncodedAudioBytes;
use crate::session::SessionConfig;

/// `session.update` command
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionUpdateCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The session configuration snapshot to apply
    session: SessionConfig,
}

impl SessionUpdateCommand {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            event_id: None,
            session,
        }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }
}

/// `input_audio_buffer.append` command
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InputAudioBufferAppendCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The audio data to append to the input buffer
    audio: Base64EncodedAudioBytes,
}

impl InputAudioBufferAppendCommand {
    pub fn new(audio: Base64EncodedAudioBytes) -> Self {
        Self {
            event_id: None,
            audio,
        }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn audio(&self) -> &Base64EncodedAudioBytes {
        &self.audio
    }
}

/// `response.cancel` command
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseCancelCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
}

impl Default for ResponseCancelCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCancelCommand {
    pub fn new() -> Self {
        Self { event_id: None }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }
}

/// `tool_result` command
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolResultCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The ID of the tool call this result answers
    tool_call_id: String,

    /// The result payload, opaque to the client (typically JSON)
    result: String,
}

impl ToolResultCommand {
    pub fn new(tool_call_id: &str, result: &str) -> Self {
        Self {
            event_id: None,
            tool_call_id: tool_call_id.to_string(),
            result: result.to_string(),
        }
    }

    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = Some(event_id.to_string());
        self
    }

    pub fn tool_call_id(&self) -> &str {
        &self.tool_call_id
    }

    pub fn result(&self) -> &str {
        &self.result
    }
}
