use crate::audio::Base64EncodedAudioBytes;

/// `response.audio.delta` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AudioDeltaEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The response this delta belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    response_id: Option<String>,

    /// Base64-encoded PCM16 audio
    delta: Base64EncodedAudioBytes,
}

impl AudioDeltaEvent {
    pub fn new(delta: Base64EncodedAudioBytes) -> Self {
        Self {
            event_id: None,
            response_id: None,
            delta,
        }
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn delta(&self) -> &Base64EncodedAudioBytes {
        &self.delta
    }
}

/// `response.audio.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AudioDoneEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_id: Option<String>,
}

impl AudioDoneEvent {
    pub fn new() -> Self {
        Self {
            event_id: None,
            response_id: None,
        }
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }
}

impl Default for AudioDoneEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// `response.text.delta` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TextDeltaEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The text fragment to append
    delta: String,
}

impl TextDeltaEvent {
    pub fn new(delta: &str) -> Self {
        Self {
            event_id: None,
            delta: delta.to_string(),
        }
    }

    pub fn delta(&self) -> &str {
        &self.delta
    }
}

/// `response.text.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TextDoneEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The complete text of the finished segment
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl TextDoneEvent {
    pub fn new() -> Self {
        Self {
            event_id: None,
            text: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Default for TextDoneEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// `conversation.item.input_audio_transcription.completed` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TranscriptCompletedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The user message item the transcript belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,

    /// The completed transcript of the user's speech
    transcript: String,
}

impl TranscriptCompletedEvent {
    pub fn new(transcript: &str) -> Self {
        Self {
            event_id: None,
            item_id: None,
            transcript: transcript.to_string(),
        }
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

/// `input_audio_buffer.speech_started` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SpeechStartedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// Milliseconds since the session started when speech was detected
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_start_ms: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,
}

impl SpeechStartedEvent {
    pub fn new() -> Self {
        Self {
            event_id: None,
            audio_start_ms: None,
            item_id: None,
        }
    }

    pub fn audio_start_ms(&self) -> Option<i32> {
        self.audio_start_ms
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }
}

impl Default for SpeechStartedEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// `input_audio_buffer.speech_stopped` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SpeechStoppedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// Milliseconds since the session started when speech stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_end_ms: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,
}

impl SpeechStoppedEvent {
    pub fn new() -> Self {
        Self {
            event_id: None,
            audio_end_ms: None,
            item_id: None,
        }
    }

    pub fn audio_end_ms(&self) -> Option<i32> {
        self.audio_end_ms
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }
}

impl Default for SpeechStoppedEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// `response.output_item.added` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TurnItemStartedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,

    /// The role the item is attributed to, "user" or "assistant"
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

impl TurnItemStartedEvent {
    pub fn new() -> Self {
        Self {
            event_id: None,
            item_id: None,
            role: None,
        }
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

impl Default for TurnItemStartedEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// `response.output_item.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TurnItemFinishedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

impl TurnItemFinishedEvent {
    pub fn new() -> Self {
        Self {
            event_id: None,
            item_id: None,
            role: None,
        }
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

impl Default for TurnItemFinishedEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// `response.done` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResponseDoneEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    response_id: Option<String>,

    /// Terminal status of the response: "completed", "cancelled", "failed"
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
}

impl ResponseDoneEvent {
    pub fn new() -> Self {
        Self {
            event_id: None,
            response_id: None,
            status: None,
        }
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl Default for ResponseDoneEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// `response.tool_calls` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCallsEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// The batch of function calls requested by the model
    calls: Vec<ToolInvocation>,
}

impl ToolCallsEvent {
    pub fn new(calls: Vec<ToolInvocation>) -> Self {
        Self {
            event_id: None,
            calls,
        }
    }

    pub fn calls(&self) -> &[ToolInvocation] {
        &self.calls
    }
}

/// One function call requested by the model.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolInvocation {
    /// Correlation ID to echo back in `tool_result`
    call_id: String,

    /// The name of the function to execute
    name: String,

    /// The raw argument payload, opaque to the client (typically JSON)
    arguments: String,
}

impl ToolInvocation {
    pub fn new(call_id: &str, name: &str, arguments: &str) -> Self {
        Self {
            call_id: call_id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }
}

/// `rate_limits.updated` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RateLimitsUpdatedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    rate_limits: Vec<RateLimit>,
}

impl RateLimitsUpdatedEvent {
    pub fn new(rate_limits: Vec<RateLimit>) -> Self {
        Self {
            event_id: None,
            rate_limits,
        }
    }

    pub fn rate_limits(&self) -> &[RateLimit] {
        &self.rate_limits
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RateLimit {
    /// The limited resource, e.g. "requests" or "tokens"
    name: String,
    limit: i64,
    remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_seconds: Option<f64>,
}

impl RateLimit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn reset_seconds(&self) -> Option<f64> {
        self.reset_seconds
    }
}

/// `error` event
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// Details about the error
    error: ErrorDetails,
}

impl ErrorEvent {
    pub fn new(error: ErrorDetails) -> Self {
        Self {
            event_id: None,
            error,
        }
    }

    pub fn error(&self) -> &ErrorDetails {
        &self.error
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetails {
    #[serde(rename = "type")]
    error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<String>,
}

impl ErrorDetails {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error_type: error_type.to_string(),
            code: None,
            message: message.to_string(),
            param: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }

    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }
}
