use crate::audio::{AudioFormat, InputTranscription, TurnDetection, Voice};
use crate::tools::Tool;

/// The full session configuration sent as one `session.update` command when a
/// session is (re)configured. Treated as an immutable snapshot by the sender;
/// build a new value to change settings between sessions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    /// The default system instructions prepended to model calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,

    /// The voice the model uses to respond.
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<Voice>,

    /// The format of input audio. This client only carries "pcm16".
    input_audio_format: AudioFormat,

    /// The format of output audio. This client only carries "pcm16".
    output_audio_format: AudioFormat,

    /// Configuration for input audio transcription. Unset turns it off.
    #[serde(skip_serializing_if = "Option::is_none")]
    input_audio_transcription: Option<InputTranscription>,

    /// Configuration for turn detection. Unset turns it off.
    #[serde(skip_serializing_if = "Option::is_none")]
    turn_detection: Option<TurnDetection>,

    /// Tools (functions) available to the model, in advertisement order.
    tools: Vec<Tool>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instructions: None,
            voice: None,
            input_audio_format: AudioFormat::Pcm16,
            output_audio_format: AudioFormat::Pcm16,
            input_audio_transcription: None,
            turn_detection: Some(TurnDetection::default()),
            tools: vec![],
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn voice(&self) -> Option<&Voice> {
        self.voice.as_ref()
    }

    pub fn input_audio_format(&self) -> &AudioFormat {
        &self.input_audio_format
    }

    pub fn output_audio_format(&self) -> &AudioFormat {
        &self.output_audio_format
    }

    pub fn input_audio_transcription(&self) -> Option<&InputTranscription> {
        self.input_audio_transcription.as_ref()
    }

    pub fn turn_detection(&self) -> Option<&TurnDetection> {
        self.turn_detection.as_ref()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }
}

pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.config.instructions = Some(instructions.to_string());
        self
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.config.voice = Some(voice);
        self
    }

    pub fn with_input_audio_transcription(mut self, transcription: InputTranscription) -> Self {
        self.config.input_audio_transcription = Some(transcription);
        self
    }

    pub fn with_input_audio_transcription_disable(mut self) -> Self {
        self.config.input_audio_transcription = None;
        self
    }

    pub fn with_turn_detection(mut self, turn_detection: TurnDetection) -> Self {
        self.config.turn_detection = Some(turn_detection);
        self
    }

    pub fn with_turn_detection_disable(mut self) -> Self {
        self.config.turn_detection = None;
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.config.tools.push(tool);
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}
