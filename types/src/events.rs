pub mod client;
pub mod server;

use client::*;
use server::*;

/// Outbound command envelope, one wire type per variant.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    #[serde(rename = "session.update")]
    SessionUpdate(SessionUpdateCommand),
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend(InputAudioBufferAppendCommand),
    #[serde(rename = "response.cancel")]
    ResponseCancel(ResponseCancelCommand),
    #[serde(rename = "tool_result")]
    ToolResult(ToolResultCommand),
}

/// Inbound event envelope. `Unrecognized` is produced by the codec for frames
/// whose `type` tag has no matching variant; it never crosses the wire itself.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "response.audio.delta")]
    AudioDelta(AudioDeltaEvent),
    #[serde(rename = "response.audio.done")]
    AudioDone(AudioDoneEvent),
    #[serde(rename = "response.text.delta")]
    TextDelta(TextDeltaEvent),
    #[serde(rename = "response.text.done")]
    TextDone(TextDoneEvent),
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    TranscriptCompleted(TranscriptCompletedEvent),
    #[serde(rename = "input_audio_buffer.speech_started")]
    SpeechStarted(SpeechStartedEvent),
    #[serde(rename = "input_audio_buffer.speech_stopped")]
    SpeechStopped(SpeechStoppedEvent),
    #[serde(rename = "response.output_item.added")]
    TurnItemStarted(TurnItemStartedEvent),
    #[serde(rename = "response.output_item.done")]
    TurnItemFinished(TurnItemFinishedEvent),
    #[serde(rename = "response.done")]
    ResponseDone(ResponseDoneEvent),
    #[serde(rename = "response.tool_calls")]
    ToolCalls(ToolCallsEvent),
    #[serde(rename = "rate_limits.updated")]
    RateLimitsUpdated(RateLimitsUpdatedEvent),
    #[serde(rename = "error")]
    Error(ErrorEvent),
    #[serde(skip)]
    Unrecognized { event_type: String },
}
