use crate::events::{ClientCommand, ServerEvent};

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to serialize command: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is missing a string `type` discriminator")]
    MissingDiscriminator,
}

/// Serialize an outbound command to its wire form.
pub fn encode(command: &ClientCommand) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(command)?)
}

/// Parse one inbound frame into a server event.
///
/// A frame that is valid JSON and carries a string `type` tag always decodes:
/// unknown or malformed-but-tagged frames come back as
/// `ServerEvent::Unrecognized` so the dispatcher can log them and keep going.
/// Only structurally invalid input is an error.
pub fn decode(text: &str) -> Result<ServerEvent, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let event_type = value
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(DecodeError::MissingDiscriminator)?
        .to_string();

    match serde_json::from_value::<ServerEvent>(value) {
        Ok(event) => Ok(event),
        Err(_) => Ok(ServerEvent::Unrecognized { event_type }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::events::client::InputAudioBufferAppendCommand;
    use crate::session::SessionConfig;

    #[test]
    fn test_encode_append_command() {
        let command = ClientCommand::InputAudioBufferAppend(InputAudioBufferAppendCommand::new(
            "AAAA".to_string(),
        ));
        let text = encode(&command).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "input_audio_buffer.append");
        assert_eq!(value["audio"], "AAAA");
    }

    #[test]
    fn test_encode_session_update() {
        let command = ClientCommand::SessionUpdate(crate::events::client::SessionUpdateCommand::new(
            SessionConfig::default(),
        ));
        let text = encode(&command).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "session.update");
        assert_eq!(value["session"]["input_audio_format"], "pcm16");
    }

    #[test]
    fn test_decode_audio_delta() {
        let event = decode(r#"{"type":"response.audio.delta","delta":"AQID"}"#).unwrap();
        match event {
            ServerEvent::AudioDelta(delta) => assert_eq!(delta.delta(), "AQID"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_tool_calls() {
        let event = decode(
            r#"{"type":"response.tool_calls","calls":[{"call_id":"c1","name":"get_time","arguments":"{}"}]}"#,
        )
        .unwrap();
        match event {
            ServerEvent::ToolCalls(batch) => {
                assert_eq!(batch.calls().len(), 1);
                assert_eq!(batch.calls()[0].call_id(), "c1");
                assert_eq!(batch.calls()[0].name(), "get_time");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_tag_is_not_an_error() {
        let event = decode(r#"{"type":"session.created","session":{}}"#).unwrap();
        match event {
            ServerEvent::Unrecognized { event_type } => assert_eq!(event_type, "session.created"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_known_tag_with_bad_shape_is_unrecognized() {
        let event = decode(r#"{"type":"response.tool_calls","calls":"nope"}"#).unwrap();
        match event {
            ServerEvent::Unrecognized { event_type } => {
                assert_eq!(event_type, "response.tool_calls")
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_decode_invalid_json_fails() {
        assert!(matches!(decode("not json"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_missing_discriminator_fails() {
        assert!(matches!(
            decode(r#"{"delta":"AQID"}"#),
            Err(DecodeError::MissingDiscriminator)
        ));
        assert!(matches!(
            decode(r#"{"type":42}"#),
            Err(DecodeError::MissingDiscriminator)
        ));
    }
}
