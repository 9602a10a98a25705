/// Turn-detection negotiation. "None" is expressed by leaving the session's
/// `turn_detection` unset, see `SessionConfigBuilder::with_turn_detection_disable`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    #[serde(rename = "server_vad")]
    ServerVad(ServerVadTurnDetection),
    #[serde(rename = "semantic_vad")]
    SemanticVad(SemanticVadTurnDetection),
}

/// Energy-based voice activity detection performed by the server.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServerVadTurnDetection {
    /// Activation threshold for VAD (0.0 to 1.0).
    threshold: f32,

    /// Amount of audio to include before speech starts, in milliseconds
    prefix_padding_ms: i32,

    /// Duration of silence to detect speech stop, in milliseconds
    silence_duration_ms: i32,

    /// Whether the server responds automatically when a turn ends
    create_response: bool,

    /// Whether detected speech interrupts an in-flight response
    interrupt_response: bool,
}

impl Default for TurnDetection {
    fn default() -> Self {
        Self::ServerVad(ServerVadTurnDetection::default())
    }
}

impl Default for ServerVadTurnDetection {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 200,
            create_response: true,
            interrupt_response: true,
        }
    }
}

impl ServerVadTurnDetection {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_prefix_padding_ms(mut self, prefix_padding_ms: i32) -> Self {
        self.prefix_padding_ms = prefix_padding_ms;
        self
    }

    pub fn with_silence_duration_ms(mut self, silence_duration_ms: i32) -> Self {
        self.silence_duration_ms = silence_duration_ms;
        self
    }

    pub fn with_create_response(mut self, create_response: bool) -> Self {
        self.create_response = create_response;
        self
    }

    pub fn with_interrupt_response(mut self, interrupt_response: bool) -> Self {
        self.interrupt_response = interrupt_response;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn prefix_padding_ms(&self) -> i32 {
        self.prefix_padding_ms
    }

    pub fn silence_duration_ms(&self) -> i32 {
        self.silence_duration_ms
    }

    pub fn create_response(&self) -> bool {
        self.create_response
    }

    pub fn interrupt_response(&self) -> bool {
        self.interrupt_response
    }
}

/// Semantic end-of-utterance detection performed by the server.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SemanticVadTurnDetection {
    /// How eagerly the model ends a turn
    eagerness: VadEagerness,

    /// Whether the server responds automatically when a turn ends
    create_response: bool,

    /// Whether detected speech interrupts an in-flight response
    interrupt_response: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VadEagerness {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "high")]
    High,
}

impl Default for SemanticVadTurnDetection {
    fn default() -> Self {
        Self {
            eagerness: VadEagerness::Auto,
            create_response: true,
            interrupt_response: true,
        }
    }
}

impl SemanticVadTurnDetection {
    pub fn with_eagerness(mut self, eagerness: VadEagerness) -> Self {
        self.eagerness = eagerness;
        self
    }

    pub fn with_create_response(mut self, create_response: bool) -> Self {
        self.create_response = create_response;
        self
    }

    pub fn with_interrupt_response(mut self, interrupt_response: bool) -> Self {
        self.interrupt_response = interrupt_response;
        self
    }

    pub fn eagerness(&self) -> &VadEagerness {
        &self.eagerness
    }

    pub fn create_response(&self) -> bool {
        self.create_response
    }

    pub fn interrupt_response(&self) -> bool {
        self.interrupt_response
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_server_vad_wire_shape() {
        let td = TurnDetection::ServerVad(ServerVadTurnDetection::default().with_threshold(0.25));
        let json = serde_json::to_value(&td).unwrap();
        assert_eq!(json["type"], "server_vad");
        assert_eq!(json["threshold"], 0.25);
        assert_eq!(json["prefix_padding_ms"], 300);
    }

    #[test]
    fn test_semantic_vad_wire_shape() {
        let td = TurnDetection::SemanticVad(
            SemanticVadTurnDetection::default().with_eagerness(VadEagerness::High),
        );
        let json = serde_json::to_value(&td).unwrap();
        assert_eq!(json["type"], "semantic_vad");
        assert_eq!(json["eagerness"], "high");
    }
}
