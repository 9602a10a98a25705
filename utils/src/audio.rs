use base64::Engine;

/// Sample rate of the PCM16 audio carried on the wire, both directions.
pub const WIRE_PCM16_SAMPLE_RATE: u32 = 24_000;

/// Base64-encode raw PCM16 bytes for an `input_audio_buffer.append` command.
pub fn encode(pcm16: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(pcm16)
}

/// Decode one base64 audio fragment back into raw PCM16 bytes.
pub fn decode(fragment: &str) -> Vec<u8> {
    match base64::engine::general_purpose::STANDARD.decode(fragment) {
        Ok(pcm16) => pcm16,
        Err(e) => {
            tracing::error!("failed to decode base64 audio fragment: {}", e);
            Vec::new()
        }
    }
}

/// Convert raw PCM16 little-endian bytes to f32 samples in [-1.0, 1.0].
pub fn pcm16_to_samples(pcm16: &[u8]) -> Vec<f32> {
    pcm16
        .chunks_exact(2)
        .map(|chunk| {
            let v = i16::from_le_bytes([chunk[0], chunk[1]]);
            (v as f32 / i16::MAX as f32).clamp(-1.0, 1.0)
        })
        .collect()
}

/// Convert f32 samples back to PCM16 little-endian bytes.
pub fn samples_to_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&sample| ((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes())
        .collect()
}

/// Split samples into fixed-size chunks, zero-padding the tail.
pub fn split_for_chunks(samples: &[f32], chunk_size: usize) -> Vec<Vec<f32>> {
    samples
        .chunks(chunk_size)
        .map(|chunk| {
            let mut chunk = chunk.to_vec();
            chunk.resize(chunk_size, 0.0);
            chunk
        })
        .collect()
}
