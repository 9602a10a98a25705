use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use voicewire_types::events::client::InputAudioBufferAppendCommand;
use voicewire_types::events::ClientCommand;
use voicewire_utils::audio as wire_audio;

use crate::connection::CommandTx;
use crate::media::AudioPlayback;

struct QueueState {
    queue: VecDeque<Vec<u8>>,
    in_flight: bool,
    /// Bumped on every interrupt; the pump compares it after each playback
    /// await so a chunk dequeued before the interrupt cannot chain into the
    /// next one from the same burst.
    generation: u64,
}

/// Owns the two audio flows: captured chunks out to the wire, synthesized
/// chunks in to the playback collaborator. The two paths never block each
/// other; the playback queue is the only shared state and lives under one
/// lock together with the in-flight flag.
pub struct AudioGateway {
    playback: Arc<dyn AudioPlayback>,
    outbound: Mutex<Option<CommandTx>>,
    state: Arc<Mutex<QueueState>>,
    wakeup: Arc<tokio::sync::Notify>,
    /// Spawned with the first inbound chunk, which keeps construction free of
    /// any runtime requirement.
    pump: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl AudioGateway {
    pub fn new(playback: Arc<dyn AudioPlayback>) -> Self {
        Self {
            playback,
            outbound: Mutex::new(None),
            state: Arc::new(Mutex::new(QueueState {
                queue: VecDeque::new(),
                in_flight: false,
                generation: 0,
            })),
            wakeup: Arc::new(tokio::sync::Notify::new()),
            pump: Mutex::new(None),
        }
    }

    fn ensure_pump(&self) {
        if let Ok(mut pump) = self.pump.lock() {
            if pump.is_none() {
                *pump = Some(tokio::spawn(Self::pump_loop(
                    self.playback.clone(),
                    self.state.clone(),
                    self.wakeup.clone(),
                )));
            }
        }
    }

    /// Wire (or unwire, with `None`) the outbound command path. Set by the
    /// session controller exactly when the session enters or leaves `Ready`.
    pub(crate) fn set_outbound(&self, tx: Option<CommandTx>) {
        if let Ok(mut guard) = self.outbound.lock() {
            *guard = tx;
        }
    }

    /// Forward one captured chunk as an append command. Chunks arriving while
    /// the session is not ready are dropped, never queued: after a reconnect
    /// they would refer to a turn that no longer exists. Returns whether the
    /// chunk was sent.
    pub fn submit_captured(&self, pcm16: &[u8]) -> bool {
        let guard = match self.outbound.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        let Some(tx) = guard.as_ref() else {
            tracing::warn!("session not ready, dropping {} captured bytes", pcm16.len());
            return false;
        };
        let command = ClientCommand::InputAudioBufferAppend(InputAudioBufferAppendCommand::new(
            wire_audio::encode(pcm16),
        ));
        if let Err(e) = tx.try_send(command) {
            tracing::warn!("outbound channel rejected captured chunk: {}", e);
            return false;
        }
        true
    }

    /// Queue one inbound synthesized chunk for playback, strictly FIFO.
    pub fn handle_inbound(&self, pcm16: Vec<u8>) {
        if let Ok(mut state) = self.state.lock() {
            state.queue.push_back(pcm16);
        }
        self.ensure_pump();
        self.wakeup.notify_one();
    }

    /// Atomically drop everything queued and stop the in-flight chunk. Both
    /// barge-in and manual interruption land here; there is no second path.
    pub async fn interrupt(&self) {
        {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(_) => return,
            };
            state.queue.clear();
            state.generation += 1;
            state.in_flight = false;
        }
        if let Err(e) = self.playback.stop_and_flush().await {
            tracing::error!("failed to stop playback: {}", e);
        }
    }

    /// Number of chunks queued behind the in-flight one.
    pub fn pending(&self) -> usize {
        self.state.lock().map(|s| s.queue.len()).unwrap_or(0)
    }

    async fn pump_loop(
        playback: Arc<dyn AudioPlayback>,
        state: Arc<Mutex<QueueState>>,
        wakeup: Arc<tokio::sync::Notify>,
    ) {
        loop {
            wakeup.notified().await;
            loop {
                let (chunk, generation) = {
                    let mut guard = match state.lock() {
                        Ok(guard) => guard,
                        Err(_) => return,
                    };
                    match guard.queue.pop_front() {
                        Some(chunk) => {
                            guard.in_flight = true;
                            (chunk, guard.generation)
                        }
                        None => {
                            guard.in_flight = false;
                            break;
                        }
                    }
                };
                if let Err(e) = playback
                    .play_chunk(&chunk, wire_audio::WIRE_PCM16_SAMPLE_RATE)
                    .await
                {
                    tracing::error!("playback collaborator failed: {}", e);
                }
                let interrupted = state
                    .lock()
                    .map(|guard| guard.generation != generation)
                    .unwrap_or(true);
                if interrupted {
                    break;
                }
            }
        }
    }
}

impl Drop for AudioGateway {
    fn drop(&mut self) {
        if let Ok(pump) = self.pump.get_mut() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::PlaybackError;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Records played chunks; an optional per-chunk delay keeps a chunk "in
    /// flight" long enough for tests to race against it.
    struct RecordingPlayback {
        played: tokio::sync::Mutex<Vec<Vec<u8>>>,
        delay: Duration,
        stops: std::sync::atomic::AtomicU32,
    }

    impl RecordingPlayback {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                played: tokio::sync::Mutex::new(Vec::new()),
                delay,
                stops: std::sync::atomic::AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl AudioPlayback for RecordingPlayback {
        async fn play_chunk(&self, pcm16: &[u8], _sample_rate: u32) -> Result<(), PlaybackError> {
            self.played.lock().await.push(pcm16.to_vec());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(())
        }

        async fn stop_and_flush(&self) -> Result<(), PlaybackError> {
            self.stops.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_constructs_outside_async_context() {
        // No runtime here: construction must not spawn anything.
        let playback = RecordingPlayback::new(Duration::ZERO);
        let gateway = AudioGateway::new(playback);
        assert_eq!(gateway.pending(), 0);
    }

    #[tokio::test]
    async fn test_inbound_chunks_play_in_arrival_order() {
        let playback = RecordingPlayback::new(Duration::ZERO);
        let gateway = AudioGateway::new(playback.clone());

        for i in 0u8..5 {
            gateway.handle_inbound(vec![i; 4]);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        let played = playback.played.lock().await;
        let expected: Vec<Vec<u8>> = (0u8..5).map(|i| vec![i; 4]).collect();
        assert_eq!(*played, expected);
        assert_eq!(gateway.pending(), 0);
    }

    #[tokio::test]
    async fn test_interrupt_flushes_queue_and_stops_burst() {
        let playback = RecordingPlayback::new(Duration::from_millis(30));
        let gateway = AudioGateway::new(playback.clone());

        for i in 0u8..4 {
            gateway.handle_inbound(vec![i; 4]);
        }
        // Let the first chunk enter playback, then barge in.
        tokio::time::sleep(Duration::from_millis(10)).await;
        gateway.interrupt().await;

        assert_eq!(gateway.pending(), 0);
        assert_eq!(playback.stops.load(std::sync::atomic::Ordering::SeqCst), 1);

        // Nothing else from the pre-interrupt burst may play.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let played = playback.played.lock().await;
        assert_eq!(played.len(), 1);
        assert_eq!(played[0], vec![0u8; 4]);
    }

    #[tokio::test]
    async fn test_playback_resumes_after_interrupt() {
        let playback = RecordingPlayback::new(Duration::ZERO);
        let gateway = AudioGateway::new(playback.clone());

        gateway.handle_inbound(vec![1; 4]);
        tokio::time::sleep(Duration::from_millis(20)).await;
        gateway.interrupt().await;

        gateway.handle_inbound(vec![2; 4]);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let played = playback.played.lock().await;
        assert_eq!(played.last().unwrap(), &vec![2; 4]);
    }

    #[tokio::test]
    async fn test_submit_captured_without_outbound_drops() {
        let playback = RecordingPlayback::new(Duration::ZERO);
        let gateway = AudioGateway::new(playback);
        assert!(!gateway.submit_captured(&[0u8; 8]));
    }

    #[tokio::test]
    async fn test_submit_captured_forwards_when_wired() {
        let playback = RecordingPlayback::new(Duration::ZERO);
        let gateway = AudioGateway::new(playback);
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        gateway.set_outbound(Some(tx));

        assert!(gateway.submit_captured(&[1u8, 2, 3, 4]));
        match rx.recv().await {
            Some(ClientCommand::InputAudioBufferAppend(append)) => {
                assert_eq!(wire_audio::decode(append.audio()), vec![1u8, 2, 3, 4]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        gateway.set_outbound(None);
        assert!(!gateway.submit_captured(&[9u8; 4]));
        assert!(rx.try_recv().is_err());
    }
}
