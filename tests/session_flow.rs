use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use voicewire::{
    AudioCapture, AudioPlayback, CaptureError, ChunkSink, ConnectOptions, ConnectionState,
    PlaybackError, Role, SessionController,
};

struct NullCapture;

/// Fails the first capture start, succeeds afterwards, and counts attempts.
struct FlakyCapture {
    starts: std::sync::atomic::AtomicU32,
}

impl FlakyCapture {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            starts: std::sync::atomic::AtomicU32::new(0),
        })
    }

    fn start_attempts(&self) -> u32 {
        self.starts.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioCapture for FlakyCapture {
    async fn init(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    async fn start_capture(&self, _on_chunk: ChunkSink) -> Result<bool, CaptureError> {
        let attempt = self.starts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if attempt == 0 {
            Err(CaptureError("device busy".to_string()))
        } else {
            Ok(true)
        }
    }

    async fn stop_capture(&self) -> Result<bool, CaptureError> {
        Ok(true)
    }
}

#[async_trait]
impl AudioCapture for NullCapture {
    async fn init(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    async fn start_capture(&self, _on_chunk: ChunkSink) -> Result<bool, CaptureError> {
        Ok(true)
    }

    async fn stop_capture(&self) -> Result<bool, CaptureError> {
        Ok(true)
    }
}

struct NullPlayback;

#[async_trait]
impl AudioPlayback for NullPlayback {
    async fn play_chunk(&self, _pcm16: &[u8], _sample_rate: u32) -> Result<(), PlaybackError> {
        Ok(())
    }

    async fn stop_and_flush(&self) -> Result<(), PlaybackError> {
        Ok(())
    }
}

/// A one-session server: asserts the configure command arrives first, streams
/// back a short scripted response, then keeps the socket open until the client
/// closes it.
async fn scripted_server() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws.split();

        // The first outbound command must be the session configuration.
        let first = read.next().await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(first.to_text().unwrap()).unwrap();
        assert_eq!(value["type"], "session.update");
        assert_eq!(value["session"]["input_audio_format"], "pcm16");

        for frame in [
            r#"{"type":"response.text.delta","delta":"Hel"}"#,
            r#"{"type":"response.text.delta","delta":"lo"}"#,
            r#"{"type":"response.text.done"}"#,
            r#"{"type":"some.future.event","payload":1}"#,
        ] {
            write.send(Message::Text(frame.to_string())).await.unwrap();
        }

        // Drain until the client closes.
        while let Some(Ok(message)) = read.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });
    (format!("ws://127.0.0.1:{}", port), handle)
}

async fn read_session_update<S>(read: &mut S)
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let first = read.next().await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(first.to_text().unwrap()).unwrap();
    assert_eq!(value["type"], "session.update");
}

/// Configures a first session, then drops its socket mid-conversation. The
/// client is expected to reconnect and re-apply its configuration, after which
/// a short response is scripted on the new socket.
async fn dropping_server() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let (_write, mut read) = ws.split();
            read_session_update(&mut read).await;
            // Socket dropped here without a close handshake.
        }

        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut write, mut read) = ws.split();
        read_session_update(&mut read).await;
        for frame in [
            r#"{"type":"response.text.delta","delta":"back"}"#,
            r#"{"type":"response.text.done"}"#,
        ] {
            write.send(Message::Text(frame.to_string())).await.unwrap();
        }
        while let Some(Ok(message)) = read.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });
    (format!("ws://127.0.0.1:{}", port), handle)
}

/// Serves two consecutive sessions, asserting each one opens with a
/// configuration command, and keeps the last socket open until the client
/// closes it.
async fn two_session_server() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        for _ in 0..2 {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let (_write, mut read) = ws.split();
            read_session_update(&mut read).await;
            while let Some(Ok(message)) = read.next().await {
                if matches!(message, Message::Close(_)) {
                    break;
                }
            }
        }
    });
    (format!("ws://127.0.0.1:{}", port), handle)
}

#[tokio::test]
async fn test_session_configures_and_assembles_turns() {
    tracing_subscriber::fmt()
        .with_env_filter("voicewire=debug")
        .try_init()
        .ok();

    let (url, server) = scripted_server().await;
    let controller = SessionController::new(
        ConnectOptions::builder()
            .with_base_url(&url)
            .with_api_key("test-key")
            .build(),
        Arc::new(NullCapture),
        Arc::new(NullPlayback),
    );
    let mut turns = controller.turns();

    controller.init().await.unwrap();
    assert_eq!(controller.state().await, ConnectionState::Ready);

    let turn = tokio::time::timeout(Duration::from_secs(5), turns.recv())
        .await
        .expect("no turn within timeout")
        .unwrap();
    assert_eq!(turn.role(), Role::Assistant);
    assert_eq!(turn.text(), "Hello");

    controller.stop().await.unwrap();
    assert_eq!(controller.state().await, ConnectionState::Disconnected);

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not finish")
        .unwrap();
}

#[tokio::test]
async fn test_lost_connection_reconfigures_on_reconnect() {
    let (url, server) = dropping_server().await;
    let controller = SessionController::new(
        ConnectOptions::builder()
            .with_base_url(&url)
            .with_api_key("test-key")
            .with_backoff_base(Duration::from_millis(20))
            .build(),
        Arc::new(NullCapture),
        Arc::new(NullPlayback),
    );
    let mut turns = controller.turns();

    controller.init().await.unwrap();

    // The scripted response only arrives on the second connection, after the
    // configuration was re-applied there.
    let turn = tokio::time::timeout(Duration::from_secs(10), turns.recv())
        .await
        .expect("no turn after reconnect")
        .unwrap();
    assert_eq!(turn.text(), "back");
    assert_eq!(controller.state().await, ConnectionState::Ready);

    controller.stop().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not finish")
        .unwrap();
}

#[tokio::test]
async fn test_capture_start_failure_retries_exactly_once() {
    let (url, server) = two_session_server().await;
    let capture = FlakyCapture::new();
    let controller = SessionController::new(
        ConnectOptions::builder()
            .with_base_url(&url)
            .with_api_key("test-key")
            .build(),
        capture.clone(),
        Arc::new(NullPlayback),
    );

    controller.start_recording().await.unwrap();

    assert_eq!(capture.start_attempts(), 2);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while controller.state().await != ConnectionState::Ready {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session never became ready after capture retry"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    controller.stop().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not finish")
        .unwrap();
}

#[tokio::test]
async fn test_init_is_idempotent_while_up() {
    let (url, _server) = scripted_server().await;
    let controller = SessionController::new(
        ConnectOptions::builder()
            .with_base_url(&url)
            .with_api_key("test-key")
            .build(),
        Arc::new(NullCapture),
        Arc::new(NullPlayback),
    );

    controller.init().await.unwrap();
    // Second init must not tear down or reconnect.
    controller.init().await.unwrap();
    assert_eq!(controller.state().await, ConnectionState::Ready);

    controller.stop().await.unwrap();
}
