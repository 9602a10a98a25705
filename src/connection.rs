use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use voicewire_types::codec;
use voicewire_types::events::{ClientCommand, ServerEvent};

use crate::error::{ConnectError, TransportError};

mod consts;
mod options;
mod utils;

pub use options::{ConnectOptions, ConnectOptionsBuilder};

pub type CommandTx = tokio::sync::mpsc::Sender<ClientCommand>;
type EventTx = tokio::sync::broadcast::Sender<ConnectionEvent>;
pub type EventRx = tokio::sync::broadcast::Receiver<ConnectionEvent>;

/// What the background reader hands to the session controller: decoded events
/// while the stream is healthy, then a single `Lost` when it is not. The
/// reader never reconnects on its own.
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    Event(ServerEvent),
    Lost(TransportError),
}

/// One established transport stream plus its writer and reader tasks. Owns the
/// socket exclusively; everyone else talks through channels.
pub struct Connection {
    command_tx: CommandTx,
    event_tx: EventTx,
    shutdown: tokio::sync::watch::Sender<bool>,
    send_handle: tokio::task::JoinHandle<()>,
    recv_handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    /// Connect with bounded retry: up to `max_attempts` handshakes, each
    /// bounded by `attempt_timeout`, with `min(base * 2^n, cap)` delays in
    /// between. Terminal error once the attempts are spent.
    pub async fn establish(options: &ConnectOptions) -> Result<Self, ConnectError> {
        let mut last_error: Option<ConnectError> = None;
        for attempt in 0..options.max_attempts() {
            if attempt > 0 {
                let delay = options.backoff_delay(attempt - 1);
                tracing::debug!("waiting {:?} before handshake attempt {}", delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }
            match Self::attempt(options).await {
                Ok(connection) => return Ok(connection),
                Err(e) => {
                    tracing::warn!(
                        "handshake attempt {}/{} failed: {}",
                        attempt + 1,
                        options.max_attempts(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(ConnectError::AttemptsExhausted {
            attempts: options.max_attempts(),
            last: Box::new(last_error.unwrap_or(ConnectError::Timeout(options.attempt_timeout()))),
        })
    }

    async fn attempt(options: &ConnectOptions) -> Result<Self, ConnectError> {
        let request = utils::build_request(options)?;
        let connect = tokio_tungstenite::connect_async(request);
        let (ws_stream, _) = tokio::time::timeout(options.attempt_timeout(), connect)
            .await
            .map_err(|_| ConnectError::Timeout(options.attempt_timeout()))??;

        let (mut write, mut read) = ws_stream.split();

        let (command_tx, mut command_rx) = tokio::sync::mpsc::channel::<ClientCommand>(1024);
        let (event_tx, _) = tokio::sync::broadcast::channel(1024);
        let (shutdown, _) = tokio::sync::watch::channel(false);

        let mut send_shutdown = shutdown.subscribe();
        let send_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = send_shutdown.changed() => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    command = command_rx.recv() => {
                        let Some(command) = command else { break };
                        match codec::encode(&command) {
                            Ok(text) => {
                                if let Err(e) = write.send(Message::Text(text)).await {
                                    tracing::error!("failed to send message: {}", e);
                                }
                            }
                            Err(e) => {
                                tracing::error!("failed to serialize command: {}", e);
                            }
                        }
                    }
                }
            }
        });

        let reader_events = event_tx.clone();
        let mut recv_shutdown = shutdown.subscribe();
        let recv_handle = tokio::spawn(async move {
            let mut consecutive_decode_errors = 0u32;
            loop {
                let message = tokio::select! {
                    _ = recv_shutdown.changed() => break,
                    message = read.next() => message,
                };
                let message = match message {
                    None => {
                        let _ = reader_events.send(ConnectionEvent::Lost(TransportError::Ended));
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("failed to read message: {}", e);
                        let _ = reader_events
                            .send(ConnectionEvent::Lost(TransportError::Read(e.to_string())));
                        break;
                    }
                    Some(Ok(message)) => message,
                };
                match message {
                    Message::Text(text) => match codec::decode(&text) {
                        Ok(event) => {
                            consecutive_decode_errors = 0;
                            if let ServerEvent::Unrecognized { ref event_type } = event {
                                tracing::debug!("received unrecognized event type: {}", event_type);
                            }
                            // No receivers is fine, e.g. during controller teardown.
                            let _ = reader_events.send(ConnectionEvent::Event(event));
                        }
                        Err(e) => {
                            consecutive_decode_errors += 1;
                            tracing::warn!(
                                "skipping undecodable frame ({} consecutive): {}",
                                consecutive_decode_errors,
                                e
                            );
                            if consecutive_decode_errors > consts::MAX_CONSECUTIVE_DECODE_ERRORS {
                                let _ = reader_events
                                    .send(ConnectionEvent::Lost(TransportError::CorruptStream));
                                break;
                            }
                        }
                    },
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed by remote: {:?}", reason);
                        let reason = reason.map(|r| format!("{:?}", r));
                        let _ = reader_events
                            .send(ConnectionEvent::Lost(TransportError::Closed(reason)));
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(Self {
            command_tx,
            event_tx,
            shutdown,
            send_handle,
            recv_handle,
        })
    }

    /// Sender for outbound commands. The channel serializes concurrent
    /// callers onto the single stream in invocation order.
    pub fn commands(&self) -> CommandTx {
        self.command_tx.clone()
    }

    /// Subscribe to decoded inbound events and the lost-connection signal.
    pub fn events(&self) -> EventRx {
        self.event_tx.subscribe()
    }

    /// Cooperative teardown: signal both tasks, then give them a bounded
    /// grace period before aborting.
    pub async fn close(self, reason: &str) {
        tracing::info!("closing connection: {}", reason);
        let _ = self.shutdown.send(true);
        let grace = std::time::Duration::from_secs(consts::CLOSE_GRACE_SECS);
        let send_abort = self.send_handle.abort_handle();
        let recv_abort = self.recv_handle.abort_handle();
        let wind_down = async {
            let _ = self.send_handle.await;
            let _ = self.recv_handle.await;
        };
        if tokio::time::timeout(grace, wind_down).await.is_err() {
            tracing::warn!("connection tasks did not stop within {:?}, aborting", grace);
            send_abort.abort();
            recv_abort.abort();
        }
    }
}

#[cfg(test)]
impl Connection {
    /// A connection whose outbound channel is already closed, for exercising
    /// send-failure paths without a socket. The returned receiver observes the
    /// shutdown signal, so callers can assert `close` happened.
    pub(crate) fn stub_with_closed_outbound() -> (Self, tokio::sync::watch::Receiver<bool>) {
        let (command_tx, command_rx) = tokio::sync::mpsc::channel(1);
        drop(command_rx);
        let (event_tx, _) = tokio::sync::broadcast::channel(8);
        let (shutdown, shutdown_rx) = tokio::sync::watch::channel(false);
        let send_handle = tokio::spawn(async {});
        let recv_handle = tokio::spawn(async {});
        (
            Self {
                command_tx,
                event_tx,
                shutdown,
                send_handle,
                recv_handle,
            },
            shutdown_rx,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// A listener that accepts TCP connections and immediately drops them, so
    /// every websocket handshake against it fails.
    async fn rejecting_endpoint() -> (String, Arc<AtomicU32>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicU32::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(stream);
            }
        });
        (format!("ws://127.0.0.1:{}", port), accepted)
    }

    #[tokio::test]
    async fn test_establish_fails_after_three_attempts_with_backoff() {
        let (url, accepted) = rejecting_endpoint().await;
        let base = Duration::from_millis(20);
        let options = ConnectOptions::builder()
            .with_base_url(&url)
            .with_api_key("test-key")
            .with_backoff_base(base)
            .with_backoff_cap(Duration::from_millis(200))
            .build();

        let started = Instant::now();
        let result = Connection::establish(&options).await;
        let elapsed = started.elapsed();

        match result {
            Err(ConnectError::AttemptsExhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected exhausted attempts, got {:?}", other.map(|_| ())),
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 3);
        // Two inter-attempt delays: base + 2 * base.
        assert!(elapsed >= base * 3, "elapsed {:?} < expected backoff", elapsed);
    }

    #[tokio::test]
    async fn test_establish_times_out_unresponsive_endpoint() {
        // Bound but never accept, so the handshake hangs until the timeout.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        std::mem::forget(listener);

        let options = ConnectOptions::builder()
            .with_base_url(&format!("ws://127.0.0.1:{}", port))
            .with_api_key("test-key")
            .with_max_attempts(1)
            .with_attempt_timeout(Duration::from_millis(100))
            .build();

        match Connection::establish(&options).await {
            Err(ConnectError::AttemptsExhausted { last, .. }) => {
                assert!(matches!(*last, ConnectError::Timeout(_)));
            }
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }
}
