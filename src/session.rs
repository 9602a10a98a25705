use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use voicewire_types::events::client::{
    ResponseCancelCommand, SessionUpdateCommand, ToolResultCommand,
};
use voicewire_types::events::{ClientCommand, ServerEvent};
use voicewire_types::session::SessionConfig;
use voicewire_utils::audio as wire_audio;

use crate::connection::{CommandTx, ConnectOptions, Connection, ConnectionEvent, EventRx};
use crate::error::{CaptureError, PlaybackError, SessionError, TransportError};
use crate::gateway::AudioGateway;
use crate::media::{AudioCapture, AudioPlayback, ChunkSink};
use crate::tools::{PendingToolCall, ToolCallTracker};
use crate::transcript::{Role, TranscriptAssembler, Turn};

/// Minimum spacing between informational status updates. Errors always pass.
const STATUS_MIN_INTERVAL: Duration = Duration::from_millis(200);

/// Fixed delay between reconnect rounds once the bounded per-round retries are
/// spent. Rounds repeat indefinitely while the session is meant to be up.
const RECONNECT_ROUND_DELAY: Duration = Duration::from_secs(30);

const NOTIFY_CAPACITY: usize = 256;

/// Connection lifecycle of one session. Transitions are serialized: every
/// mutation happens under the controller's session lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Configuring,
    Ready,
    Reconnecting,
    Closing,
}

/// Severity tag carried alongside every human-readable status message, so
/// embedders never have to infer severity from message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    kind: StatusKind,
    message: String,
}

impl StatusUpdate {
    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

struct SessionShared {
    connection_state: ConnectionState,
    connection: Option<Connection>,
    command_tx: Option<CommandTx>,
    recording: bool,
    settings: SessionConfig,
}

struct Inner {
    options: ConnectOptions,
    capture: Arc<dyn AudioCapture>,
    gateway: AudioGateway,
    shared: tokio::sync::Mutex<SessionShared>,
    transcript: StdMutex<TranscriptAssembler>,
    tools: StdMutex<ToolCallTracker>,
    /// True between `init`/`start_recording` and `stop`. Every reconnect
    /// attempt re-checks this before acting, which closes the race between
    /// automatic reconnection and a concurrent `stop`.
    desired_active: AtomicBool,
    /// Bumped by every `init` that actually connects. A reconnect round
    /// carries the epoch of the connection it replaces and abandons itself
    /// when a newer session has started in the meantime.
    epoch: AtomicU64,
    status_tx: tokio::sync::broadcast::Sender<StatusUpdate>,
    turn_tx: tokio::sync::broadcast::Sender<Turn>,
    tool_tx: tokio::sync::broadcast::Sender<PendingToolCall>,
    last_status: StdMutex<Option<Instant>>,
}

/// Top-level state machine and public contract: owns the connection manager,
/// wires inbound dispatch to the gateway, transcript assembler and tool
/// dispatcher, and exposes status/turn/tool notifications to embedders.
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(
        options: ConnectOptions,
        capture: Arc<dyn AudioCapture>,
        playback: Arc<dyn AudioPlayback>,
    ) -> Self {
        Self::with_settings(options, SessionConfig::default(), capture, playback)
    }

    pub fn with_settings(
        options: ConnectOptions,
        settings: SessionConfig,
        capture: Arc<dyn AudioCapture>,
        playback: Arc<dyn AudioPlayback>,
    ) -> Self {
        let (status_tx, _) = tokio::sync::broadcast::channel(NOTIFY_CAPACITY);
        let (turn_tx, _) = tokio::sync::broadcast::channel(NOTIFY_CAPACITY);
        let (tool_tx, _) = tokio::sync::broadcast::channel(NOTIFY_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                options,
                capture,
                gateway: AudioGateway::new(playback),
                shared: tokio::sync::Mutex::new(SessionShared {
                    connection_state: ConnectionState::Disconnected,
                    connection: None,
                    command_tx: None,
                    recording: false,
                    settings,
                }),
                transcript: StdMutex::new(TranscriptAssembler::new()),
                tools: StdMutex::new(ToolCallTracker::default()),
                desired_active: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                status_tx,
                turn_tx,
                tool_tx,
                last_status: StdMutex::new(None),
            }),
        }
    }

    pub fn status_updates(&self) -> tokio::sync::broadcast::Receiver<StatusUpdate> {
        self.inner.status_tx.subscribe()
    }

    pub fn turns(&self) -> tokio::sync::broadcast::Receiver<Turn> {
        self.inner.turn_tx.subscribe()
    }

    pub fn tool_calls(&self) -> tokio::sync::broadcast::Receiver<PendingToolCall> {
        self.inner.tool_tx.subscribe()
    }

    pub async fn state(&self) -> ConnectionState {
        self.inner.shared.lock().await.connection_state
    }

    /// Connect, configure, and start dispatching inbound events. A no-op when
    /// a session is already up or being brought up.
    pub async fn init(&self) -> Result<(), SessionError> {
        self.inner.desired_active.store(true, Ordering::SeqCst);
        let mut shared = self.inner.shared.lock().await;
        match shared.connection_state {
            ConnectionState::Disconnected => {}
            ConnectionState::Closing => {
                return Err(SessionError::NotReady {
                    state: ConnectionState::Closing,
                })
            }
            _ => return Ok(()),
        }
        Self::transition(&self.inner, &mut shared, ConnectionState::Connecting);
        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let connection = match Connection::establish(&self.inner.options).await {
            Ok(connection) => connection,
            Err(e) => {
                Self::transition(&self.inner, &mut shared, ConnectionState::Disconnected);
                Self::emit_status(
                    &self.inner,
                    StatusKind::Error,
                    &format!("connection failed: {}", e),
                );
                return Err(e.into());
            }
        };
        let events = connection.events();
        Self::configure(&self.inner, &mut shared, connection).await?;
        Self::spawn_dispatch(self.inner.clone(), events, epoch);
        Ok(())
    }

    /// Start streaming microphone chunks into the session, initializing it
    /// first if needed. A capture-start failure gets exactly one full
    /// reinitialize-and-retry cycle before the error is reported.
    pub async fn start_recording(&self) -> Result<(), SessionError> {
        let ready = {
            self.inner.shared.lock().await.connection_state == ConnectionState::Ready
        };
        if !ready {
            self.init().await?;
        }
        match self.try_start_capture().await {
            Ok(()) => Ok(()),
            Err(first) => {
                tracing::warn!("capture start failed, reinitializing once: {}", first);
                Self::emit_status(
                    &self.inner,
                    StatusKind::Warning,
                    "capture failed to start, retrying once",
                );
                self.shutdown_transport("capture retry").await;
                self.init().await?;
                self.try_start_capture().await
            }
        }
    }

    /// Stop the session. Order matters: flush playback first, then stop
    /// capture, then close the connection, so no outbound audio can trail a
    /// stopped session.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.inner.desired_active.store(false, Ordering::SeqCst);
        let mut shared = self.inner.shared.lock().await;
        if shared.connection_state == ConnectionState::Disconnected && !shared.recording {
            return Ok(());
        }
        Self::transition(&self.inner, &mut shared, ConnectionState::Closing);

        self.inner.gateway.interrupt().await;

        if shared.recording {
            if let Err(e) = self.inner.capture.stop_capture().await {
                tracing::warn!("failed to stop capture: {}", e);
            }
            shared.recording = false;
        }

        self.inner.gateway.set_outbound(None);
        shared.command_tx = None;
        if let Some(connection) = shared.connection.take() {
            connection.close("client stop").await;
        }

        if let Ok(mut tracker) = self.inner.tools.lock() {
            for orphan in tracker.drain_orphans() {
                tracing::warn!(
                    "tool call {} ({}) ended without a result",
                    orphan.call_id(),
                    orphan.name()
                );
            }
        }

        Self::transition(&self.inner, &mut shared, ConnectionState::Disconnected);
        Ok(())
    }

    /// Cancel the in-flight response and flush local playback. A status-only
    /// no-op unless the session is ready.
    pub async fn interrupt_speech(&self) -> Result<(), SessionError> {
        let command_tx = {
            let shared = self.inner.shared.lock().await;
            if shared.connection_state != ConnectionState::Ready {
                Self::emit_status(
                    &self.inner,
                    StatusKind::Info,
                    &format!(
                        "interrupt ignored, session is {:?}",
                        shared.connection_state
                    ),
                );
                return Ok(());
            }
            shared.command_tx.clone()
        };
        if let Some(tx) = command_tx {
            tx.send(ClientCommand::ResponseCancel(ResponseCancelCommand::new()))
                .await
                .map_err(|e| SessionError::Send(e.to_string()))?;
        }
        self.inner.gateway.interrupt().await;
        Ok(())
    }

    /// Replace the stored settings snapshot; re-applied immediately when the
    /// session is ready, otherwise on the next (re)configure.
    pub async fn update_settings(&self, settings: SessionConfig) -> Result<(), SessionError> {
        let mut shared = self.inner.shared.lock().await;
        shared.settings = settings;
        if shared.connection_state == ConnectionState::Ready {
            if let Some(tx) = shared.command_tx.clone() {
                let snapshot = shared.settings.clone();
                tx.send(ClientCommand::SessionUpdate(SessionUpdateCommand::new(
                    snapshot,
                )))
                .await
                .map_err(|e| SessionError::Send(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Send the result for an earlier tool call. The remote party owns
    /// correlation, so unknown ids go through; an empty id is a caller bug and
    /// is rejected without sending.
    pub async fn send_tool_result(&self, call_id: &str, result: &str) -> Result<(), SessionError> {
        if call_id.is_empty() {
            tracing::error!("rejecting tool result with empty call id");
            return Err(SessionError::InvalidToolCall("empty call id".to_string()));
        }
        let command_tx = {
            let shared = self.inner.shared.lock().await;
            if shared.connection_state != ConnectionState::Ready {
                return Err(SessionError::NotReady {
                    state: shared.connection_state,
                });
            }
            shared
                .command_tx
                .clone()
                .ok_or_else(|| SessionError::Send("no outbound channel".to_string()))?
        };
        command_tx
            .send(ClientCommand::ToolResult(ToolResultCommand::new(
                call_id, result,
            )))
            .await
            .map_err(|e| SessionError::Send(e.to_string()))?;
        if let Ok(mut tracker) = self.inner.tools.lock() {
            tracker.resolve(call_id);
        }
        Ok(())
    }

    /// Entry point for the capture collaborator's error channel. Always
    /// surfaced; tears the session down when it was actively recording.
    pub async fn report_capture_error(&self, error: CaptureError) {
        Self::emit_status(&self.inner, StatusKind::Error, &error.to_string());
        let recording = { self.inner.shared.lock().await.recording };
        if recording {
            tracing::warn!("stopping session after capture failure");
            if let Err(e) = self.stop().await {
                tracing::error!("failed to stop after capture error: {}", e);
            }
        }
    }

    /// Entry point for the playback collaborator's error channel. Surfaced as
    /// an error status; playback of later chunks continues.
    pub fn report_playback_error(&self, error: PlaybackError) {
        Self::emit_status(&self.inner, StatusKind::Error, &error.to_string());
    }

    async fn try_start_capture(&self) -> Result<(), SessionError> {
        self.inner.capture.init().await?;
        let sink = Self::capture_sink(self.inner.clone());
        self.inner.capture.start_capture(sink).await?;
        self.inner.shared.lock().await.recording = true;
        Self::emit_status(&self.inner, StatusKind::Info, "recording started");
        Ok(())
    }

    /// Close the transport without clearing the desired-active flag, for the
    /// single capture-retry cycle.
    async fn shutdown_transport(&self, reason: &str) {
        let mut shared = self.inner.shared.lock().await;
        self.inner.gateway.set_outbound(None);
        shared.command_tx = None;
        if let Some(connection) = shared.connection.take() {
            connection.close(reason).await;
        }
        Self::transition(&self.inner, &mut shared, ConnectionState::Disconnected);
    }

    fn capture_sink(inner: Arc<Inner>) -> ChunkSink {
        Arc::new(move |chunk: Vec<u8>| {
            if !inner.gateway.submit_captured(&chunk) {
                Self::emit_status(
                    &inner,
                    StatusKind::Warning,
                    "dropped captured audio chunk, session not ready",
                );
            }
        })
    }

    /// Send the settings snapshot and promote the connection to ready. Caller
    /// holds the session lock.
    async fn configure(
        inner: &Arc<Inner>,
        shared: &mut SessionShared,
        connection: Connection,
    ) -> Result<(), SessionError> {
        Self::transition(inner, shared, ConnectionState::Configuring);
        let command_tx = connection.commands();
        let snapshot = shared.settings.clone();
        if let Err(e) = command_tx
            .send(ClientCommand::SessionUpdate(SessionUpdateCommand::new(
                snapshot,
            )))
            .await
        {
            Self::transition(inner, shared, ConnectionState::Disconnected);
            connection.close("session configuration failed").await;
            return Err(SessionError::Send(e.to_string()));
        }
        // No configure ack in this protocol: ready as soon as the snapshot is
        // on the wire.
        shared.command_tx = Some(command_tx.clone());
        shared.connection = Some(connection);
        inner.gateway.set_outbound(Some(command_tx));
        Self::transition(inner, shared, ConnectionState::Ready);
        Ok(())
    }

    fn spawn_dispatch(inner: Arc<Inner>, mut events: EventRx, epoch: u64) {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ConnectionEvent::Event(event)) => {
                        Self::handle_server_event(&inner, event).await;
                    }
                    Ok(ConnectionEvent::Lost(reason)) => {
                        match Self::reconnect(&inner, reason, epoch).await {
                            Some(new_events) => events = new_events,
                            None => break,
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("inbound dispatch lagged, dropped {} events", n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("inbound dispatch task finished");
        });
    }

    /// Reconnect after a lost stream. Each round runs the bounded handshake
    /// retry of `Connection::establish`; failed rounds repeat forever with a
    /// fixed delay while the session is still meant to be up. Configuration is
    /// re-applied on every successful reconnect. `epoch` is the generation of
    /// the connection that was lost; a newer generation means another `init`
    /// has taken over and this round must not touch its connection.
    async fn reconnect(inner: &Arc<Inner>, reason: TransportError, epoch: u64) -> Option<EventRx> {
        Self::emit_status(
            inner,
            StatusKind::Error,
            &format!("connection lost: {}", reason),
        );
        loop {
            if inner.epoch.load(Ordering::SeqCst) != epoch
                || !inner.desired_active.load(Ordering::SeqCst)
            {
                tracing::debug!("reconnect abandoned, session superseded or stopped");
                return None;
            }
            {
                let mut shared = inner.shared.lock().await;
                Self::transition(inner, &mut shared, ConnectionState::Reconnecting);
                inner.gateway.set_outbound(None);
                shared.command_tx = None;
                if let Some(old) = shared.connection.take() {
                    old.close("reconnecting").await;
                }
            }
            match Connection::establish(&inner.options).await {
                Ok(connection) => {
                    let mut shared = inner.shared.lock().await;
                    if inner.epoch.load(Ordering::SeqCst) != epoch
                        || !inner.desired_active.load(Ordering::SeqCst)
                    {
                        connection.close("superseded during reconnect").await;
                        return None;
                    }
                    let events = connection.events();
                    match Self::configure(inner, &mut shared, connection).await {
                        Ok(()) => {
                            Self::emit_status(inner, StatusKind::Info, "session reconnected");
                            return Some(events);
                        }
                        Err(e) => {
                            Self::emit_status(
                                inner,
                                StatusKind::Error,
                                &format!("reconfigure after reconnect failed: {}", e),
                            );
                        }
                    }
                }
                Err(e) => {
                    let mut shared = inner.shared.lock().await;
                    Self::transition(inner, &mut shared, ConnectionState::Disconnected);
                    drop(shared);
                    Self::emit_status(
                        inner,
                        StatusKind::Error,
                        &format!("reconnect failed: {}", e),
                    );
                }
            }
            tokio::time::sleep(RECONNECT_ROUND_DELAY).await;
        }
    }

    async fn handle_server_event(inner: &Arc<Inner>, event: ServerEvent) {
        match event {
            ServerEvent::AudioDelta(delta) => {
                let pcm = wire_audio::decode(delta.delta());
                if !pcm.is_empty() {
                    inner.gateway.handle_inbound(pcm);
                }
            }
            ServerEvent::AudioDone(_) => {
                tracing::debug!("assistant audio segment complete");
            }
            ServerEvent::SpeechStarted(_) => {
                Self::emit_status(
                    inner,
                    StatusKind::Info,
                    "user speech detected, interrupting assistant",
                );
                let command_tx = { inner.shared.lock().await.command_tx.clone() };
                if let Some(tx) = command_tx {
                    if let Err(e) = tx
                        .send(ClientCommand::ResponseCancel(ResponseCancelCommand::new()))
                        .await
                    {
                        tracing::warn!("failed to send response cancel: {}", e);
                    }
                }
                inner.gateway.interrupt().await;
            }
            ServerEvent::SpeechStopped(_) => {
                Self::emit_status(inner, StatusKind::Info, "user speech ended");
            }
            ServerEvent::TextDelta(delta) => {
                if let Ok(mut transcript) = inner.transcript.lock() {
                    transcript.append_delta(Role::Assistant, delta.delta());
                }
            }
            ServerEvent::TextDone(done) => {
                if let Ok(mut transcript) = inner.transcript.lock() {
                    // A done event can carry the full text without any
                    // preceding deltas.
                    if transcript.buffer_is_empty(Role::Assistant) {
                        if let Some(text) = done.text() {
                            transcript.append_delta(Role::Assistant, text);
                        }
                    }
                }
                Self::finalize_turn(inner, Role::Assistant);
            }
            ServerEvent::TranscriptCompleted(completed) => {
                if let Ok(mut transcript) = inner.transcript.lock() {
                    transcript.append_delta(Role::User, completed.transcript());
                }
                Self::finalize_turn(inner, Role::User);
            }
            ServerEvent::TurnItemStarted(item) => {
                tracing::debug!("turn item started: {:?}", item.item_id());
            }
            ServerEvent::TurnItemFinished(item) => {
                let role = match item.role() {
                    Some("user") => Role::User,
                    _ => Role::Assistant,
                };
                Self::finalize_turn(inner, role);
            }
            ServerEvent::ResponseDone(_) => {
                Self::finalize_turn(inner, Role::Assistant);
            }
            ServerEvent::ToolCalls(batch) => {
                for invocation in batch.calls() {
                    let call = PendingToolCall::from(invocation);
                    if let Ok(mut tracker) = inner.tools.lock() {
                        tracker.record(&call);
                    }
                    // Subscribers execute out-of-band; dispatch never waits.
                    let _ = inner.tool_tx.send(call);
                }
                Self::emit_status(
                    inner,
                    StatusKind::Info,
                    &format!("{} tool call(s) requested", batch.calls().len()),
                );
            }
            ServerEvent::RateLimitsUpdated(update) => {
                for limit in update.rate_limits() {
                    Self::emit_status(
                        inner,
                        StatusKind::Info,
                        &format!(
                            "rate limit {}: {}/{} remaining",
                            limit.name(),
                            limit.remaining(),
                            limit.limit()
                        ),
                    );
                }
            }
            ServerEvent::Error(event) => {
                let details = event.error();
                Self::emit_status(
                    inner,
                    StatusKind::Error,
                    &format!(
                        "remote error [{}]: {}",
                        details.error_type(),
                        details.message()
                    ),
                );
            }
            ServerEvent::Unrecognized { event_type } => {
                tracing::debug!("ignoring unrecognized event type: {}", event_type);
            }
        }
    }

    fn finalize_turn(inner: &Arc<Inner>, role: Role) {
        let turn = match inner.transcript.lock() {
            Ok(mut transcript) => transcript.finalize(role),
            Err(_) => None,
        };
        if let Some(turn) = turn {
            let _ = inner.turn_tx.send(turn);
        }
    }

    fn transition(inner: &Inner, shared: &mut SessionShared, next: ConnectionState) {
        if shared.connection_state == next {
            return;
        }
        tracing::debug!(
            "session state: {:?} -> {:?}",
            shared.connection_state,
            next
        );
        shared.connection_state = next;
        Self::emit_status(inner, StatusKind::Info, &format!("session state: {:?}", next));
    }

    fn emit_status(inner: &Inner, kind: StatusKind, message: &str) {
        if kind != StatusKind::Error {
            if let Ok(mut last) = inner.last_status.lock() {
                if let Some(at) = *last {
                    if at.elapsed() < STATUS_MIN_INTERVAL {
                        return;
                    }
                }
                *last = Some(Instant::now());
            }
        }
        match kind {
            StatusKind::Error => tracing::error!("{}", message),
            StatusKind::Warning => tracing::warn!("{}", message),
            StatusKind::Info => tracing::debug!("{}", message),
        }
        let _ = inner.status_tx.send(StatusUpdate {
            kind,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
impl SessionController {
    /// Put the controller in `Ready` over a stub outbound channel, bypassing
    /// the network. Mirrors what a real `init` establishes: state, channels,
    /// the active flag, and a fresh session generation.
    async fn force_ready(&self, command_tx: CommandTx) {
        let mut shared = self.inner.shared.lock().await;
        shared.connection_state = ConnectionState::Ready;
        shared.command_tx = Some(command_tx.clone());
        self.inner.desired_active.store(true, Ordering::SeqCst);
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.gateway.set_outbound(Some(command_tx));
    }

    async fn dispatch(&self, event: ServerEvent) {
        Self::handle_server_event(&self.inner, event).await;
    }

    fn gateway(&self) -> &AudioGateway {
        &self.inner.gateway
    }
}
