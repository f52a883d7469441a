use std::mem;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::payload::{EncodedPayload, PayloadEncoding, DEFAULT_MIME};
use super::session::RecordingSession;
use crate::capture::{CaptureChunk, CaptureDevice};
use crate::ports::{BridgeCommand, BridgeEvent, BridgePort};

/// Emission configuration for the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Codec identifier attached to every artifact
    pub mime: String,
    /// Transfer encoding for the emitted payload
    pub encoding: PayloadEncoding,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mime: DEFAULT_MIME.to_string(),
            encoding: PayloadEncoding::default(),
        }
    }
}

enum BridgeState {
    Idle,
    Capturing {
        session: RecordingSession,
        chunks: mpsc::Receiver<CaptureChunk>,
    },
    Finalizing,
}

impl BridgeState {
    fn name(&self) -> &'static str {
        match self {
            BridgeState::Idle => "idle",
            BridgeState::Capturing { .. } => "capturing",
            BridgeState::Finalizing => "finalizing",
        }
    }
}

/// Mediates between the UI command channel and the capture device, emitting
/// one encoded payload per recording session.
///
/// At most one session is active at a time; out-of-order commands are no-ops
/// with a diagnostic rather than errors.
pub struct RecordingBridge {
    device: Box<dyn CaptureDevice>,
    config: BridgeConfig,
    state: BridgeState,
}

impl RecordingBridge {
    pub fn new(device: Box<dyn CaptureDevice>, config: BridgeConfig) -> Self {
        Self {
            device,
            config,
            state: BridgeState::Idle,
        }
    }

    /// Drive the bridge until the command channel closes.
    pub async fn run(mut self, port: BridgePort) -> Result<()> {
        let BridgePort {
            mut commands,
            events,
        } = port;
        info!("Recording bridge running (device: {})", self.device.name());

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(BridgeCommand::StartRecording) => self.handle_start(&events).await?,
                    Some(BridgeCommand::StopRecording) => self.handle_stop(&events).await?,
                    None => break,
                },
                chunk = Self::next_chunk(&mut self.state) => match chunk {
                    Some(chunk) => self.on_chunk(chunk),
                    None => self.on_device_lost(&events).await?,
                },
            }
        }

        info!("Command channel closed, bridge shutting down");
        Ok(())
    }

    /// Resolves to the next captured chunk; pends forever while idle.
    async fn next_chunk(state: &mut BridgeState) -> Option<CaptureChunk> {
        match state {
            BridgeState::Capturing { chunks, .. } => chunks.recv().await,
            _ => std::future::pending().await,
        }
    }

    async fn handle_start(&mut self, events: &mpsc::Sender<BridgeEvent>) -> Result<()> {
        if !matches!(self.state, BridgeState::Idle) {
            warn!("Ignoring start-recording while {}", self.state.name());
            return Ok(());
        }

        match self.device.start().await {
            Ok(chunks) => {
                let session = RecordingSession::new();
                info!("Capture started: session {}", session.id());
                self.state = BridgeState::Capturing { session, chunks };
            }
            Err(e) => {
                error!("Failed to start capture device: {:#}", e);
                events
                    .send(BridgeEvent::CaptureFailed {
                        reason: format!("{:#}", e),
                    })
                    .await
                    .context("Event channel closed")?;
            }
        }
        Ok(())
    }

    async fn handle_stop(&mut self, events: &mpsc::Sender<BridgeEvent>) -> Result<()> {
        let (mut session, mut chunks) =
            match mem::replace(&mut self.state, BridgeState::Finalizing) {
                BridgeState::Capturing { session, chunks } => (session, chunks),
                other => {
                    warn!("Ignoring stop-recording while {}", other.name());
                    self.state = other;
                    return Ok(());
                }
            };

        info!("Stopping capture: session {}", session.id());
        if let Err(e) = self.device.stop().await {
            error!("Failed to stop capture device: {:#}", e);
            events
                .send(BridgeEvent::CaptureFailed {
                    reason: format!("{:#}", e),
                })
                .await
                .context("Event channel closed")?;
            self.state = BridgeState::Idle;
            return Ok(());
        }

        // The device flushes its last buffered chunk and then closes the
        // channel; the close is the stop confirmation, so finishing this
        // drain means no chunk of the session can be lost.
        while let Some(chunk) = chunks.recv().await {
            session.append(chunk);
        }

        info!(
            "Session {} finalizing: {} chunks, {} bytes",
            session.id(),
            session.chunk_count(),
            session.total_bytes()
        );
        let artifact = session.finalize(&self.config.mime);
        let payload = EncodedPayload::encode(artifact, self.config.encoding);
        events
            .send(BridgeEvent::AudioReady(payload))
            .await
            .context("Event channel closed")?;

        self.state = BridgeState::Idle;
        Ok(())
    }

    fn on_chunk(&mut self, chunk: CaptureChunk) {
        if let BridgeState::Capturing { session, .. } = &mut self.state {
            session.append(chunk);
        }
    }

    /// The chunk channel closed without a stop command: the device is gone.
    async fn on_device_lost(&mut self, events: &mpsc::Sender<BridgeEvent>) -> Result<()> {
        let state = mem::replace(&mut self.state, BridgeState::Idle);
        if let BridgeState::Capturing { session, .. } = state {
            error!("Capture device disconnected during session {}", session.id());
            events
                .send(BridgeEvent::CaptureFailed {
                    reason: "capture device disconnected".to_string(),
                })
                .await
                .context("Event channel closed")?;
        }
        Ok(())
    }
}
