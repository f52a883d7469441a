use anyhow::{Context, Result};
use async_nats::Client;
use chrono::Utc;
use futures::stream::StreamExt;
use tracing::{error, info, warn};

use super::messages::{AudioReadyMessage, CaptureFailedMessage};
use crate::ports::{BridgeCommand, BridgeEvent, TransportPort};

/// Subject the UI publishes to start a recording.
pub const START_SUBJECT: &str = "bridge.command.start-recording";
/// Subject the UI publishes to stop a recording.
pub const STOP_SUBJECT: &str = "bridge.command.stop-recording";
/// Wildcard covering all inbound command subjects.
pub const COMMAND_WILDCARD: &str = "bridge.command.>";
/// Subject audio-ready events are published on.
pub const AUDIO_READY_SUBJECT: &str = "bridge.event.audio-ready";
/// Subject capture failures are published on.
pub const CAPTURE_FAILED_SUBJECT: &str = "bridge.event.capture-failed";

/// NATS adapter for the bridge ports: UI commands arrive as subject-only
/// publications, bridge events leave as JSON messages.
pub struct NatsTransport {
    client: Client,
}

impl NatsTransport {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    /// Shuttle commands and events between NATS and the bridge ports until
    /// the bridge side goes away.
    pub async fn run(self, port: TransportPort) -> Result<()> {
        let TransportPort {
            commands,
            mut events,
        } = port;

        let mut subscriber = self
            .client
            .subscribe(COMMAND_WILDCARD)
            .await
            .context("Failed to subscribe to bridge commands")?;
        info!("Subscribed to {}", COMMAND_WILDCARD);

        let forward = tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let command = match msg.subject.as_str() {
                    START_SUBJECT => BridgeCommand::StartRecording,
                    STOP_SUBJECT => BridgeCommand::StopRecording,
                    other => {
                        warn!("Ignoring unknown command subject: {}", other);
                        continue;
                    }
                };
                if commands.send(command).await.is_err() {
                    // Bridge gone; nothing left to forward to
                    break;
                }
            }
        });

        while let Some(event) = events.recv().await {
            if let Err(e) = self.publish_event(event).await {
                // Keep serving later sessions even if one publish fails
                error!("Failed to publish bridge event: {:#}", e);
            }
        }

        forward.abort();
        info!("Bridge event channel closed, transport shutting down");
        Ok(())
    }

    async fn publish_event(&self, event: BridgeEvent) -> Result<()> {
        match event {
            BridgeEvent::AudioReady(payload) => {
                let message = AudioReadyMessage {
                    session_id: payload.session_id.to_string(),
                    mime: payload.mime,
                    byte_len: payload.byte_len,
                    body: payload.body,
                    timestamp: Utc::now().to_rfc3339(),
                };
                let bytes = serde_json::to_vec(&message)?;

                self.client
                    .publish(AUDIO_READY_SUBJECT.to_string(), bytes.into())
                    .await
                    .context("Failed to publish audio-ready event")?;

                info!(
                    "Published audio-ready to {} (session={}, bytes={})",
                    AUDIO_READY_SUBJECT, message.session_id, message.byte_len
                );
            }
            BridgeEvent::CaptureFailed { reason } => {
                let message = CaptureFailedMessage {
                    reason,
                    timestamp: Utc::now().to_rfc3339(),
                };
                let bytes = serde_json::to_vec(&message)?;

                self.client
                    .publish(CAPTURE_FAILED_SUBJECT.to_string(), bytes.into())
                    .await
                    .context("Failed to publish capture-failed event")?;

                warn!(
                    "Published capture-failed to {}: {}",
                    CAPTURE_FAILED_SUBJECT, message.reason
                );
            }
        }
        Ok(())
    }
}
