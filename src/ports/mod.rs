//! Typed command/event channels between a UI transport and the bridge.
//!
//! The UI boundary is deliberately narrow: two zero-argument inbound
//! commands and two outbound events. Any concrete transport (NATS, or the
//! in-process ports the tests use) adapts to these channels.

use tokio::sync::mpsc;

use crate::bridge::EncodedPayload;

/// Inbound command from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeCommand {
    StartRecording,
    StopRecording,
}

/// Outbound event to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// One finished recording, emitted exactly once per session
    AudioReady(EncodedPayload),
    /// Capture could not start or was lost; no payload will follow
    CaptureFailed { reason: String },
}

/// Transport-facing half of the port pair.
pub struct TransportPort {
    pub commands: mpsc::Sender<BridgeCommand>,
    pub events: mpsc::Receiver<BridgeEvent>,
}

/// Bridge-facing half of the port pair.
pub struct BridgePort {
    pub commands: mpsc::Receiver<BridgeCommand>,
    pub events: mpsc::Sender<BridgeEvent>,
}

/// Create the connected channel pair for one bridge instance.
pub fn bridge_ports(capacity: usize) -> (TransportPort, BridgePort) {
    let (command_tx, command_rx) = mpsc::channel(capacity);
    let (event_tx, event_rx) = mpsc::channel(capacity);

    (
        TransportPort {
            commands: command_tx,
            events: event_rx,
        },
        BridgePort {
            commands: command_rx,
            events: event_tx,
        },
    )
}
