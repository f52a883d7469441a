//! Recording bridge core
//!
//! This module provides the capture-to-payload pipeline:
//! - `RecordingBridge`: explicit Idle/Capturing/Finalizing state machine
//!   driven by the UI command channel
//! - `RecordingSession`: session-scoped, append-only chunk accumulation
//! - `EncodedPayload`: the per-session artifact encoded for transfer

mod bridge;
mod payload;
mod session;

pub use bridge::{BridgeConfig, RecordingBridge};
pub use payload::{EncodedPayload, PayloadBody, PayloadEncoding, DEFAULT_MIME};
pub use session::{RecordedArtifact, RecordingSession};
