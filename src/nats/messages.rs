use serde::{Deserialize, Serialize};

use crate::bridge::PayloadBody;

/// Published when a finished recording is ready for the UI.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioReadyMessage {
    pub session_id: String,
    /// Fixed codec identifier for the artifact
    pub mime: String,
    /// Artifact size in bytes before transfer encoding
    pub byte_len: usize,
    #[serde(flatten)]
    pub body: PayloadBody,
    /// RFC3339 timestamp of emission
    pub timestamp: String,
}

/// Published when capture could not start or was lost mid-session.
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureFailedMessage {
    pub reason: String,
    pub timestamp: String,
}
