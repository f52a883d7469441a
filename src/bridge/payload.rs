use anyhow::{Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::RecordedArtifact;

/// Codec identifier attached to every artifact. Fixed, not negotiated with
/// the capture device at runtime.
pub const DEFAULT_MIME: &str = "audio/ogg; codecs=opus";

/// How a finished artifact crosses the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
    /// Directly dereferenceable bytes for hosts whose channel can carry them
    BlobReference,
    /// Text-safe base64 body (no data-URL prefix)
    Base64Text,
}

impl Default for PayloadEncoding {
    fn default() -> Self {
        PayloadEncoding::Base64Text
    }
}

/// Transfer-encoded artifact body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "snake_case")]
pub enum PayloadBody {
    BlobReference(Vec<u8>),
    Base64Text(String),
}

/// The artifact of one finished session, encoded for transfer to the UI.
///
/// Ownership transfers with the `audio-ready` event; the bridge keeps no
/// reference after emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    pub session_id: Uuid,
    /// Fixed codec identifier for the artifact
    pub mime: String,
    /// Artifact size in bytes before transfer encoding
    pub byte_len: usize,
    #[serde(flatten)]
    pub body: PayloadBody,
}

impl EncodedPayload {
    pub fn encode(artifact: RecordedArtifact, encoding: PayloadEncoding) -> Self {
        let byte_len = artifact.bytes.len();
        let body = match encoding {
            PayloadEncoding::BlobReference => PayloadBody::BlobReference(artifact.bytes),
            PayloadEncoding::Base64Text => {
                PayloadBody::Base64Text(general_purpose::STANDARD.encode(&artifact.bytes))
            }
        };

        Self {
            session_id: artifact.session_id,
            mime: artifact.mime,
            byte_len,
            body,
        }
    }

    /// Recover the artifact bytes exactly as they were accumulated.
    pub fn decoded(&self) -> Result<Vec<u8>> {
        match &self.body {
            PayloadBody::BlobReference(bytes) => Ok(bytes.clone()),
            PayloadBody::Base64Text(text) => general_purpose::STANDARD
                .decode(text)
                .context("Failed to decode base64 payload"),
        }
    }
}
