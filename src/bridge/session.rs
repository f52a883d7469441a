use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::capture::CaptureChunk;

/// Accumulated state for one start-to-stop recording cycle.
///
/// The chunk sequence is append-only and keeps its delivery order; playback
/// depends on it. Zero-size fragments are discarded with a diagnostic rather
/// than treated as errors.
pub struct RecordingSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    chunks: Vec<CaptureChunk>,
    total_bytes: usize,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            chunks: Vec::new(),
            total_bytes: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Append one captured fragment, preserving delivery order.
    pub fn append(&mut self, chunk: CaptureChunk) {
        if chunk.is_empty() {
            warn!(
                "Session {}: discarding empty chunk at {}ms",
                self.id, chunk.timestamp_ms
            );
            return;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
    }

    /// Concatenate the accumulated fragments, in delivery order, into the
    /// session's final artifact. Consumes the session.
    pub fn finalize(self, mime: &str) -> RecordedArtifact {
        let mut bytes = Vec::with_capacity(self.total_bytes);
        for chunk in &self.chunks {
            bytes.extend_from_slice(&chunk.data);
        }

        RecordedArtifact {
            session_id: self.id,
            mime: mime.to_string(),
            bytes,
        }
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// The full recording of one session: concatenated chunk bytes plus the
/// fixed codec identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedArtifact {
    pub session_id: Uuid,
    pub mime: String,
    pub bytes: Vec<u8>,
}
