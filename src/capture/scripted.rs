use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use super::device::{CaptureChunk, CaptureDevice};

/// Deterministic capture device that replays a fixed chunk script.
///
/// Live chunks are delivered as soon as capture starts; an optional final
/// chunk is held back and flushed on stop, mirroring how a real device
/// flushes its last buffer asynchronously. Used by the integration tests and
/// by smoke runs without capture hardware.
pub struct ScriptedDevice {
    live: Vec<CaptureChunk>,
    final_flush: Option<CaptureChunk>,
    close_after_script: bool,
    tx: Option<mpsc::Sender<CaptureChunk>>,
}

impl ScriptedDevice {
    pub fn new(live: Vec<CaptureChunk>) -> Self {
        Self {
            live,
            final_flush: None,
            close_after_script: false,
            tx: None,
        }
    }

    /// Script with a chunk that only arrives as part of the stop flush.
    pub fn with_final_flush(live: Vec<CaptureChunk>, flush: CaptureChunk) -> Self {
        Self {
            final_flush: Some(flush),
            ..Self::new(live)
        }
    }

    /// Drop the chunk channel right after the script, simulating a device
    /// that disconnects without a stop command.
    pub fn disconnecting(live: Vec<CaptureChunk>) -> Self {
        Self {
            close_after_script: true,
            ..Self::new(live)
        }
    }

    /// Device with nothing to say; every session comes back empty.
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CaptureDevice for ScriptedDevice {
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureChunk>> {
        if self.tx.is_some() {
            anyhow::bail!("Scripted capture already running");
        }

        // Capacity covers the whole script plus the stop flush, so the
        // scripted sends below can never fail.
        let (tx, rx) = mpsc::channel(self.live.len() + 2);
        for chunk in self.live.drain(..) {
            let _ = tx.try_send(chunk);
        }

        if self.close_after_script {
            info!("Scripted device closing channel after script");
        } else {
            self.tx = Some(tx);
        }
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| anyhow::anyhow!("Scripted capture not running"))?;
        if let Some(chunk) = self.final_flush.take() {
            let _ = tx.send(chunk).await;
        }
        drop(tx);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.tx.is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Device whose start always fails, standing in for denied or missing
/// capture access.
pub struct UnavailableDevice {
    reason: String,
}

impl UnavailableDevice {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CaptureDevice for UnavailableDevice {
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureChunk>> {
        anyhow::bail!("{}", self.reason)
    }

    async fn stop(&mut self) -> Result<()> {
        anyhow::bail!("Capture device unavailable")
    }

    fn is_capturing(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
