use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;

use super::microphone::MicrophoneDevice;
use super::scripted::ScriptedDevice;

/// One opaque fragment of captured audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureChunk {
    /// Raw fragment bytes; the bridge never inspects them.
    pub data: Vec<u8>,
    /// Milliseconds since capture started.
    pub timestamp_ms: u64,
}

impl CaptureChunk {
    pub fn new(data: Vec<u8>, timestamp_ms: u64) -> Self {
        Self { data, timestamp_ms }
    }

    /// Size indicator reported alongside the fragment.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Configuration for a capture device
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Interval between chunk deliveries while capturing
    pub chunk_duration_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            chunk_duration_ms: 250,
        }
    }
}

/// Audio capture device trait
///
/// `start` hands back the chunk channel for one session. After `stop`
/// returns, the device flushes any buffered final chunk and then drops its
/// sender; the channel close is the stop confirmation, so a drain that runs
/// to `None` has seen every chunk of the session.
#[async_trait]
pub trait CaptureDevice: Send {
    /// Start capturing; returns the receiver delivering this session's chunks
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureChunk>>;

    /// Stop capturing; the final buffered chunk is flushed before the
    /// channel closes
    async fn stop(&mut self) -> Result<()>;

    /// Check if the device is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Which capture implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// cpal microphone input
    Microphone,
    /// No capture hardware; yields an empty session (smoke runs)
    Scripted,
}

/// Capture device factory
pub struct DeviceFactory;

impl DeviceFactory {
    pub fn create(kind: DeviceKind, config: DeviceConfig) -> Result<Box<dyn CaptureDevice>> {
        match kind {
            DeviceKind::Microphone => Ok(Box::new(MicrophoneDevice::new(config))),
            DeviceKind::Scripted => Ok(Box::new(ScriptedDevice::silent())),
        }
    }
}
