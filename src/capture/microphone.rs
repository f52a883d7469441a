use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::device::{CaptureChunk, CaptureDevice, DeviceConfig};

/// Microphone capture backed by cpal.
///
/// The cpal stream is not `Send`, so it lives on a dedicated capture thread;
/// `start`/`stop` talk to that thread through channels. The input callback
/// batches samples into fixed-interval chunks of little-endian i16 PCM.
pub struct MicrophoneDevice {
    config: DeviceConfig,
    worker: Option<CaptureWorker>,
}

struct CaptureWorker {
    stop_tx: std_mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl MicrophoneDevice {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            worker: None,
        }
    }
}

#[async_trait]
impl CaptureDevice for MicrophoneDevice {
    async fn start(&mut self) -> Result<mpsc::Receiver<CaptureChunk>> {
        if self.worker.is_some() {
            anyhow::bail!("Microphone capture already running");
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let config = self.config.clone();

        let handle = std::thread::spawn(move || {
            capture_thread(config, chunk_tx, stop_rx, ready_tx);
        });

        // The stream is built on the capture thread; wait for its verdict
        // without blocking the runtime.
        tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .context("Capture startup wait panicked")?
            .context("Capture thread exited before reporting startup")??;

        self.worker = Some(CaptureWorker { stop_tx, handle });
        info!("Microphone capture started");
        Ok(chunk_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        let worker = self
            .worker
            .take()
            .context("Microphone capture not running")?;

        // A send error means the thread already exited; join picks that up.
        let _ = worker.stop_tx.send(());
        tokio::task::spawn_blocking(move || worker.handle.join())
            .await
            .context("Capture shutdown wait panicked")?
            .map_err(|_| anyhow!("Capture thread panicked"))?;

        info!("Microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.worker.is_some()
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

/// Owns the cpal stream for the duration of one session.
fn capture_thread(
    config: DeviceConfig,
    chunk_tx: mpsc::Sender<CaptureChunk>,
    stop_rx: std_mpsc::Receiver<()>,
    ready_tx: std_mpsc::Sender<Result<()>>,
) {
    let buffer = Arc::new(Mutex::new(ChunkBuffer::new(&config, chunk_tx)));

    let stream = match build_input_stream(&config, Arc::clone(&buffer)) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(anyhow!("Failed to start input stream: {}", e)));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    // Park until the device is told to stop.
    let _ = stop_rx.recv();

    // Stop callbacks before flushing the partial chunk, otherwise the flush
    // races the callback for the buffer.
    drop(stream);
    let mut buffer = match buffer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    buffer.flush();
    // The sender inside the buffer drops with it; the channel close is the
    // stop confirmation the bridge waits for.
}

fn build_input_stream(
    config: &DeviceConfig,
    buffer: Arc<Mutex<ChunkBuffer>>,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("No audio input device available")?;
    info!(
        "Using input device: {}",
        device.name().unwrap_or_else(|_| "unknown".to_string())
    );

    let sample_format = device
        .default_input_config()
        .context("Failed to query default input config")?
        .sample_format();

    let stream_config = StreamConfig {
        channels: config.channels,
        sample_rate: SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _| {
                if let Ok(mut buffer) = buffer.lock() {
                    buffer.push_samples(data);
                }
            },
            stream_error,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _| {
                let samples: Vec<i16> = data
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                    .collect();
                if let Ok(mut buffer) = buffer.lock() {
                    buffer.push_samples(&samples);
                }
            },
            stream_error,
            None,
        ),
        other => anyhow::bail!("Unsupported input sample format: {:?}", other),
    }
    .context("Failed to build input stream")?;

    Ok(stream)
}

fn stream_error(e: cpal::StreamError) {
    warn!("Input stream error: {}", e);
}

/// Accumulates callback samples and cuts them into fixed-size chunks.
struct ChunkBuffer {
    tx: mpsc::Sender<CaptureChunk>,
    data: Vec<u8>,
    chunk_bytes: usize,
    sample_rate: u32,
    channels: u16,
    sent_bytes: u64,
}

impl ChunkBuffer {
    fn new(config: &DeviceConfig, tx: mpsc::Sender<CaptureChunk>) -> Self {
        let bytes_per_sec = config.sample_rate as u64 * config.channels as u64 * 2;
        let chunk_bytes = (bytes_per_sec * config.chunk_duration_ms / 1000).max(2) as usize;

        Self {
            tx,
            data: Vec::with_capacity(chunk_bytes),
            chunk_bytes,
            sample_rate: config.sample_rate,
            channels: config.channels,
            sent_bytes: 0,
        }
    }

    fn push_samples(&mut self, samples: &[i16]) {
        for &sample in samples {
            self.data.extend_from_slice(&sample.to_le_bytes());
        }

        while self.data.len() >= self.chunk_bytes {
            let rest = self.data.split_off(self.chunk_bytes);
            let data = std::mem::replace(&mut self.data, rest);
            self.send(data);
        }
    }

    /// Hand off the trailing partial chunk; called once after the stream has
    /// stopped, so blocking on a full channel is fine here.
    fn flush(&mut self) {
        if self.data.is_empty() {
            return;
        }
        let timestamp_ms = self.elapsed_ms();
        let data = std::mem::take(&mut self.data);
        self.sent_bytes += data.len() as u64;
        if self.tx.blocking_send(CaptureChunk::new(data, timestamp_ms)).is_err() {
            warn!("Chunk channel closed before final flush");
        }
    }

    fn send(&mut self, data: Vec<u8>) {
        let timestamp_ms = self.elapsed_ms();
        self.sent_bytes += data.len() as u64;
        // Audio callback context: never block. A full channel means the
        // consumer stalled; dropping the chunk is the lesser evil.
        match self.tx.try_send(CaptureChunk::new(data, timestamp_ms)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Chunk channel full, dropping capture chunk");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    fn elapsed_ms(&self) -> u64 {
        let samples = self.sent_bytes / 2 / self.channels as u64;
        samples * 1000 / self.sample_rate as u64
    }
}
