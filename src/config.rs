use anyhow::Result;
use serde::Deserialize;

use crate::bridge::PayloadEncoding;
use crate::capture::DeviceKind;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub assets: AssetsConfig,
    pub capture: CaptureConfig,
    pub payload: PayloadConfig,
    pub nats: NatsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Prebuilt SPA asset tree to serve.
#[derive(Debug, Deserialize)]
pub struct AssetsConfig {
    pub dir: String,
    /// Entry document served for unmatched routes
    pub index: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    pub device: DeviceKind,
    pub sample_rate: u32,
    pub channels: u16,
    /// Interval between chunk deliveries while capturing
    pub chunk_duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct PayloadConfig {
    /// Fixed codec identifier attached to every artifact
    pub mime: String,
    pub encoding: PayloadEncoding,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
