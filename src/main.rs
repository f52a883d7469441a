use anyhow::{Context, Result};
use clap::Parser;
use recorder_bridge::{
    bridge_ports, create_router, BridgeConfig, Config, DeviceConfig, DeviceFactory, NatsTransport,
    RecordingBridge,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "recorder-bridge", about = "Static SPA host with an audio recording bridge")]
struct Args {
    /// Config file to load (without extension)
    #[arg(long, default_value = "config/recorder-bridge")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);
    info!(
        "Serving {} on {}:{}",
        cfg.assets.dir, cfg.service.http.bind, cfg.service.http.port
    );

    // Static asset host
    let router = create_router(&cfg.assets.dir, &cfg.assets.index);
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let http_task = tokio::spawn(async move { axum::serve(listener, router).await });

    // Recording bridge, wired to the UI over NATS
    let device = DeviceFactory::create(
        cfg.capture.device,
        DeviceConfig {
            sample_rate: cfg.capture.sample_rate,
            channels: cfg.capture.channels,
            chunk_duration_ms: cfg.capture.chunk_duration_ms,
        },
    )?;
    let bridge = RecordingBridge::new(
        device,
        BridgeConfig {
            mime: cfg.payload.mime.clone(),
            encoding: cfg.payload.encoding,
        },
    );
    let transport = NatsTransport::connect(&cfg.nats.url).await?;

    let (transport_port, bridge_port) = bridge_ports(16);
    let bridge_task = tokio::spawn(bridge.run(bridge_port));
    let transport_task = tokio::spawn(transport.run(transport_port));

    tokio::select! {
        res = http_task => res.context("HTTP task panicked")?.context("HTTP server failed")?,
        res = bridge_task => res.context("Bridge task panicked")??,
        res = transport_task => res.context("Transport task panicked")??,
    }

    Ok(())
}
