pub mod bridge;
pub mod capture;
pub mod config;
pub mod http;
pub mod nats;
pub mod ports;

pub use bridge::{
    BridgeConfig, EncodedPayload, PayloadBody, PayloadEncoding, RecordedArtifact, RecordingBridge,
    RecordingSession, DEFAULT_MIME,
};
pub use capture::{
    CaptureChunk, CaptureDevice, DeviceConfig, DeviceFactory, DeviceKind, MicrophoneDevice,
    ScriptedDevice, UnavailableDevice,
};
pub use config::Config;
pub use http::create_router;
pub use nats::{AudioReadyMessage, CaptureFailedMessage, NatsTransport};
pub use ports::{bridge_ports, BridgeCommand, BridgeEvent, BridgePort, TransportPort};
