pub mod device;
pub mod microphone;
pub mod scripted;

pub use device::{CaptureChunk, CaptureDevice, DeviceConfig, DeviceFactory, DeviceKind};
pub use microphone::MicrophoneDevice;
pub use scripted::{ScriptedDevice, UnavailableDevice};
