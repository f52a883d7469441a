// Integration tests for the recording bridge
//
// These tests drive the bridge through its typed ports with scripted
// capture devices and verify the events that come back out.

use anyhow::Result;
use recorder_bridge::{
    bridge_ports, BridgeCommand, BridgeConfig, BridgeEvent, CaptureChunk, CaptureDevice,
    RecordingBridge, ScriptedDevice, TransportPort, UnavailableDevice, DEFAULT_MIME,
};
use tokio::task::JoinHandle;

fn chunk(fill: u8, len: usize, timestamp_ms: u64) -> CaptureChunk {
    CaptureChunk::new(vec![fill; len], timestamp_ms)
}

fn spawn_bridge(device: Box<dyn CaptureDevice>) -> (TransportPort, JoinHandle<Result<()>>) {
    let (transport_port, bridge_port) = bridge_ports(16);
    let bridge = RecordingBridge::new(device, BridgeConfig::default());
    let handle = tokio::spawn(bridge.run(bridge_port));
    (transport_port, handle)
}

#[tokio::test]
async fn test_session_emits_one_payload_with_all_chunks() -> Result<()> {
    // Two chunks arrive live, the third only as part of the stop flush.
    let device = ScriptedDevice::with_final_flush(
        vec![chunk(0xAA, 4096, 0), chunk(0xBB, 4096, 250)],
        chunk(0xCC, 512, 500),
    );
    let (mut port, handle) = spawn_bridge(Box::new(device));

    port.commands.send(BridgeCommand::StartRecording).await?;
    port.commands.send(BridgeCommand::StopRecording).await?;

    let payload = match port.events.recv().await {
        Some(BridgeEvent::AudioReady(payload)) => payload,
        other => panic!("Expected audio-ready, got {:?}", other),
    };

    assert_eq!(payload.mime, DEFAULT_MIME);
    assert_eq!(payload.byte_len, 8704);

    let bytes = payload.decoded()?;
    assert_eq!(bytes.len(), 8704);
    // Delivery order survives byte-for-byte, including the stop flush
    assert!(bytes[..4096].iter().all(|&b| b == 0xAA));
    assert!(bytes[4096..8192].iter().all(|&b| b == 0xBB));
    assert!(bytes[8192..].iter().all(|&b| b == 0xCC));

    drop(port.commands);
    handle.await??;
    assert!(port.events.recv().await.is_none(), "no further events");
    Ok(())
}

#[tokio::test]
async fn test_immediate_stop_emits_empty_payload() -> Result<()> {
    let (mut port, handle) = spawn_bridge(Box::new(ScriptedDevice::silent()));

    port.commands.send(BridgeCommand::StartRecording).await?;
    port.commands.send(BridgeCommand::StopRecording).await?;

    let payload = match port.events.recv().await {
        Some(BridgeEvent::AudioReady(payload)) => payload,
        other => panic!("Expected audio-ready, got {:?}", other),
    };

    assert_eq!(payload.byte_len, 0);
    assert!(payload.decoded()?.is_empty());
    assert_eq!(payload.mime, DEFAULT_MIME);

    drop(port.commands);
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_zero_size_chunks_never_reach_the_payload() -> Result<()> {
    let device = ScriptedDevice::new(vec![chunk(0, 0, 0), chunk(0x42, 10, 100)]);
    let (mut port, handle) = spawn_bridge(Box::new(device));

    port.commands.send(BridgeCommand::StartRecording).await?;
    port.commands.send(BridgeCommand::StopRecording).await?;

    let payload = match port.events.recv().await {
        Some(BridgeEvent::AudioReady(payload)) => payload,
        other => panic!("Expected audio-ready, got {:?}", other),
    };
    assert_eq!(payload.decoded()?, vec![0x42; 10]);

    drop(port.commands);
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_stop_while_idle_emits_nothing() -> Result<()> {
    let (mut port, handle) = spawn_bridge(Box::new(ScriptedDevice::silent()));

    port.commands.send(BridgeCommand::StopRecording).await?;

    drop(port.commands);
    handle.await??;
    assert!(port.events.recv().await.is_none(), "stop while idle is a no-op");
    Ok(())
}

#[tokio::test]
async fn test_start_while_capturing_is_ignored() -> Result<()> {
    let device = ScriptedDevice::new(vec![chunk(0x11, 8, 0)]);
    let (mut port, handle) = spawn_bridge(Box::new(device));

    port.commands.send(BridgeCommand::StartRecording).await?;
    port.commands.send(BridgeCommand::StartRecording).await?;
    port.commands.send(BridgeCommand::StopRecording).await?;

    let payload = match port.events.recv().await {
        Some(BridgeEvent::AudioReady(payload)) => payload,
        other => panic!("Expected audio-ready, got {:?}", other),
    };
    assert_eq!(payload.decoded()?, vec![0x11; 8]);

    drop(port.commands);
    handle.await??;
    assert!(port.events.recv().await.is_none(), "exactly one emission");
    Ok(())
}

#[tokio::test]
async fn test_unavailable_device_emits_capture_failed() -> Result<()> {
    let device = UnavailableDevice::new("microphone permission denied");
    let (mut port, handle) = spawn_bridge(Box::new(device));

    port.commands.send(BridgeCommand::StartRecording).await?;

    match port.events.recv().await {
        Some(BridgeEvent::CaptureFailed { reason }) => {
            assert!(reason.contains("permission denied"), "reason: {}", reason);
        }
        other => panic!("Expected capture-failed, got {:?}", other),
    }

    drop(port.commands);
    handle.await??;
    assert!(port.events.recv().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_device_disconnect_emits_capture_failed() -> Result<()> {
    let device = ScriptedDevice::disconnecting(vec![chunk(0x11, 8, 0)]);
    let (mut port, handle) = spawn_bridge(Box::new(device));

    port.commands.send(BridgeCommand::StartRecording).await?;

    match port.events.recv().await {
        Some(BridgeEvent::CaptureFailed { reason }) => {
            assert!(reason.contains("disconnected"), "reason: {}", reason);
        }
        other => panic!("Expected capture-failed, got {:?}", other),
    }

    drop(port.commands);
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_back_to_back_sessions_emit_distinct_payloads() -> Result<()> {
    let (mut port, handle) = spawn_bridge(Box::new(ScriptedDevice::silent()));

    port.commands.send(BridgeCommand::StartRecording).await?;
    port.commands.send(BridgeCommand::StopRecording).await?;
    port.commands.send(BridgeCommand::StartRecording).await?;
    port.commands.send(BridgeCommand::StopRecording).await?;

    let first = match port.events.recv().await {
        Some(BridgeEvent::AudioReady(payload)) => payload,
        other => panic!("Expected audio-ready, got {:?}", other),
    };
    let second = match port.events.recv().await {
        Some(BridgeEvent::AudioReady(payload)) => payload,
        other => panic!("Expected audio-ready, got {:?}", other),
    };

    assert_ne!(first.session_id, second.session_id);

    drop(port.commands);
    handle.await??;
    assert!(port.events.recv().await.is_none());
    Ok(())
}
