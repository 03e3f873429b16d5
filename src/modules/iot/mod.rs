pub mod hub;
pub mod ingest;
pub mod reconnect;
pub mod sweeper;
pub mod ws;

pub use hub::Hub;

use crate::shared::db::models::IotDevice;
use hub::WsEvent;
use ingest::{reading_payload, IngestOutcome};
use serde_json::json;

/// Pushes the stored reading, and the status when the module came online.
pub async fn publish_reading(hub: &Hub, outcome: &IngestOutcome) {
    let event = WsEvent {
        type_: "device_reading",
        device_id: Some(&outcome.device.device_key),
        data: reading_payload(&outcome.reading),
    };
    let delivered = hub.broadcast_device(&outcome.device.device_key, &event).await;
    log::debug!(
        "Reading of {} delivered to {} session(s)",
        outcome.device.device_key,
        delivered
    );
    if outcome.status_changed {
        publish_status(hub, &outcome.device).await;
    }
}

pub async fn publish_status(hub: &Hub, device: &IotDevice) {
    let event = WsEvent {
        type_: "device_status",
        device_id: Some(&device.device_key),
        data: json!({
            "status": device.connection_status,
            "battery_level": device.battery_level,
            "signal_strength": device.signal_strength,
            "last_heartbeat_at": device.last_heartbeat_at,
        }),
    };
    hub.broadcast_device(&device.device_key, &event).await;
}
