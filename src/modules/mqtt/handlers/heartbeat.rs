use super::{parse_message, DeviceMessage};
use crate::{
    modules::{
        iot::{
            ingest::{apply_heartbeat, authenticate_device, HeartbeatInput},
            publish_status, Hub,
        },
        mqtt::mqtt_client::MqttClient,
    },
    shared::{
        db::{get_db_access_manager, DbPool},
        errors::AppError,
    },
};
use rumqttc::QoS;
use tokio::sync::mpsc;

pub async fn handler(mqtt: &MqttClient, topic: &str, pool: DbPool, hub: Hub) {
    if let Err(e) = mqtt.subscribe(topic, QoS::AtLeastOnce).await {
        log::error!("Failed to subscribe to '{}': {}", topic, e);
    }
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(e) = handle_heartbeat(&pool, &hub, &payload).await {
                log::warn!("Dropped MQTT heartbeat: {}", e);
            }
        }
    });
    mqtt.add_topic_handler(topic, move |payload: String| {
        if tx.send(payload).is_err() {
            log::error!("MQTT heartbeat worker stopped");
        }
    })
    .await;
}

pub async fn handle_heartbeat(pool: &DbPool, hub: &Hub, payload: &str) -> Result<(), AppError> {
    let message: DeviceMessage<HeartbeatInput> = parse_message(payload)?;
    let outcome = {
        let mut db = get_db_access_manager(pool.clone())?;
        let device = authenticate_device(&mut db, &message.device_id, &message.secret)?;
        apply_heartbeat(&mut db, &device, message.body)?
    };
    if outcome.status_changed {
        publish_status(hub, &outcome.device).await;
    }
    Ok(())
}
