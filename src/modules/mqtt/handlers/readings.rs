use super::{parse_message, DeviceMessage};
use crate::{
    modules::{
        iot::{
            ingest::{authenticate_device, ingest_reading, ReadingInput},
            publish_reading, Hub,
        },
        mqtt::mqtt_client::MqttClient,
    },
    shared::{
        config::IotConfig,
        db::{get_db_access_manager, DbPool},
        errors::AppError,
    },
};
use rumqttc::QoS;
use tokio::{
    sync::mpsc::{self, UnboundedSender},
    task::JoinHandle,
};

pub async fn handler(mqtt: &MqttClient, topic: &str, pool: DbPool, hub: Hub, config: IotConfig) {
    if let Err(e) = mqtt.subscribe(topic, QoS::AtLeastOnce).await {
        log::error!("Failed to subscribe to '{}': {}", topic, e);
    }
    let (tx, _worker) = reading_worker(pool, hub, config);
    mqtt.add_topic_handler(topic, move |payload: String| {
        if tx.send(payload).is_err() {
            log::error!("MQTT reading worker stopped");
        }
    })
    .await;
}

/// Readings of one meter are billed against the previous one, so a single
/// worker ingests them in the order they were queued. It stops once every
/// sender is dropped.
pub fn reading_worker(pool: DbPool, hub: Hub, config: IotConfig) -> (UnboundedSender<String>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let worker = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if let Err(e) = handle_reading(&pool, &hub, &config, &payload).await {
                log::warn!("Dropped MQTT reading: {}", e);
            }
        }
    });
    (tx, worker)
}

/// Stores one reading published by a module and pushes it to subscribers.
pub async fn handle_reading(pool: &DbPool, hub: &Hub, config: &IotConfig, payload: &str) -> Result<(), AppError> {
    let message: DeviceMessage<ReadingInput> = parse_message(payload)?;
    let outcome = {
        let mut db = get_db_access_manager(pool.clone())?;
        let device = authenticate_device(&mut db, &message.device_id, &message.secret)?;
        ingest_reading(&mut db, config, &device, message.body)?
    };
    publish_reading(hub, &outcome).await;
    Ok(())
}
