mod handlers;
mod mqtt_client;

pub use handlers::{handle_heartbeat, handle_reading, reading_worker, DeviceMessage};

use crate::{
    modules::iot::{reconnect::ReconnectPolicy, Hub},
    shared::{
        config::{IotConfig, MqttConfig},
        db::DbPool,
    },
};
use mqtt_client::MqttClient;
use tokio::task::JoinHandle;

/// Bridges the device topics into the ingestion path shared with the HTTP
/// endpoints.
pub async fn start_mqtt(pool: DbPool, hub: Hub, iot: IotConfig, config: MqttConfig) -> JoinHandle<()> {
    let (mqtt, eventloop) = MqttClient::new(&config);

    handlers::readings::handler(&mqtt, &config.readings_topic, pool.clone(), hub.clone(), iot).await;
    handlers::heartbeat::handler(&mqtt, &config.heartbeat_topic, pool, hub).await;

    log::info!(
        "MQTT bridge connecting to {}:{} as {}",
        config.broker,
        config.port,
        config.client_id
    );
    mqtt.spawn_event_loop(eventloop, ReconnectPolicy::new(config.max_reconnect_attempts))
}
