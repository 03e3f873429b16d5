use crate::{modules::iot::reconnect::ReconnectPolicy, shared::config::MqttConfig};
use log::{error, info, warn};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    sync::Mutex,
    task::{self, JoinHandle},
    time::sleep,
};

type TopicHandler = Box<dyn FnMut(String) + Send + Sync + 'static>;

#[derive(Clone)]
pub struct MqttClient {
    client: AsyncClient,
    topic_handlers: Arc<Mutex<HashMap<String, TopicHandler>>>,
    connected: Arc<Mutex<bool>>,
}

impl MqttClient {
    pub fn new(config: &MqttConfig) -> (MqttClient, EventLoop) {
        let mut options = MqttOptions::new(config.client_id.clone(), config.broker.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive.into()));
        options.set_clean_session(true);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username.clone(), password.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, 250);
        let mqtt_client = MqttClient {
            client,
            topic_handlers: Arc::new(Mutex::new(HashMap::new())),
            connected: Arc::new(Mutex::new(false)),
        };
        (mqtt_client, eventloop)
    }

    /// Polls the broker until the reconnect policy gives up. Every topic with
    /// a handler is subscribed again after each successful connection.
    pub fn spawn_event_loop(&self, mut eventloop: EventLoop, mut policy: ReconnectPolicy) -> JoinHandle<()> {
        let mqtt_client = self.clone();
        task::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let topic = publish.topic.clone();
                        let payload = String::from_utf8_lossy(&publish.payload).to_string();
                        log::debug!("Received message on topic '{}'", topic);

                        match mqtt_client.topic_handlers.lock().await.get_mut(&topic) {
                            Some(handler) => handler(payload),
                            None => warn!("No handler for topic '{}'", topic),
                        }
                    }
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        if ack.code != ConnectReturnCode::Success {
                            error!("Broker refused the connection: {:?}", ack.code);
                            continue;
                        }
                        info!("Connection established with broker.");
                        policy.reset();
                        *mqtt_client.connected.lock().await = true;
                        mqtt_client.resubscribe().await;
                    }
                    Ok(_) => (),
                    Err(e) => {
                        let mut connected = mqtt_client.connected.lock().await;
                        if *connected {
                            *connected = false;
                            warn!("Connection lost with broker: {}", e);
                        }
                        drop(connected);

                        match policy.next_delay() {
                            Some(delay) => {
                                warn!(
                                    "MQTT poll failed ({}), retry {} in {} ms",
                                    e,
                                    policy.attempts(),
                                    delay.as_millis()
                                );
                                sleep(delay).await;
                            }
                            None => {
                                error!(
                                    "MQTT bridge giving up after {} failed attempts: {}",
                                    policy.attempts(),
                                    e
                                );
                                break;
                            }
                        }
                    }
                }
            }
        })
    }

    async fn resubscribe(&self) {
        let topics: Vec<String> = self.topic_handlers.lock().await.keys().cloned().collect();
        for topic in topics {
            info!("Subscribing to topic: {}", topic);
            if let Err(e) = self.client.subscribe(topic.clone(), QoS::AtLeastOnce).await {
                error!("Failed to subscribe to topic '{}': {}", topic, e);
            }
        }
    }

    pub async fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), rumqttc::ClientError> {
        self.client.subscribe(topic, qos).await?;
        Ok(())
    }

    pub async fn add_topic_handler<F>(&self, topic: &str, handler: F)
    where
        F: FnMut(String) + Send + Sync + 'static,
    {
        let mut handlers = self.topic_handlers.lock().await;
        handlers.insert(topic.to_string(), Box::new(handler));
    }
}
