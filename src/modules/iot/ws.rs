use super::{
    hub::{Hub, Tx, WsEvent},
    ingest::reading_payload,
    reconnect::PING_INTERVAL,
};
use crate::shared::{
    db::{
        get_db_access_manager,
        models::{IotDevice, IotReading},
        DbPool,
    },
    errors::AppError,
};
use futures::{SinkExt, StreamExt};
use futures_channel::mpsc::unbounded;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::ws::{Message, WebSocket};

/// A client that misses this many pings is dropped.
const MISSED_PINGS: u32 = 3;

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Subscribe { device_id: String },
    Unsubscribe { device_id: String },
    Ping,
}

pub struct WsSession {
    pub session_id: String,
    pub user_id: i32,
    /// `None` sees every device; `Some(customer)` only that customer's.
    pub scope: Option<i32>,
    pub hub: Hub,
    pub pool: DbPool,
}

pub fn valid_session_id(session_id: &str) -> bool {
    let trimmed = session_id.trim();
    !trimmed.is_empty() && trimmed != "undefined" && trimmed != "null"
}

fn reply<T: Serialize>(tx: &Tx, event: &T) {
    match serde_json::to_string(event) {
        Ok(text) => {
            if let Err(e) = tx.unbounded_send(Message::text(text)) {
                warn!("Dropping ws reply: {}", e);
            }
        }
        Err(e) => error!("Error serializing ws reply: {}", e),
    }
}

fn reply_error(tx: &Tx, message: &str) {
    reply(
        tx,
        &WsEvent {
            type_: "error",
            device_id: None,
            data: json!({ "message": message }),
        },
    );
}

pub async fn serve_session(socket: WebSocket, session: WsSession, initial_devices: Vec<String>) {
    let (mut outgoing, mut incoming) = socket.split();
    let (tx, mut rx) = unbounded::<Message>();

    let conn_no = session
        .hub
        .join(&session.session_id, session.user_id, tx.clone())
        .await;

    let writer_session = session.session_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.next().await {
            if let Err(err) = outgoing.send(msg).await {
                error!("Failed to send ws message to {}: {}", writer_session, err);
                break;
            }
        }
        let _ = outgoing.close().await;
    });

    reply(
        &tx,
        &WsEvent {
            type_: "connected",
            device_id: None,
            data: json!({ "session_id": session.session_id, "user_id": session.user_id }),
        },
    );
    for device_key in initial_devices {
        subscribe(&session, conn_no, &tx, &device_key).await;
    }

    let idle_limit = PING_INTERVAL * MISSED_PINGS;
    loop {
        let next = match tokio::time::timeout(idle_limit, incoming.next()).await {
            Ok(next) => next,
            Err(_) => {
                info!("Session {} idle, closing", session.session_id);
                break;
            }
        };
        let message = match next {
            Some(Ok(message)) => message,
            Some(Err(err)) => {
                error!("Client {} disconnected due to error: {}", session.session_id, err);
                break;
            }
            None => break,
        };
        if message.is_close() {
            break;
        }
        // protocol pings and binary frames carry no commands
        let text = match message.to_str() {
            Ok(text) => text,
            Err(_) => continue,
        };
        handle_text(&session, conn_no, &tx, text).await;
    }

    session.hub.leave(&session.session_id, conn_no).await;
    drop(tx);
    if let Err(e) = writer.await {
        error!("Writer task for {} failed: {}", session.session_id, e);
    }
}

async fn handle_text(session: &WsSession, conn_no: u64, tx: &Tx, text: &str) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            reply_error(tx, &format!("Invalid message: {}", e));
            return;
        }
    };
    match message {
        ClientMessage::Subscribe { device_id } => subscribe(session, conn_no, tx, &device_id).await,
        ClientMessage::Unsubscribe { device_id } => {
            session
                .hub
                .unsubscribe(&session.session_id, conn_no, &device_id)
                .await;
            let subscriptions = session.hub.subscriptions(&session.session_id).await;
            reply(
                tx,
                &WsEvent {
                    type_: "unsubscribed",
                    device_id: Some(&device_id),
                    data: json!({ "subscriptions": subscriptions }),
                },
            );
        }
        ClientMessage::Ping => reply(
            tx,
            &WsEvent {
                type_: "pong",
                device_id: None,
                data: json!({ "timestamp": chrono::Utc::now().timestamp_millis() }),
            },
        ),
    }
}

async fn subscribe(session: &WsSession, conn_no: u64, tx: &Tx, device_key: &str) {
    let (device, latest) = match visible_device(&session.pool, session.scope, device_key) {
        Ok(Some(found)) => found,
        Ok(None) => {
            reply_error(tx, &format!("Device {} not found or not accessible", device_key));
            return;
        }
        Err(e) => {
            error!("Error loading device {} for ws: {}", device_key, e);
            reply_error(tx, "Internal Server Error");
            return;
        }
    };

    session
        .hub
        .subscribe(&session.session_id, conn_no, &device.device_key)
        .await;
    let subscriptions = session.hub.subscriptions(&session.session_id).await;
    reply(
        tx,
        &WsEvent {
            type_: "subscribed",
            device_id: Some(&device.device_key),
            data: json!({ "status": device.connection_status, "subscriptions": subscriptions }),
        },
    );
    if let Some(reading) = latest {
        reply(
            tx,
            &WsEvent {
                type_: "device_reading",
                device_id: Some(&device.device_key),
                data: reading_payload(&reading),
            },
        );
    }
}

fn visible_device(
    pool: &DbPool,
    scope: Option<i32>,
    device_key: &str,
) -> Result<Option<(IotDevice, Option<IotReading>)>, AppError> {
    let mut db = get_db_access_manager(pool.clone())?;
    let device = match db.find_iot_device_by_key(device_key)? {
        Some(device) => device,
        None => return Ok(None),
    };
    if let Some(customer_id) = scope {
        let owner = match device.device_id {
            Some(meter_id) => db.find_device_by_id(meter_id)?.map(|meter| meter.customer_id),
            None => None,
        };
        if owner != Some(customer_id) {
            return Ok(None);
        }
    }
    let latest = db.latest_reading(device.id)?;
    Ok(Some((device, latest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_session_ids_are_refused() {
        assert!(!valid_session_id(""));
        assert!(!valid_session_id("  "));
        assert!(!valid_session_id("undefined"));
        assert!(!valid_session_id("null"));
        assert!(valid_session_id("session_1712345678_abc"));
    }

    #[test]
    fn query_collects_indexed_devices() {
        let query: WsQuery = serde_qs::from_str("token=abc&devices[0]=IOT-1&devices[1]=IOT-2").unwrap();
        assert_eq!(query.token.as_deref(), Some("abc"));
        assert_eq!(query.devices, vec!["IOT-1", "IOT-2"]);

        let empty: WsQuery = serde_qs::from_str("").unwrap();
        assert!(empty.devices.is_empty());
    }

    #[test]
    fn client_messages_are_tagged_by_type() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe","device_id":"IOT-1"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { device_id } if device_id == "IOT-1"));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"ping"}"#).unwrap(),
            ClientMessage::Ping
        ));
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"explode"}"#).is_err());
    }
}
