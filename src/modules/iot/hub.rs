use futures_channel::mpsc::UnboundedSender;
use log::{error, info};
use serde::Serialize;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::RwLock;
use warp::ws::Message;

pub type Tx = UnboundedSender<Message>;
type SessionId = String;

#[derive(Debug)]
struct Session {
    conn_no: u64,
    tx: Tx,
    devices: HashSet<String>,
}

#[derive(Serialize, Debug)]
pub struct WsEvent<'a, T: Serialize> {
    #[serde(rename = "type")]
    pub type_: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<&'a str>,
    pub data: T,
}

/// Live WebSocket sessions and their device subscriptions.
#[derive(Debug, Clone, Default)]
pub struct Hub {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    next_conn: Arc<AtomicU64>,
}

impl Hub {
    pub fn new() -> Hub {
        Hub::default()
    }

    /// Registers a connection under `session_id`, replacing any older one.
    /// Returns the connection number the caller must present on leave.
    pub async fn join(&self, session_id: &str, user_id: i32, tx: Tx) -> u64 {
        let conn_no = self.next_conn.fetch_add(1, Ordering::Relaxed) + 1;
        let mut sessions = self.sessions.write().await;
        let replaced = sessions.insert(
            session_id.to_string(),
            Session {
                conn_no,
                tx,
                devices: HashSet::new(),
            },
        );
        drop(sessions);
        if let Some(old) = replaced {
            old.tx.close_channel();
            info!("Session {} reconnected, previous connection replaced", session_id);
        } else {
            info!("Session {} joined by user {}", session_id, user_id);
        }
        conn_no
    }

    /// Removes the session only when `conn_no` is still the live connection.
    pub async fn leave(&self, session_id: &str, conn_no: u64) -> bool {
        let mut sessions = self.sessions.write().await;
        let is_current = sessions
            .get(session_id)
            .map(|session| session.conn_no == conn_no)
            .unwrap_or(false);
        if is_current {
            sessions.remove(session_id);
            info!("Session {} left", session_id);
        }
        is_current
    }

    pub async fn subscribe(&self, session_id: &str, conn_no: u64, device_key: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) if session.conn_no == conn_no => {
                session.devices.insert(device_key.to_string());
                true
            }
            _ => false,
        }
    }

    pub async fn unsubscribe(&self, session_id: &str, conn_no: u64, device_key: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) if session.conn_no == conn_no => session.devices.remove(device_key),
            _ => false,
        }
    }

    pub async fn send_to<T: Serialize>(&self, session_id: &str, event: &T) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                error!("Error serializing ws message: {}", e);
                return;
            }
        };
        let sessions = self.sessions.read().await;
        if let Some(session) = sessions.get(session_id) {
            if let Err(e) = session.tx.unbounded_send(Message::text(text)) {
                error!("Error sending ws message to {}: {}", session_id, e);
            }
        }
    }

    /// Pushes the event to every session subscribed to `device_key`.
    /// Returns how many sessions received it.
    pub async fn broadcast_device<T: Serialize>(&self, device_key: &str, event: &T) -> usize {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                error!("Error serializing ws message: {}", e);
                return 0;
            }
        };
        let sessions = self.sessions.read().await;
        let mut delivered = 0;
        for (session_id, session) in sessions.iter() {
            if !session.devices.contains(device_key) {
                continue;
            }
            match session.tx.unbounded_send(Message::text(text.clone())) {
                Ok(()) => delivered += 1,
                Err(e) => error!("Error sending ws message to {}: {}", session_id, e),
            }
        }
        delivered
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Devices the session follows, sorted.
    pub async fn subscriptions(&self, session_id: &str) -> Vec<String> {
        let sessions = self.sessions.read().await;
        let mut devices: Vec<String> = sessions
            .get(session_id)
            .map(|session| session.devices.iter().cloned().collect())
            .unwrap_or_default();
        devices.sort();
        devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_channel::mpsc::{unbounded, UnboundedReceiver};
    use serde_json::{json, Value};

    fn next_json(rx: &mut UnboundedReceiver<Message>) -> Option<Value> {
        match rx.try_next() {
            Ok(Some(msg)) => msg.to_str().ok().and_then(|s| serde_json::from_str(s).ok()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_only_subscribers() {
        let hub = Hub::new();
        let (tx_a, mut rx_a) = unbounded();
        let (tx_b, mut rx_b) = unbounded();
        let a = hub.join("a", 1, tx_a).await;
        hub.join("b", 2, tx_b).await;
        assert!(hub.subscribe("a", a, "IOT-1").await);

        let event = WsEvent {
            type_: "device_reading",
            device_id: Some("IOT-1"),
            data: json!({"flow_rate": 1.5}),
        };
        assert_eq!(hub.broadcast_device("IOT-1", &event).await, 1);

        let got = next_json(&mut rx_a).unwrap();
        assert_eq!(got["type"], "device_reading");
        assert_eq!(got["data"]["flow_rate"], 1.5);
        assert!(next_json(&mut rx_b).is_none());
    }

    #[tokio::test]
    async fn reconnect_replaces_and_stale_leave_is_ignored() {
        let hub = Hub::new();
        let (tx_old, mut rx_old) = unbounded();
        let (tx_new, _rx_new) = unbounded();
        let old = hub.join("s", 1, tx_old).await;
        let new = hub.join("s", 1, tx_new).await;
        assert_ne!(old, new);
        assert_eq!(hub.session_count().await, 1);

        // old writer sees its channel closed
        assert!(matches!(rx_old.try_next(), Ok(None)));

        assert!(!hub.leave("s", old).await);
        assert_eq!(hub.session_count().await, 1);
        assert!(hub.leave("s", new).await);
        assert_eq!(hub.session_count().await, 0);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let hub = Hub::new();
        let (tx, mut rx) = unbounded();
        let conn = hub.join("s", 7, tx).await;
        hub.subscribe("s", conn, "IOT-9").await;
        assert_eq!(hub.subscriptions("s").await, vec![String::from("IOT-9")]);
        assert!(hub.unsubscribe("s", conn, "IOT-9").await);
        let event = WsEvent {
            type_: "device_status",
            device_id: Some("IOT-9"),
            data: json!({"status": "offline"}),
        };
        assert_eq!(hub.broadcast_device("IOT-9", &event).await, 0);
        assert!(next_json(&mut rx).is_none());
        assert!(hub.subscriptions("s").await.is_empty());
    }
}
