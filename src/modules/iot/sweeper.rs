use super::{
    hub::Hub,
    ingest::{new_alert, OFFLINE},
    publish_status,
};
use crate::shared::{
    config::IotConfig,
    db::{
        get_db_access_manager,
        models::{IotDevice, IotStatusChangeset},
        DBAccessManager, DbPool,
    },
    errors::AppError,
    utils::now,
};
use chrono::NaiveDateTime;
use serde_json::json;
use std::time::Duration;
use tokio::{task::JoinHandle, time::interval};

pub fn start_sweeper(pool: DbPool, hub: Hub, config: IotConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.sweep_interval_secs.max(1)));
        log::info!(
            "Offline sweeper running every {}s (offline after {}s)",
            config.sweep_interval_secs,
            config.offline_after_secs
        );
        loop {
            ticker.tick().await;
            match sweep_once(&pool, &hub, &config).await {
                Ok(0) => {}
                Ok(count) => log::info!("Offline sweep marked {} device(s) offline", count),
                Err(e) => log::error!("Offline sweep failed: {}", e),
            }
        }
    })
}

pub async fn sweep_once(pool: &DbPool, hub: &Hub, config: &IotConfig) -> Result<usize, AppError> {
    let offline = {
        let mut db = get_db_access_manager(pool.clone())?;
        let offline = mark_stale_offline(&mut db, config, now())?;
        let purged = db.purge_expired_tokens()?;
        if purged > 0 {
            log::debug!("Purged {} expired token(s)", purged);
        }
        offline
    };
    for device in &offline {
        publish_status(hub, device).await;
    }
    Ok(offline.len())
}

/// Marks modules silent since before `at - offline_after_secs` as offline and
/// alerts the customers of their meters. Returns the updated modules.
pub fn mark_stale_offline(
    db: &mut DBAccessManager,
    config: &IotConfig,
    at: NaiveDateTime,
) -> Result<Vec<IotDevice>, AppError> {
    let cutoff = at - chrono::Duration::seconds(config.offline_after_secs);
    let stale = db.stale_online_devices(cutoff)?;
    let mut updated = Vec::with_capacity(stale.len());
    for device in stale {
        let device = db.update_iot_status(
            device.id,
            IotStatusChangeset {
                connection_status: Some(OFFLINE.to_string()),
                ..Default::default()
            },
        )?;
        let meter = match device.device_id {
            Some(meter_id) => db.find_device_by_id(meter_id)?,
            None => None,
        };
        if let Some(meter) = meter {
            db.set_device_connection(meter.id, OFFLINE)?;
            if db.preferences_for(meter.customer_id)?.device_offline_alerts {
                let raised = db.raise_alert_once(new_alert(
                    Some(meter.customer_id),
                    Some(meter.id),
                    Some(device.id),
                    "device_offline",
                    "warning",
                    "Device offline",
                    &format!(
                        "Device {} has not reported for more than {} seconds.",
                        device.device_key, config.offline_after_secs
                    ),
                    json!({
                        "device_id": device.device_key,
                        "last_seen": device.last_data_at.or(device.last_heartbeat_at),
                    }),
                ))?;
                if raised.is_some() {
                    db.bump_alert_count(meter.id)?;
                }
            }
        }
        log::warn!("IoT device {} went offline", device.device_key);
        updated.push(device);
    }
    Ok(updated)
}
