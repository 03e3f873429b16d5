//! Reading and heartbeat ingestion shared by the HTTP endpoints and the
//! MQTT bridge. Everything here is synchronous database work; callers push
//! the resulting events to the hub afterwards.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::shared::{
    billing::{marginal_cost, PriceRange, PricingModel},
    config::IotConfig,
    db::{
        json::Json,
        models::{
            Alert, Device, IotDevice, IotReading, IotStatusChangeset, NewAlert, NewIotReading,
            NewLeakDetectionEvent, NewWaterUsage, WaterUsage,
        },
        DBAccessManager,
    },
    errors::{AppError, ErrorType},
    security::verify_password,
    utils::{deserialize_optional_datetime, new_uuid, now, round2},
};

pub const ONLINE: &str = "online";
pub const OFFLINE: &str = "offline";

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ReadingInput {
    pub flow_rate: Option<f64>,
    pub total_volume: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub water_quality: Option<f64>,
    pub valve_status: Option<i32>,
    pub battery_level: Option<i32>,
    pub signal_strength: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub timestamp: Option<NaiveDateTime>,
    #[schema(value_type = Option<Object>)]
    pub raw_data: Option<Value>,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct HeartbeatInput {
    pub battery_level: Option<i32>,
    pub signal_strength: Option<i32>,
    pub uptime: Option<i64>,
    pub firmware_version: Option<String>,
    pub ip_address: Option<String>,
    #[serde(default)]
    pub rebooted: bool,
}

#[derive(Debug)]
pub struct IngestOutcome {
    pub device: IotDevice,
    pub reading: IotReading,
    pub usage: Option<WaterUsage>,
    pub alerts: Vec<Alert>,
    pub status_changed: bool,
}

#[derive(Debug)]
pub struct HeartbeatOutcome {
    pub device: IotDevice,
    pub status_changed: bool,
}

/// Looks the module up by key and checks its secret.
pub fn authenticate_device(
    db: &mut DBAccessManager,
    device_key: &str,
    secret: &str,
) -> Result<IotDevice, AppError> {
    let device = db
        .find_iot_device_by_key(device_key)?
        .ok_or_else(|| AppError::not_found("IoT device"))?;
    if secret.is_empty() || !verify_password(secret, &device.secret_hash) {
        log::warn!("Rejected credentials for IoT device {}", device_key);
        return Err(AppError::new(
            "Invalid device credentials",
            ErrorType::AuthError,
        ));
    }
    Ok(device)
}

pub fn ingest_reading(
    db: &mut DBAccessManager,
    config: &IotConfig,
    device: &IotDevice,
    input: ReadingInput,
) -> Result<IngestOutcome, AppError> {
    db.atomically(|db| {
        let at = now();
        let reading_at = input.timestamp.unwrap_or(at);

        let reading = db.insert_reading(NewIotReading {
            iot_device_id: device.id,
            device_id: device.device_id,
            flow_rate: input.flow_rate,
            total_volume: input.total_volume,
            pressure: input.pressure,
            temperature: input.temperature,
            water_quality: input.water_quality,
            valve_status: input.valve_status,
            battery_level: input.battery_level,
            signal_strength: input.signal_strength,
            raw_data: input.raw_data.clone().map(Json),
            reading_timestamp: reading_at,
            created_at: at,
            updated_at: at,
        })?;

        let updated = db.update_iot_status(
            device.id,
            IotStatusChangeset {
                connection_status: Some(ONLINE.to_string()),
                battery_level: input.battery_level,
                signal_strength: input.signal_strength,
                last_data_at: Some(at),
                ..Default::default()
            },
        )?;

        let meter = match device.device_id {
            Some(meter_id) => db.find_device_by_id(meter_id)?,
            None => None,
        };

        let mut alerts = Vec::new();
        let mut usage = None;
        if let (Some(meter), Some(total_volume)) = (meter.as_ref(), input.total_volume) {
            let (stored, low_balance) = meter_usage(db, config, meter, total_volume, reading_at)?;
            usage = stored;
            alerts.extend(low_balance);
        }

        if let Some(flow_rate) = input.flow_rate.filter(|f| *f > config.leak_flow_threshold) {
            if let Some(alert) = raise_leak_alert(db, device, meter.as_ref(), flow_rate, config.leak_flow_threshold)? {
                alerts.push(alert);
            }
        }

        Ok(IngestOutcome {
            status_changed: device.connection_status != ONLINE,
            device: updated,
            reading,
            usage,
            alerts,
        })
    })
}

pub fn apply_heartbeat(
    db: &mut DBAccessManager,
    device: &IotDevice,
    input: HeartbeatInput,
) -> Result<HeartbeatOutcome, AppError> {
    let at = now();
    if input.rebooted {
        db.bump_reboot_count(device.id)?;
    }
    let updated = db.update_iot_status(
        device.id,
        IotStatusChangeset {
            connection_status: Some(ONLINE.to_string()),
            battery_level: input.battery_level,
            signal_strength: input.signal_strength,
            uptime: input.uptime,
            firmware_version: input.firmware_version,
            ip_address: input.ip_address,
            last_heartbeat_at: Some(at),
            ..Default::default()
        },
    )?;
    if let Some(meter_id) = device.device_id {
        db.set_device_connection(meter_id, ONLINE)?;
    }
    Ok(HeartbeatOutcome {
        status_changed: device.connection_status != ONLINE,
        device: updated,
    })
}

/// Bills the volume the meter moved since its previous reading.
fn meter_usage(
    db: &mut DBAccessManager,
    config: &IotConfig,
    meter: &Device,
    total_volume: f64,
    reading_at: NaiveDateTime,
) -> Result<(Option<WaterUsage>, Option<Alert>), AppError> {
    db.record_meter_reading(meter.id, total_volume, reading_at)?;

    // first reading only sets the baseline
    let previous = match meter.last_reading_value {
        Some(previous) => previous,
        None => return Ok((None, None)),
    };
    let delta = total_volume - previous;
    if delta == 0.0 {
        return Ok((None, None));
    }

    let at = now();
    let mut usage = NewWaterUsage {
        uuid: new_uuid(),
        device_id: meter.id,
        customer_id: meter.customer_id,
        property_id: meter.property_id,
        consumption: 0.0,
        cost: 0.0,
        rate_per_unit: 0.0,
        reading_date: reading_at,
        previous_reading_date: meter.last_reading_at,
        previous_reading: Some(previous),
        current_reading: total_volume,
        is_anomaly: false,
        anomaly_type: None,
        notes: None,
        created_at: at,
        updated_at: at,
    };

    if delta < 0.0 {
        usage.is_anomaly = true;
        usage.anomaly_type = Some(String::from("meter_rollback"));
        usage.notes = Some(format!(
            "Meter reading dropped from {} to {}",
            previous, total_volume
        ));
        log::warn!("Meter {} rolled back ({} -> {})", meter.device_number, previous, total_volume);
        return Ok((Some(db.insert_water_usage(usage)?), None));
    }

    let cost = price_volume(db, config, meter, delta, reading_at)?;
    usage.consumption = delta;
    usage.cost = cost;
    usage.rate_per_unit = round2(cost / delta);
    let stored = db.insert_water_usage(usage)?;

    let customer = db.adjust_balance(meter.customer_id, -cost)?;
    let threshold = db.preferences_for(customer.id)?.low_balance_threshold;
    let alert = if customer.balance < threshold {
        db.raise_alert_once(new_alert(
            Some(customer.id),
            None,
            None,
            "low_balance",
            "warning",
            "Low balance",
            &format!(
                "Your balance of {:.2} is below {:.2}. Please top up.",
                customer.balance, threshold
            ),
            json!({ "balance": customer.balance, "threshold": threshold }),
        ))?
    } else {
        None
    };
    Ok((Some(stored), alert))
}

/// Marginal cost of `delta` at the property's tier given this month's volume.
fn price_volume(
    db: &mut DBAccessManager,
    config: &IotConfig,
    meter: &Device,
    delta: f64,
    reading_at: NaiveDateTime,
) -> Result<f64, AppError> {
    let property_type = db
        .find_property_by_id(meter.property_id)?
        .map(|property| property.property_type);
    let tier = match property_type {
        Some(property_type) => db.active_tier_for(&property_type)?,
        None => None,
    };
    let tier = match tier {
        Some(tier) => tier,
        None => return Ok(round2(delta * config.default_rate_per_unit)),
    };

    let model = PricingModel::parse(&tier.pricing_model).unwrap_or(PricingModel::Tiered);
    let ranges: Vec<PriceRange> =
        serde_json::from_value(tier.price_ranges.0.clone()).map_err(|err| {
            AppError::new(
                &format!("Pricing tier {} has invalid ranges: {}", tier.uuid, err),
                ErrorType::Internal,
            )
        })?;
    let billed = db.month_to_date_consumption(meter.id, month_start(reading_at))?;
    Ok(marginal_cost(model, &ranges, billed, delta))
}

fn raise_leak_alert(
    db: &mut DBAccessManager,
    device: &IotDevice,
    meter: Option<&Device>,
    flow_rate: f64,
    threshold: f64,
) -> Result<Option<Alert>, AppError> {
    let customer_id = meter.map(|m| m.customer_id);
    if let Some(customer_id) = customer_id {
        if !db.preferences_for(customer_id)?.leak_alerts {
            return Ok(None);
        }
    }
    let alert = db.raise_alert_once(new_alert(
        customer_id,
        meter.map(|m| m.id),
        Some(device.id),
        "leak_detected",
        "critical",
        "Possible leak detected",
        &format!(
            "Device {} reports a flow rate of {:.2}, above the leak threshold.",
            device.device_key, flow_rate
        ),
        json!({ "flow_rate": flow_rate, "device_id": device.device_key }),
    ))?;
    if let (Some(alert), Some(meter)) = (&alert, meter) {
        db.bump_alert_count(meter.id)?;
        let at = now();
        db.record_leak_event(NewLeakDetectionEvent {
            uuid: new_uuid(),
            device_id: meter.id,
            customer_id: meter.customer_id,
            alert_id: Some(alert.id),
            leak_type: String::from("continuous_flow"),
            severity: leak_severity(flow_rate, threshold).to_string(),
            detected_flow_rate: flow_rate,
            normal_flow_rate: threshold,
            detected_at: at,
            status: String::from("detected"),
            detection_data: Some(Json(json!({ "device_id": device.device_key, "threshold": threshold }))),
            created_at: at,
            updated_at: at,
        })?;
    }
    Ok(alert)
}

/// Grades a leak by how far the flow overshoots the threshold.
fn leak_severity(flow_rate: f64, threshold: f64) -> &'static str {
    let ratio = if threshold > 0.0 { flow_rate / threshold } else { f64::INFINITY };
    if ratio >= 4.0 {
        "critical"
    } else if ratio >= 2.0 {
        "major"
    } else if ratio >= 1.5 {
        "moderate"
    } else {
        "minor"
    }
}

#[allow(clippy::too_many_arguments)]
pub fn new_alert(
    customer_id: Option<i32>,
    device_id: Option<i32>,
    iot_device_id: Option<i32>,
    alert_type: &str,
    severity: &str,
    title: &str,
    message: &str,
    action_data: Value,
) -> NewAlert {
    let at = now();
    NewAlert {
        uuid: new_uuid(),
        customer_id,
        device_id,
        iot_device_id,
        alert_type: alert_type.to_string(),
        severity: severity.to_string(),
        title: title.to_string(),
        message: message.to_string(),
        is_read: false,
        is_dismissed: false,
        status: String::from("active"),
        action_data: Some(Json(action_data)),
        created_at: at,
        updated_at: at,
    }
}

pub fn month_start(at: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(at.year(), at.month(), 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .unwrap_or(at)
}

/// `data` of a `device_reading` event.
pub fn reading_payload(reading: &IotReading) -> Value {
    json!({
        "flow_rate": reading.flow_rate,
        "total_volume": reading.total_volume,
        "temperature": reading.temperature,
        "pressure": reading.pressure,
        "water_quality": reading.water_quality,
        "battery_level": reading.battery_level,
        "signal_strength": reading.signal_strength,
        "valve_status": reading.valve_status,
        "timestamp": reading.reading_timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_start_is_first_day_at_midnight() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 17)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(
            month_start(at),
            NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn reading_input_accepts_string_timestamps() {
        let input: ReadingInput = serde_json::from_value(json!({
            "flow_rate": 2.5,
            "total_volume": 120.0,
            "timestamp": "2025-01-02 03:04:05"
        }))
        .unwrap();
        assert_eq!(input.flow_rate, Some(2.5));
        assert!(input.timestamp.is_some());

        let bare: ReadingInput = serde_json::from_value(json!({})).unwrap();
        assert!(bare.timestamp.is_none());
    }

    #[test]
    fn leak_severity_grows_with_overshoot() {
        assert_eq!(leak_severity(55.0, 50.0), "minor");
        assert_eq!(leak_severity(80.0, 50.0), "moderate");
        assert_eq!(leak_severity(100.0, 50.0), "major");
        assert_eq!(leak_severity(250.0, 50.0), "critical");
        assert_eq!(leak_severity(1.0, 0.0), "critical");
    }
}
