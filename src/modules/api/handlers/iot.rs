use super::{found, non_empty};
use crate::{
    modules::{
        api::{
            filters::{authenticate, token_from_headers, AuthUser},
            models::{validated, HeartbeatBody, HistoryQuery, ListQuery, ReadingBody, RegisterIotBody, UpdateIotBody},
            responder::{json_stream, respond_fields, respond_message, respond_with},
            ApiContext,
        },
        iot::{
            ingest::{apply_heartbeat, authenticate_device, ingest_reading, reading_payload, OFFLINE},
            publish_reading, publish_status,
            ws::{serve_session, valid_session_id, WsQuery, WsSession},
        },
    },
    shared::{
        db::{
            get_db_access_manager,
            json::Json,
            models::{IotDevice, IotDeviceChangeset, NewIotDevice},
            DBAccessManager, PageRequest,
        },
        errors::{AppError, ErrorMessage, ErrorType},
        security::{generate_secret, hash_password},
        utils::{new_uuid, now},
    },
};
use serde_json::{json, Value};
use warp::{http::StatusCode, reply::Response, ws::Ws, Rejection, Reply};

pub const MAX_HISTORY_HOURS: i64 = 168;
pub const DEFAULT_HISTORY_HOURS: i64 = 24;
const SECRET_LEN: usize = 32;

/// The module behind `device_key` when `scope` may see it. A module with no
/// meter belongs to no customer.
pub fn visible_iot_device(
    db: &mut DBAccessManager,
    scope: Option<i32>,
    device_key: &str,
) -> Result<IotDevice, AppError> {
    let device = found(db.find_iot_device_by_key(device_key)?, "IoT device")?;
    if let Some(customer_id) = scope {
        let owner = match device.device_id {
            Some(meter_id) => db.find_device_by_id(meter_id)?.map(|meter| meter.customer_id),
            None => None,
        };
        if owner != Some(customer_id) {
            return Err(AppError::not_found("IoT device"));
        }
    }
    Ok(device)
}

fn check_meter(db: &mut DBAccessManager, meter_id: Option<i32>) -> Result<(), AppError> {
    if let Some(meter_id) = meter_id {
        if db.find_device_by_id(meter_id)?.is_none() {
            return Err(AppError::field("meter_id", "The selected meter id is invalid."));
        }
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/iot/devices/register",
    request_body = RegisterIotBody,
    params(("X-Device-Secret" = Option<String>, Header, description = "Secret to install; generated when absent")),
    responses(
        (status = 201, description = "IoT device registered, secret returned once"),
        (status = 422, description = "Validation errors", body = ErrorMessage),
    )
)]
pub async fn register_device(
    _auth: AuthUser,
    body: RegisterIotBody,
    secret: Option<String>,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let device_key = body.device_id.trim().to_string();
    if db.find_iot_device_by_key(&device_key)?.is_some() {
        return Err(AppError::field("device_id", "The device id has already been taken.").into());
    }
    check_meter(&mut db, body.meter_id)?;

    let secret = secret
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| generate_secret(SECRET_LEN));
    let at = now();
    let device = db.create_iot_device(NewIotDevice {
        uuid: new_uuid(),
        device_key,
        device_id: body.meter_id,
        device_name: body.device_name.trim().to_string(),
        location: body.location,
        notes: body.notes,
        device_type: body.device_type.unwrap_or_else(|| String::from("water_meter")),
        secret_hash: hash_password(&secret)?,
        mac_address: body.mac_address,
        firmware_version: body.firmware_version.unwrap_or_else(|| String::from("1.0.0")),
        hardware_version: body.hardware_version.unwrap_or_else(|| String::from("1.0")),
        connection_type: String::from("wifi"),
        connection_status: OFFLINE.to_string(),
        created_at: at,
        updated_at: at,
    })?;
    log::info!("Registered IoT device {}", device.device_key);
    respond_with(
        json!({ "device": device, "secret": secret }),
        "IoT device registered successfully",
        StatusCode::CREATED,
    )
}

#[utoipa::path(
    get,
    path = "/api/iot/devices/list",
    params(ListQuery),
    responses((status = 200, description = "IoT devices visible to the caller"))
)]
pub async fn list_devices(auth: AuthUser, query: ListQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let scope = auth.customer_scope("devices.view")?;
    let page = db.list_iot_devices(scope, PageRequest::new(query.page, query.per_page))?;
    respond_fields(
        json!({
            "devices": page.data,
            "total": page.total,
            "current_page": page.current_page,
            "per_page": page.per_page,
            "last_page": page.last_page,
        }),
        StatusCode::OK,
    )
}

pub async fn update_device(
    device_key: String,
    _auth: AuthUser,
    body: UpdateIotBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let device = found(db.find_iot_device_by_key(&device_key)?, "IoT device")?;
    check_meter(&mut db, body.meter_id)?;
    let updated = db.update_iot_device(
        device.id,
        IotDeviceChangeset {
            device_id: body.meter_id,
            device_name: non_empty(body.device_name),
            location: body.location,
            notes: body.notes,
            device_type: body.device_type,
            mac_address: body.mac_address,
            firmware_version: body.firmware_version,
            hardware_version: body.hardware_version,
            configuration: body.configuration.map(Json),
            updated_at: Some(now()),
        },
    )?;
    respond_with(updated, "IoT device updated successfully", StatusCode::OK)
}

pub async fn delete_device(device_key: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let device = found(db.find_iot_device_by_key(&device_key)?, "IoT device")?;
    db.soft_delete_iot_device(device.id)?;
    respond_message("IoT device deleted successfully")
}

#[utoipa::path(
    post,
    path = "/api/iot/readings",
    request_body = ReadingBody,
    params(("X-Device-Secret" = String, Header, description = "Device secret")),
    responses(
        (status = 201, description = "Reading stored"),
        (status = 401, description = "Invalid device credentials", body = ErrorMessage),
        (status = 404, description = "IoT device not found", body = ErrorMessage),
    )
)]
pub async fn post_reading(
    body: ReadingBody,
    secret: Option<String>,
    ctx: ApiContext,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let device = authenticate_device(&mut db, &body.device_id, secret.as_deref().unwrap_or_default())?;
    let outcome = ingest_reading(&mut db, &ctx.configs.iot, &device, body.reading)?;
    drop(db);

    publish_reading(&ctx.hub, &outcome).await;
    respond_with(
        json!({
            "reading": outcome.reading,
            "usage": outcome.usage,
            "alerts": outcome.alerts,
        }),
        "Reading stored",
        StatusCode::CREATED,
    )
}

#[utoipa::path(
    post,
    path = "/api/iot/heartbeat",
    request_body = HeartbeatBody,
    params(("X-Device-Secret" = String, Header, description = "Device secret")),
    responses(
        (status = 200, description = "Heartbeat recorded"),
        (status = 401, description = "Invalid device credentials", body = ErrorMessage),
    )
)]
pub async fn post_heartbeat(
    body: HeartbeatBody,
    secret: Option<String>,
    ctx: ApiContext,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let device = authenticate_device(&mut db, &body.device_id, secret.as_deref().unwrap_or_default())?;
    let outcome = apply_heartbeat(&mut db, &device, body.heartbeat)?;
    drop(db);

    if outcome.status_changed {
        publish_status(&ctx.hub, &outcome.device).await;
    }
    respond_with(outcome.device, "Heartbeat recorded", StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/iot/metrics/realtime/{device_id}",
    params(("device_id" = String, Path, description = "IoT device key")),
    responses(
        (status = 200, description = "Latest metrics"),
        (status = 404, description = "IoT device not found", body = ErrorMessage),
    )
)]
pub async fn realtime_metrics(
    device_key: String,
    auth: AuthUser,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let scope = auth.customer_scope("devices.view")?;
    let device = visible_iot_device(&mut db, scope, &device_key)?;
    let metrics = db
        .latest_reading(device.id)?
        .map(|reading| reading_payload(&reading))
        .unwrap_or(Value::Null);
    respond_fields(
        json!({
            "device_id": device.device_key,
            "status": device.connection_status,
            "last_data_at": device.last_data_at,
            "metrics": metrics,
        }),
        StatusCode::OK,
    )
}

#[utoipa::path(
    get,
    path = "/api/iot/metrics/history/{device_id}",
    params(("device_id" = String, Path, description = "IoT device key"), HistoryQuery),
    responses(
        (status = 200, description = "Readings of the last N hours, oldest first"),
        (status = 422, description = "Hours out of range", body = ErrorMessage),
    )
)]
pub async fn history_metrics(
    device_key: String,
    auth: AuthUser,
    query: HistoryQuery,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let hours = query.hours.unwrap_or(DEFAULT_HISTORY_HOURS);
    if !(1..=MAX_HISTORY_HOURS).contains(&hours) {
        return Err(AppError::field("hours", "The hours must be between 1 and 168.").into());
    }
    let scope = auth.customer_scope("devices.view")?;
    let device = visible_iot_device(&mut db, scope, &device_key)?;
    let since = now() - chrono::Duration::hours(hours);
    let readings: Vec<Value> = db
        .readings_since(device.id, since)?
        .iter()
        .map(reading_payload)
        .collect();

    let key = serde_json::to_string(&device.device_key).map_err(|err| {
        AppError::new(
            &format!("Error serializing device key: {}", err),
            ErrorType::Internal,
        )
    })?;
    let prefix = format!(
        r#"{{"success":true,"device_id":{},"hours":{},"readings":["#,
        key, hours
    );
    Ok(json_stream(prefix, readings, "]}"))
}

/// `/iot/ws` without a session segment.
pub async fn ws_without_session() -> Result<Response, Rejection> {
    Err(AppError::new("Invalid session id", ErrorType::BadRequest).into())
}

/// Upgrades to the realtime session once the caller is authenticated by the
/// `token` query parameter, the session cookie or the bearer header.
pub async fn ws_upgrade(
    session_id: String,
    ws: Ws,
    raw_query: String,
    cookie_header: Option<String>,
    authorization: Option<String>,
    ctx: ApiContext,
) -> Result<Response, Rejection> {
    if !valid_session_id(&session_id) {
        return Err(AppError::new("Invalid session id", ErrorType::BadRequest).into());
    }
    let query: WsQuery = serde_qs::from_str(&raw_query).map_err(|err| {
        AppError::new(&format!("Invalid query string: {}", err), ErrorType::BadRequest)
    })?;
    let token = non_empty(query.token.clone())
        .or_else(|| {
            token_from_headers(
                cookie_header.as_deref(),
                authorization.as_deref(),
                &ctx.configs.auth.cookie_name,
            )
        })
        .ok_or_else(|| {
            log::warn!("WebSocket {} without credentials", session_id);
            AppError::unauthenticated()
        })?;

    let auth = {
        let mut db = get_db_access_manager(ctx.pool.clone())?;
        authenticate(&mut db, &ctx.configs.auth.jwt_secret, &token)?
    };
    let session = WsSession {
        session_id,
        user_id: auth.user.id,
        scope: auth.customer_scope("devices.view")?,
        hub: ctx.hub.clone(),
        pool: ctx.pool.clone(),
    };
    let devices = query.devices;
    Ok(ws
        .on_upgrade(move |socket| serve_session(socket, session, devices))
        .into_response())
}
