use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, CreateDeviceBody, ListQuery, UpdateDeviceBody},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{DeviceChangeset, NewDevice},
            DBAccessManager, DeviceFilter, PageRequest,
        },
        errors::{AppError, ErrorMessage},
        utils::{generate_number, new_uuid, now},
    },
};
use warp::{http::StatusCode, reply::Response, Rejection};

pub async fn list_devices(_auth: AuthUser, query: ListQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let filter = DeviceFilter {
        customer_id: query.customer_id,
        property_id: query.property_id,
        status: non_empty(query.status),
        connection_status: non_empty(query.connection_status),
        device_type: non_empty(query.device_type),
        search: non_empty(query.search),
    };
    respond(
        db.list_devices(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

#[utoipa::path(
    get,
    path = "/api/devices/summary/stats",
    responses(
        (status = 200, description = "Meter counts by status, connection status and type"),
        (status = 403, description = "Missing devices.view", body = ErrorMessage),
    )
)]
pub async fn device_stats(_auth: AuthUser, query: ListQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(db.device_stats(query.customer_id), StatusCode::OK)
}

pub async fn get_device(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(found(db.find_device_by_uuid(&uuid)?, "Device"), StatusCode::OK)
}

pub async fn create_device(
    _auth: AuthUser,
    body: CreateDeviceBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let property = db
        .find_property_by_id(body.property_id)?
        .ok_or_else(|| AppError::field("property_id", "The selected property id is invalid."))?;

    let at = now();
    let device = db.create_device(NewDevice {
        uuid: new_uuid(),
        property_id: property.id,
        customer_id: property.customer_id,
        device_number: generate_number("DEV", 10),
        device_name: body.device_name.trim().to_string(),
        device_type: body.device_type,
        serial_number: body.serial_number.trim().to_string(),
        firmware_version: body.firmware_version,
        hardware_version: body.hardware_version,
        status: body.status.unwrap_or_else(|| String::from("active")),
        connection_status: String::from("offline"),
        health_score: body.health_score.unwrap_or(100),
        installed_at: body.installed_at,
        next_maintenance_at: body.next_maintenance_at,
        metadata: body.metadata.map(Json),
        created_at: at,
        updated_at: at,
    })?;
    respond_with(device, "Device created successfully", StatusCode::CREATED)
}

pub async fn update_device(
    uuid: String,
    _auth: AuthUser,
    body: UpdateDeviceBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let device = found(db.find_device_by_uuid(&uuid)?, "Device")?;

    // the owning customer always follows the property
    let (property_id, customer_id) = match body.property_id {
        Some(property_id) if property_id != device.property_id => {
            let property = db
                .find_property_by_id(property_id)?
                .ok_or_else(|| AppError::field("property_id", "The selected property id is invalid."))?;
            (Some(property.id), Some(property.customer_id))
        }
        _ => (None, None),
    };

    let updated = db.update_device(
        device.id,
        DeviceChangeset {
            property_id,
            customer_id,
            device_name: body.device_name,
            device_type: body.device_type,
            serial_number: body.serial_number,
            firmware_version: body.firmware_version,
            hardware_version: body.hardware_version,
            status: body.status,
            health_score: body.health_score,
            installed_at: body.installed_at,
            last_maintenance_at: body.last_maintenance_at,
            next_maintenance_at: body.next_maintenance_at,
            metadata: body.metadata.map(Json),
            updated_at: Some(now()),
        },
    )?;
    respond_with(updated, "Device updated successfully", StatusCode::OK)
}

pub async fn delete_device(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let device = found(db.find_device_by_uuid(&uuid)?, "Device")?;
    db.soft_delete_device(device.id)?;
    respond_message("Device deleted successfully")
}
