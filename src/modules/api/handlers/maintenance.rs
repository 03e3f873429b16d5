use super::{found, non_empty, parse_bound};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, CreateMaintenanceBody, MaintenanceQuery, UpdateMaintenanceBody},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{DeviceChangeset, MaintenanceChangeset, NewMaintenanceSchedule},
            DBAccessManager, MaintenanceFilter, PageRequest,
        },
        errors::{AppError, ErrorMessage},
        utils::{new_uuid, now},
    },
};
use warp::{http::StatusCode, reply::Response, Rejection};

pub async fn list_maintenance(
    _auth: AuthUser,
    query: MaintenanceQuery,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let filter = MaintenanceFilter {
        customer_id: query.customer_id,
        device_id: query.device_id,
        assigned_to: query.assigned_to,
        status: non_empty(query.status),
        maintenance_type: non_empty(query.maintenance_type),
        from: parse_bound(query.from.as_deref(), "from")?,
        to: parse_bound(query.to.as_deref(), "to")?,
    };
    respond(
        db.list_maintenance(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn get_maintenance(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(found(db.find_maintenance_by_uuid(&uuid)?, "Maintenance schedule"), StatusCode::OK)
}

/// Scheduling also moves the meter's next maintenance date.
#[utoipa::path(
    post,
    path = "/api/maintenance-schedules",
    request_body = CreateMaintenanceBody,
    responses(
        (status = 201, description = "Maintenance scheduled"),
        (status = 422, description = "Unknown meter or assignee", body = ErrorMessage),
    )
)]
pub async fn create_maintenance(
    _auth: AuthUser,
    body: CreateMaintenanceBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let device = db
        .find_device_by_id(body.device_id)?
        .ok_or_else(|| AppError::field("device_id", "The selected device id is invalid."))?;
    if let Some(user_id) = body.assigned_to {
        db.find_user_by_id(user_id)?
            .ok_or_else(|| AppError::field("assigned_to", "The selected assigned to is invalid."))?;
    }

    let at = now();
    let scheduled_at = body.scheduled_at;
    let schedule = db.atomically(|db| {
        let schedule = db.create_maintenance(NewMaintenanceSchedule {
            uuid: new_uuid(),
            device_id: device.id,
            assigned_to: body.assigned_to,
            maintenance_type: body.maintenance_type,
            title: body.title.trim().to_string(),
            description: body.description,
            scheduled_at,
            status: String::from("scheduled"),
            priority: body.priority.unwrap_or_else(|| String::from("medium")),
            estimated_duration: body.estimated_duration,
            notes: body.notes,
            checklist: body.checklist.map(Json),
            metadata: body.metadata.map(Json),
            created_at: at,
            updated_at: at,
        })?;
        if device.next_maintenance_at.map_or(true, |next| scheduled_at < next || next < at) {
            db.update_device(
                device.id,
                DeviceChangeset {
                    next_maintenance_at: Some(scheduled_at),
                    ..Default::default()
                },
            )?;
        }
        Ok(schedule)
    })?;
    respond_with(schedule, "Maintenance scheduled successfully", StatusCode::CREATED)
}

/// Completing a schedule stamps the meter's last maintenance date.
pub async fn update_maintenance(
    uuid: String,
    _auth: AuthUser,
    body: UpdateMaintenanceBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let schedule = found(db.find_maintenance_by_uuid(&uuid)?, "Maintenance schedule")?;
    if let Some(user_id) = body.assigned_to {
        db.find_user_by_id(user_id)?
            .ok_or_else(|| AppError::field("assigned_to", "The selected assigned to is invalid."))?;
    }

    let at = now();
    let completing = body.status.as_deref() == Some("completed") && schedule.completed_at.is_none();
    let changes = MaintenanceChangeset {
        assigned_to: body.assigned_to,
        maintenance_type: body.maintenance_type,
        title: body.title,
        description: body.description,
        scheduled_at: body.scheduled_at,
        completed_at: completing.then_some(at),
        status: body.status,
        priority: body.priority,
        estimated_duration: body.estimated_duration,
        actual_duration: body.actual_duration,
        notes: body.notes,
        checklist: body.checklist.map(Json),
        metadata: body.metadata.map(Json),
        updated_at: None,
    };
    let updated = db.atomically(|db| {
        let updated = db.update_maintenance(schedule.id, changes)?;
        if completing {
            db.update_device(
                schedule.device_id,
                DeviceChangeset {
                    last_maintenance_at: Some(at),
                    ..Default::default()
                },
            )?;
        }
        Ok(updated)
    })?;
    respond_with(updated, "Maintenance schedule updated successfully", StatusCode::OK)
}

pub async fn delete_maintenance(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let schedule = found(db.find_maintenance_by_uuid(&uuid)?, "Maintenance schedule")?;
    db.soft_delete_maintenance(schedule.id)?;
    respond_message("Maintenance schedule deleted successfully")
}
