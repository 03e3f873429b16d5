use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{
            validated, AssignWorkOrderBody, CreateWorkOrderBody, UpdateWorkOrderBody, WorkOrderQuery,
            WorkOrderStatusBody,
        },
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{NewWorkOrder, WorkOrder, WorkOrderChangeset},
            DBAccessManager, PageRequest, WorkOrderFilter,
        },
        errors::{AppError, ErrorMessage, ErrorType},
        ticket_flow::minutes_between,
        utils::{generate_number, new_uuid, now},
        work_order_flow::{total_cost, WorkOrderStatus},
    },
};
use warp::{http::StatusCode, reply::Response, Rejection};

fn current_status(order: &WorkOrder) -> Result<WorkOrderStatus, AppError> {
    WorkOrderStatus::parse(&order.status).ok_or_else(|| {
        AppError::new(
            &format!("Work order {} has unknown status {}", order.work_order_number, order.status),
            ErrorType::Internal,
        )
    })
}

pub async fn list_work_orders(
    _auth: AuthUser,
    query: WorkOrderQuery,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let filter = WorkOrderFilter {
        customer_id: query.customer_id,
        device_id: query.device_id,
        assigned_to: query.assigned_to,
        status: non_empty(query.status),
        work_type: non_empty(query.work_type),
        priority: non_empty(query.priority),
    };
    respond(
        db.list_work_orders(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn get_work_order(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(found(db.find_work_order_by_uuid(&uuid)?, "Work order"), StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/work-orders",
    request_body = CreateWorkOrderBody,
    responses(
        (status = 201, description = "Work order created as pending"),
        (status = 422, description = "Unknown customer, property, meter or ticket", body = ErrorMessage),
    )
)]
pub async fn create_work_order(
    _auth: AuthUser,
    body: CreateWorkOrderBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let customer = db
        .find_customer_by_id(body.customer_id)?
        .ok_or_else(|| AppError::field("customer_id", "The selected customer id is invalid."))?;
    if let Some(property_id) = body.property_id {
        db.find_property_by_id(property_id)?
            .filter(|p| p.customer_id == customer.id)
            .ok_or_else(|| AppError::field("property_id", "The selected property id is invalid."))?;
    }
    if let Some(device_id) = body.device_id {
        db.find_device_by_id(device_id)?
            .filter(|d| d.customer_id == customer.id)
            .ok_or_else(|| AppError::field("device_id", "The selected device id is invalid."))?;
    }
    if let Some(ticket_id) = body.support_ticket_id {
        db.find_ticket_by_id(ticket_id)?
            .ok_or_else(|| AppError::field("support_ticket_id", "The selected support ticket id is invalid."))?;
    }

    let at = now();
    let order = db.create_work_order(NewWorkOrder {
        uuid: new_uuid(),
        work_order_number: generate_number("WO", 10),
        customer_id: customer.id,
        property_id: body.property_id,
        device_id: body.device_id,
        support_ticket_id: body.support_ticket_id,
        work_type: body.work_type,
        title: body.title.trim().to_string(),
        description: body.description,
        priority: body.priority.unwrap_or_else(|| String::from("medium")),
        status: WorkOrderStatus::Pending.as_str().to_string(),
        scheduled_at: body.scheduled_at,
        estimated_duration: body.estimated_duration,
        latitude: body.latitude,
        longitude: body.longitude,
        checklist: body.checklist.map(Json),
        metadata: body.metadata.map(Json),
        created_at: at,
        updated_at: at,
    })?;
    log::info!("Work order {} opened for customer {}", order.work_order_number, customer.id);
    respond_with(order, "Work order created successfully", StatusCode::CREATED)
}

pub async fn update_work_order(
    uuid: String,
    _auth: AuthUser,
    body: UpdateWorkOrderBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let order = found(db.find_work_order_by_uuid(&uuid)?, "Work order")?;
    if current_status(&order)?.is_terminal() {
        return Err(AppError::new("Completed or cancelled work orders cannot be edited.", ErrorType::Validation).into());
    }
    let updated = db.update_work_order(
        order.id,
        WorkOrderChangeset {
            work_type: body.work_type,
            title: body.title,
            description: body.description,
            priority: body.priority,
            scheduled_at: body.scheduled_at,
            estimated_duration: body.estimated_duration,
            latitude: body.latitude,
            longitude: body.longitude,
            checklist: body.checklist.map(Json),
            metadata: body.metadata.map(Json),
            ..Default::default()
        },
    )?;
    respond_with(updated, "Work order updated successfully", StatusCode::OK)
}

pub async fn assign_work_order(
    uuid: String,
    _auth: AuthUser,
    body: AssignWorkOrderBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let order = found(db.find_work_order_by_uuid(&uuid)?, "Work order")?;
    if current_status(&order)?.is_terminal() {
        return Err(AppError::new("Completed or cancelled work orders cannot be assigned.", ErrorType::Validation).into());
    }
    let assignee = db
        .find_user_by_id(body.assigned_to)?
        .ok_or_else(|| AppError::field("assigned_to", "The selected assigned to is invalid."))?;

    let mut changes = WorkOrderChangeset {
        assigned_to: Some(assignee.id),
        ..Default::default()
    };
    if order.status == WorkOrderStatus::Pending.as_str() {
        changes.status = Some(WorkOrderStatus::Assigned.as_str().to_string());
    }
    let updated = db.update_work_order(order.id, changes)?;
    respond_with(updated, "Work order assigned successfully", StatusCode::OK)
}

#[utoipa::path(
    patch,
    path = "/api/work-orders/{uuid}/status",
    request_body = WorkOrderStatusBody,
    params(("uuid" = String, Path, description = "Work order UUID")),
    responses(
        (status = 200, description = "Status changed"),
        (status = 422, description = "Transition not allowed", body = ErrorMessage),
    )
)]
pub async fn update_work_order_status(
    uuid: String,
    _auth: AuthUser,
    body: WorkOrderStatusBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let next = WorkOrderStatus::parse(body.status.trim())
        .ok_or_else(|| AppError::field("status", "The selected status is invalid."))?;
    let order = found(db.find_work_order_by_uuid(&uuid)?, "Work order")?;
    let current = current_status(&order)?;
    if current == next {
        return Err(AppError::field("status", &format!("The work order is already {}.", next.as_str())).into());
    }
    if !current.can_transition_to(next) {
        return Err(AppError::field(
            "status",
            &format!("The work order is {} and cannot move to {}.", current.as_str(), next.as_str()),
        )
        .into());
    }

    let at = now();
    let mut changes = WorkOrderChangeset {
        status: Some(next.as_str().to_string()),
        ..Default::default()
    };
    match next {
        WorkOrderStatus::InProgress if order.started_at.is_none() => changes.started_at = Some(at),
        WorkOrderStatus::Completed => {
            let labor = body.labor_cost.or(order.labor_cost);
            let parts = body.parts_cost.or(order.parts_cost);
            changes.completed_at = Some(at);
            changes.actual_duration = order.started_at.map(|started| minutes_between(started, at));
            changes.work_summary = non_empty(body.work_summary);
            changes.parts_used = non_empty(body.parts_used);
            changes.labor_cost = labor;
            changes.parts_cost = parts;
            changes.total_cost = total_cost(labor, parts);
        }
        _ => {}
    }
    let updated = db.update_work_order(order.id, changes)?;
    log::info!(
        "Work order {} moved from {} to {}",
        updated.work_order_number,
        current.as_str(),
        next.as_str()
    );
    respond_with(updated, "Work order status updated successfully", StatusCode::OK)
}

pub async fn delete_work_order(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let order = found(db.find_work_order_by_uuid(&uuid)?, "Work order")?;
    db.soft_delete_work_order(order.id)?;
    respond_message("Work order deleted successfully")
}
