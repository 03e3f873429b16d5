use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{
            validated, AssignTicketBody, AttachmentBody, CreateTicketBody, RatingBody, TicketMessageBody,
            TicketQuery, TicketStatusBody,
        },
        responder::{respond, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{
                NewSupportTicket, NewTicketAttachment, NewTicketMessage, SupportTicket, TicketAttachment,
                TicketChangeset, TicketMessage,
            },
            DBAccessManager, PageRequest, TicketFilter,
        },
        errors::{AppError, ErrorMessage, ErrorType},
        ticket_flow::{minutes_between, TicketStatus},
        utils::{generate_number, new_uuid, now},
    },
};
use serde::Serialize;
use warp::{http::StatusCode, reply::Response, Rejection};

/// Holders see every ticket and write internal notes.
const STAFF_PERMISSION: &str = "tickets.resolve";

#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: SupportTicket,
    pub messages: Vec<TicketMessage>,
    pub attachments: Vec<TicketAttachment>,
}

fn is_staff(auth: &AuthUser) -> bool {
    auth.can(STAFF_PERMISSION) || auth.can("tickets.assign")
}

fn ticket_scope(auth: &AuthUser) -> Result<Option<i32>, AppError> {
    if is_staff(auth) {
        return Ok(None);
    }
    auth.customer_scope(STAFF_PERMISSION)
}

fn visible_ticket(db: &mut DBAccessManager, auth: &AuthUser, uuid: &str) -> Result<SupportTicket, AppError> {
    let scope = ticket_scope(auth)?;
    let ticket = found(db.find_ticket_by_uuid(uuid)?, "Ticket")?;
    if scope.is_some_and(|own| own != ticket.customer_id) {
        return Err(AppError::not_found("Ticket"));
    }
    Ok(ticket)
}

fn current_status(ticket: &SupportTicket) -> Result<TicketStatus, AppError> {
    TicketStatus::parse(&ticket.status).ok_or_else(|| {
        AppError::new(
            &format!("Ticket {} has unknown status {}", ticket.ticket_number, ticket.status),
            ErrorType::Internal,
        )
    })
}

pub async fn list_tickets(auth: AuthUser, query: TicketQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let customer_id = match ticket_scope(&auth)? {
        Some(own) => Some(own),
        None => query.customer_id,
    };
    let filter = TicketFilter {
        customer_id,
        assigned_to: query.assigned_to,
        status: non_empty(query.status),
        category: non_empty(query.category),
        priority: non_empty(query.priority),
    };
    respond(
        db.list_tickets(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = CreateTicketBody,
    responses(
        (status = 201, description = "Ticket opened"),
        (status = 422, description = "Validation errors", body = ErrorMessage),
    )
)]
pub async fn create_ticket(auth: AuthUser, body: CreateTicketBody, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let customer_id = match (auth.customer_id(), body.customer_id) {
        (Some(own), _) if !is_staff(&auth) => own,
        (_, Some(customer_id)) => {
            db.find_customer_by_id(customer_id)?
                .ok_or_else(|| AppError::field("customer_id", "The selected customer id is invalid."))?
                .id
        }
        (Some(own), None) => own,
        (None, None) => return Err(AppError::field("customer_id", "The customer id field is required.").into()),
    };

    let at = now();
    let ticket = db.create_ticket(NewSupportTicket {
        uuid: new_uuid(),
        ticket_number: generate_number("TKT", 8),
        customer_id,
        user_id: Some(auth.user.id),
        category: body.category,
        priority: body.priority.unwrap_or_else(|| String::from("medium")),
        status: TicketStatus::Open.as_str().to_string(),
        subject: body.subject.trim().to_string(),
        description: body.description,
        opened_at: at,
        metadata: None,
        created_at: at,
        updated_at: at,
    })?;
    log::info!("Ticket {} opened by user {}", ticket.ticket_number, auth.user.id);
    respond_with(ticket, "Ticket created successfully", StatusCode::CREATED)
}

pub async fn get_ticket(uuid: String, auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let ticket = visible_ticket(&mut db, &auth, &uuid)?;
    let messages = db.ticket_messages(ticket.id, is_staff(&auth))?;
    let attachments = db.ticket_attachments(ticket.id)?;
    respond(
        Ok(TicketDetail {
            ticket,
            messages,
            attachments,
        }),
        StatusCode::OK,
    )
}

#[utoipa::path(
    patch,
    path = "/api/tickets/{uuid}/status",
    request_body = TicketStatusBody,
    params(("uuid" = String, Path, description = "Ticket UUID")),
    responses(
        (status = 200, description = "Status changed"),
        (status = 422, description = "Transition not allowed", body = ErrorMessage),
    )
)]
pub async fn update_status(
    uuid: String,
    auth: AuthUser,
    body: TicketStatusBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let next = TicketStatus::parse(body.status.trim())
        .ok_or_else(|| AppError::field("status", "The selected status is invalid."))?;
    let ticket = visible_ticket(&mut db, &auth, &uuid)?;
    let current = current_status(&ticket)?;
    if current == next {
        return Err(AppError::field("status", &format!("The ticket is already {}.", next.as_str())).into());
    }
    if !current.can_transition_to(next) {
        return Err(AppError::field(
            "status",
            &format!("A {} ticket cannot move to {}.", current.as_str(), next.as_str()),
        )
        .into());
    }

    let at = now();
    let notes = non_empty(body.notes);
    let mut changes = TicketChangeset {
        status: Some(next.as_str().to_string()),
        ..Default::default()
    };
    match next {
        TicketStatus::Resolved => {
            changes.resolved_at = Some(at);
            changes.resolution_time = Some(minutes_between(ticket.opened_at, at));
            changes.resolution_notes = notes.clone();
        }
        TicketStatus::Closed => changes.closed_at = Some(at),
        _ => {}
    }

    let user_id = auth.user.id;
    let updated = db.atomically(|db| {
        let updated = db.update_ticket(ticket.id, changes)?;
        if let Some(notes) = notes {
            db.add_ticket_message(NewTicketMessage {
                uuid: new_uuid(),
                ticket_id: ticket.id,
                user_id,
                message: notes,
                message_type: String::from("system"),
                is_internal: false,
                created_at: at,
                updated_at: at,
            })?;
        }
        Ok(updated)
    })?;
    log::info!(
        "Ticket {} moved from {} to {}",
        updated.ticket_number,
        current.as_str(),
        next.as_str()
    );
    respond_with(updated, "Ticket status updated successfully", StatusCode::OK)
}

pub async fn assign_ticket(
    uuid: String,
    auth: AuthUser,
    body: AssignTicketBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let ticket = visible_ticket(&mut db, &auth, &uuid)?;
    if current_status(&ticket)?.is_terminal() {
        return Err(AppError::new("Closed or cancelled tickets cannot be assigned.", ErrorType::Validation).into());
    }
    let assignee = db
        .find_user_by_id(body.assigned_to)?
        .ok_or_else(|| AppError::field("assigned_to", "The selected assigned to is invalid."))?;

    let mut changes = TicketChangeset {
        assigned_to: Some(assignee.id),
        assigned_at: Some(now()),
        ..Default::default()
    };
    if ticket.status == TicketStatus::Open.as_str() {
        changes.status = Some(TicketStatus::InProgress.as_str().to_string());
    }
    let updated = db.update_ticket(ticket.id, changes)?;
    respond_with(updated, "Ticket assigned successfully", StatusCode::OK)
}

pub async fn add_message(
    uuid: String,
    auth: AuthUser,
    body: TicketMessageBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let ticket = visible_ticket(&mut db, &auth, &uuid)?;
    if current_status(&ticket)?.is_terminal() {
        return Err(AppError::new("Closed or cancelled tickets take no new messages.", ErrorType::Validation).into());
    }

    let staff = is_staff(&auth);
    let at = now();
    let user_id = auth.user.id;
    let message = db.atomically(|db| {
        let message = db.add_ticket_message(NewTicketMessage {
            uuid: new_uuid(),
            ticket_id: ticket.id,
            user_id,
            message: body.message,
            message_type: String::from(if staff { "staff" } else { "customer" }),
            is_internal: staff && body.is_internal,
            created_at: at,
            updated_at: at,
        })?;
        if staff && ticket.response_time.is_none() && ticket.user_id != Some(user_id) {
            db.update_ticket(
                ticket.id,
                TicketChangeset {
                    response_time: Some(minutes_between(ticket.opened_at, at)),
                    ..Default::default()
                },
            )?;
        }
        Ok(message)
    })?;
    respond_with(message, "Message added successfully", StatusCode::CREATED)
}

pub async fn add_attachment(
    uuid: String,
    auth: AuthUser,
    body: AttachmentBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let ticket = visible_ticket(&mut db, &auth, &uuid)?;
    let at = now();
    let attachment = db.add_ticket_attachment(NewTicketAttachment {
        uuid: new_uuid(),
        ticket_id: ticket.id,
        uploaded_by: auth.user.id,
        file_name: body.file_name.trim().to_string(),
        file_path: body.file_path,
        file_type: body.file_type,
        file_size: body.file_size,
        latitude: body.latitude,
        longitude: body.longitude,
        captured_at: body.captured_at,
        metadata: body.metadata.map(Json),
        created_at: at,
        updated_at: at,
    })?;
    respond_with(attachment, "Attachment added successfully", StatusCode::CREATED)
}

pub async fn rate_ticket(
    uuid: String,
    auth: AuthUser,
    body: RatingBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let ticket = found(db.find_ticket_by_uuid(&uuid)?, "Ticket")?;
    if auth.customer_id() != Some(ticket.customer_id) {
        return Err(AppError::new("Only the ticket's customer can rate it", ErrorType::Forbidden).into());
    }
    if !matches!(current_status(&ticket)?, TicketStatus::Resolved | TicketStatus::Closed) {
        return Err(AppError::new("Only resolved or closed tickets can be rated.", ErrorType::Validation).into());
    }
    let updated = db.update_ticket(
        ticket.id,
        TicketChangeset {
            customer_rating: Some(body.rating),
            customer_feedback: non_empty(body.feedback),
            ..Default::default()
        },
    )?;
    respond_with(updated, "Thank you for your feedback", StatusCode::OK)
}
