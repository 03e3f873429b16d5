use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, LeakEventQuery, UpdateLeakEventBody},
        responder::{respond, respond_with},
    },
    shared::{
        db::{models::LeakEventChangeset, DBAccessManager, LeakEventFilter, PageRequest},
        utils::now,
    },
};
use warp::{http::StatusCode, reply::Response, Rejection};

/// Statuses that close a leak for good.
const CLOSING_STATUSES: &[&str] = &["resolved", "false_positive"];

pub async fn list_leak_events(
    _auth: AuthUser,
    query: LeakEventQuery,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let filter = LeakEventFilter {
        customer_id: query.customer_id,
        device_id: query.device_id,
        status: non_empty(query.status),
        severity: non_empty(query.severity),
    };
    respond(
        db.list_leak_events(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn update_leak_event(
    uuid: String,
    _auth: AuthUser,
    body: UpdateLeakEventBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let event = found(db.find_leak_event_by_uuid(&uuid)?, "Leak event")?;
    let closing = CLOSING_STATUSES.contains(&body.status.as_str()) && event.resolved_at.is_none();
    let updated = db.update_leak_event(
        event.id,
        LeakEventChangeset {
            status: Some(body.status),
            notes: non_empty(body.notes),
            estimated_loss: body.estimated_loss,
            estimated_cost: body.estimated_cost,
            resolved_at: closing.then(now),
            updated_at: None,
        },
    )?;
    respond_with(updated, "Leak event updated successfully", StatusCode::OK)
}
