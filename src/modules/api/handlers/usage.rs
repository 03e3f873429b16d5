use super::parse_bound;
use crate::{
    modules::api::{
        filters::AuthUser,
        models::UsageQuery,
        responder::{json_array_stream, respond},
    },
    shared::{
        db::{DBAccessManager, PageRequest, UsageFilter},
        errors::{AppError, ErrorMessage},
    },
};
use warp::{http::StatusCode, reply::Response, Rejection};

/// Holders of this permission see every customer's usage.
const STAFF_PERMISSION: &str = "customers.view";
const EXPORT_CHUNK: i64 = 500;

fn usage_filter(auth: &AuthUser, query: &UsageQuery) -> Result<UsageFilter, AppError> {
    let customer_id = match auth.customer_scope(STAFF_PERMISSION)? {
        Some(own) => Some(own),
        None => query.customer_id,
    };
    Ok(UsageFilter {
        customer_id,
        device_id: query.device_id,
        property_id: query.property_id,
        from: parse_bound(query.from.as_deref(), "from")?,
        to: parse_bound(query.to.as_deref(), "to")?,
        anomaly: query.anomaly,
    })
}

#[utoipa::path(
    get,
    path = "/api/water-usage",
    params(UsageQuery),
    responses(
        (status = 200, description = "Paginated water usage, newest first"),
        (status = 422, description = "Invalid date bound", body = ErrorMessage),
    )
)]
pub async fn list_usage(auth: AuthUser, query: UsageQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let filter = usage_filter(&auth, &query)?;
    respond(
        db.list_water_usage(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn usage_summary(auth: AuthUser, query: UsageQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let filter = usage_filter(&auth, &query)?;
    respond(db.usage_summary(&filter), StatusCode::OK)
}

pub async fn export_usage(auth: AuthUser, query: UsageQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let filter = usage_filter(&auth, &query)?;
    let mut rows = Vec::new();
    let mut after_id = 0;
    loop {
        let chunk = db.water_usage_after(&filter, after_id, EXPORT_CHUNK)?;
        let done = (chunk.len() as i64) < EXPORT_CHUNK;
        if let Some(last) = chunk.last() {
            after_id = last.id;
        }
        rows.extend(chunk);
        if done {
            break;
        }
    }
    log::debug!("Exporting {} water usage row(s)", rows.len());
    Ok(json_array_stream(rows))
}
