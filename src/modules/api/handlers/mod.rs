pub mod activities;
pub mod alerts;
pub mod auth;
pub mod customers;
pub mod devices;
pub mod health;
pub mod iot;
pub mod leaks;
pub mod maintenance;
pub mod payments;
pub mod pricing;
pub mod properties;
pub mod rbac;
pub mod tickets;
pub mod tips;
pub mod usage;
pub mod vouchers;
pub mod work_orders;

use super::filters::ClientInfo;
use crate::shared::{
    db::{json::Json, models::NewActivity, DBAccessManager},
    errors::AppError,
    utils::{new_uuid, now, parse_datetime},
};
use chrono::NaiveDateTime;
use serde_json::Value;

pub(crate) struct ActivityEntry<'a> {
    pub user_id: Option<i32>,
    pub subject_type: &'a str,
    pub subject_id: i32,
    pub activity_type: &'a str,
    pub action: &'a str,
    pub description: String,
    pub properties: Option<Value>,
}

/// Activity rows never fail the request that triggered them.
pub(crate) fn record_activity(db: &mut DBAccessManager, entry: ActivityEntry<'_>, client: &ClientInfo) {
    let at = now();
    let activity = NewActivity {
        uuid: new_uuid(),
        user_id: entry.user_id,
        subject_type: entry.subject_type.to_string(),
        subject_id: i64::from(entry.subject_id),
        activity_type: entry.activity_type.to_string(),
        action: entry.action.to_string(),
        description: Some(entry.description),
        properties: entry.properties.map(Json),
        ip_address: client.ip.clone(),
        user_agent: client.user_agent.clone(),
        created_at: at,
        updated_at: at,
    };
    if let Err(e) = db.log_activity(activity) {
        log::error!("Could not record {} activity: {}", entry.activity_type, e);
    }
}

pub(crate) fn found<T>(row: Option<T>, what: &str) -> Result<T, AppError> {
    row.ok_or_else(|| AppError::not_found(what))
}

/// An empty or blank text filter means no filter.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Optional date bound of a query string.
pub(crate) fn parse_bound(value: Option<&str>, field: &str) -> Result<Option<NaiveDateTime>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_datetime(raw)
            .map(Some)
            .ok_or_else(|| AppError::field(field, &format!("The {} is not a valid date.", field))),
    }
}
