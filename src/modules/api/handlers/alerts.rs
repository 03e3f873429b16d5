use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, AlertQuery, PreferencesBody},
        responder::{respond, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{Alert, AlertPreferenceChangeset},
            AlertFilter, DBAccessManager, PageRequest,
        },
        errors::{AppError, ErrorMessage, ErrorType},
    },
};
use warp::{http::StatusCode, reply::Response, Rejection};

/// Holders see the alerts of every customer.
const STAFF_PERMISSION: &str = "devices.view";

fn visible_alert(db: &mut DBAccessManager, auth: &AuthUser, uuid: &str) -> Result<Alert, AppError> {
    let scope = auth.customer_scope(STAFF_PERMISSION)?;
    let alert = found(db.find_alert_by_uuid(uuid)?, "Alert")?;
    if let Some(own) = scope {
        if alert.customer_id != Some(own) {
            return Err(AppError::not_found("Alert"));
        }
    }
    Ok(alert)
}

fn own_customer(auth: &AuthUser) -> Result<i32, AppError> {
    auth.customer_id()
        .ok_or_else(|| AppError::new("No customer record is linked to this account", ErrorType::Forbidden))
}

#[utoipa::path(
    get,
    path = "/api/alerts",
    params(AlertQuery),
    responses((status = 200, description = "Alerts, newest first"))
)]
pub async fn list_alerts(auth: AuthUser, query: AlertQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let filter = AlertFilter {
        customer_id: auth.customer_scope(STAFF_PERMISSION)?,
        unread_only: query.unread.unwrap_or(false),
        status: non_empty(query.status),
        alert_type: non_empty(query.alert_type),
    };
    respond(
        db.list_alerts(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn mark_read(uuid: String, auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let alert = visible_alert(&mut db, &auth, &uuid)?;
    respond_with(db.mark_alert_read(alert.id)?, "Alert marked as read", StatusCode::OK)
}

pub async fn dismiss(uuid: String, auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let alert = visible_alert(&mut db, &auth, &uuid)?;
    respond_with(db.dismiss_alert(alert.id)?, "Alert dismissed", StatusCode::OK)
}

pub async fn get_preferences(auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let customer_id = own_customer(&auth)?;
    respond(db.preferences_for(customer_id), StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/api/alerts/preferences",
    request_body = PreferencesBody,
    responses(
        (status = 200, description = "Updated preferences"),
        (status = 403, description = "Caller has no customer record", body = ErrorMessage),
    )
)]
pub async fn update_preferences(
    auth: AuthUser,
    body: PreferencesBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let customer_id = own_customer(&auth)?;
    let preferences = db.update_preferences(
        customer_id,
        AlertPreferenceChangeset {
            low_balance_threshold: body.low_balance_threshold,
            email_notifications: body.email_notifications,
            sms_notifications: body.sms_notifications,
            push_notifications: body.push_notifications,
            leak_alerts: body.leak_alerts,
            high_usage_alerts: body.high_usage_alerts,
            device_offline_alerts: body.device_offline_alerts,
            maintenance_alerts: body.maintenance_alerts,
            payment_alerts: body.payment_alerts,
            notification_schedule: body.notification_schedule.map(Json),
            updated_at: None,
        },
    )?;
    respond_with(preferences, "Alert preferences updated", StatusCode::OK)
}
