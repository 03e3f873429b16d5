use super::{
    models::{Alert, AlertPreference, AlertPreferenceChangeset, NewAlert, NewAlertPreference},
    schema::{alert_preferences, alerts},
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{
    errors::AppError,
    utils::{new_uuid, now},
};
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct AlertFilter {
    pub customer_id: Option<i32>,
    pub unread_only: bool,
    pub status: Option<String>,
    pub alert_type: Option<String>,
}

fn alerts_query(filter: &AlertFilter) -> alerts::BoxedQuery<'static, Sqlite> {
    let mut query = alerts::table.into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(alerts::customer_id.eq(customer_id));
    }
    if filter.unread_only {
        query = query.filter(alerts::is_read.eq(false));
    }
    if let Some(status) = &filter.status {
        query = query.filter(alerts::status.eq(status.clone()));
    }
    if let Some(alert_type) = &filter.alert_type {
        query = query.filter(alerts::alert_type.eq(alert_type.clone()));
    }
    query
}

impl DBAccessManager {
    /// Stores the alert unless an active one of the same type already exists
    /// for the same meter, module or customer. Returns the stored alert.
    pub fn raise_alert_once(&mut self, alert: NewAlert) -> Result<Option<Alert>, AppError> {
        let mut existing: alerts::BoxedQuery<'_, Sqlite> = alerts::table
            .filter(alerts::alert_type.eq(alert.alert_type.clone()))
            .filter(alerts::status.eq("active"))
            .into_boxed();
        existing = match (alert.device_id, alert.iot_device_id, alert.customer_id) {
            (Some(device_id), _, _) => existing.filter(alerts::device_id.eq(device_id)),
            (None, Some(iot_device_id), _) => existing.filter(alerts::iot_device_id.eq(iot_device_id)),
            (None, None, Some(customer_id)) => existing.filter(alerts::customer_id.eq(customer_id)),
            (None, None, None) => existing,
        };
        let count: i64 = existing
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While checking alerts:"))?;
        if count > 0 {
            return Ok(None);
        }
        diesel::insert_into(alerts::table)
            .values(&alert)
            .returning(Alert::as_returning())
            .get_result(&mut self.connection)
            .map(Some)
            .map_err(|err| AppError::from_diesel_err(err, "While raising alert:"))
    }

    pub fn list_alerts(&mut self, filter: &AlertFilter, page: PageRequest) -> Result<Page<Alert>, AppError> {
        let total: i64 = alerts_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting alerts:"))?;
        let rows = alerts_query(filter)
            .order((alerts::created_at.desc(), alerts::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(Alert::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing alerts:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_alert_by_uuid(&mut self, uuid: &str) -> Result<Option<Alert>, AppError> {
        alerts::table
            .filter(alerts::uuid.eq(uuid))
            .select(Alert::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding alert:"))
    }

    pub fn mark_alert_read(&mut self, alert_id: i32) -> Result<Alert, AppError> {
        let at = now();
        diesel::update(alerts::table.find(alert_id))
            .set((
                alerts::is_read.eq(true),
                alerts::read_at.eq(Some(at)),
                alerts::updated_at.eq(at),
            ))
            .returning(Alert::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While marking alert read:"))
    }

    pub fn dismiss_alert(&mut self, alert_id: i32) -> Result<Alert, AppError> {
        diesel::update(alerts::table.find(alert_id))
            .set((
                alerts::is_dismissed.eq(true),
                alerts::status.eq("dismissed"),
                alerts::updated_at.eq(now()),
            ))
            .returning(Alert::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While dismissing alert:"))
    }

    /// The customer's preferences, created with defaults on first access.
    pub fn preferences_for(&mut self, customer_id: i32) -> Result<AlertPreference, AppError> {
        let at = now();
        diesel::insert_or_ignore_into(alert_preferences::table)
            .values(&NewAlertPreference {
                uuid: new_uuid(),
                customer_id,
                created_at: at,
                updated_at: at,
            })
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating alert preferences:"))?;
        alert_preferences::table
            .filter(alert_preferences::customer_id.eq(customer_id))
            .select(AlertPreference::as_select())
            .first(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading alert preferences:"))
    }

    pub fn update_preferences(
        &mut self,
        customer_id: i32,
        mut changes: AlertPreferenceChangeset,
    ) -> Result<AlertPreference, AppError> {
        self.preferences_for(customer_id)?;
        changes.updated_at = Some(now());
        diesel::update(alert_preferences::table.filter(alert_preferences::customer_id.eq(customer_id)))
            .set(&changes)
            .returning(AlertPreference::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating alert preferences:"))
    }
}
