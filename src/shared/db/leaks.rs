use super::{
    models::{LeakDetectionEvent, LeakEventChangeset, NewLeakDetectionEvent},
    schema::leak_detection_events,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct LeakEventFilter {
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub status: Option<String>,
    pub severity: Option<String>,
}

fn leaks_query(filter: &LeakEventFilter) -> leak_detection_events::BoxedQuery<'static, Sqlite> {
    let mut query = leak_detection_events::table.into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(leak_detection_events::customer_id.eq(customer_id));
    }
    if let Some(device_id) = filter.device_id {
        query = query.filter(leak_detection_events::device_id.eq(device_id));
    }
    if let Some(status) = &filter.status {
        query = query.filter(leak_detection_events::status.eq(status.clone()));
    }
    if let Some(severity) = &filter.severity {
        query = query.filter(leak_detection_events::severity.eq(severity.clone()));
    }
    query
}

impl DBAccessManager {
    pub fn record_leak_event(&mut self, event: NewLeakDetectionEvent) -> Result<LeakDetectionEvent, AppError> {
        diesel::insert_into(leak_detection_events::table)
            .values(&event)
            .returning(LeakDetectionEvent::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While recording leak event:"))
    }

    pub fn list_leak_events(
        &mut self,
        filter: &LeakEventFilter,
        page: PageRequest,
    ) -> Result<Page<LeakDetectionEvent>, AppError> {
        let total: i64 = leaks_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting leak events:"))?;
        let rows = leaks_query(filter)
            .order((leak_detection_events::detected_at.desc(), leak_detection_events::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(LeakDetectionEvent::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing leak events:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_leak_event_by_uuid(&mut self, uuid: &str) -> Result<Option<LeakDetectionEvent>, AppError> {
        leak_detection_events::table
            .filter(leak_detection_events::uuid.eq(uuid))
            .select(LeakDetectionEvent::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding leak event:"))
    }

    pub fn update_leak_event(
        &mut self,
        event_id: i32,
        mut changes: LeakEventChangeset,
    ) -> Result<LeakDetectionEvent, AppError> {
        changes.updated_at = Some(now());
        diesel::update(leak_detection_events::table.find(event_id))
            .set(&changes)
            .returning(LeakDetectionEvent::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating leak event:"))
    }
}
