use super::{
    models::{MaintenanceChangeset, MaintenanceSchedule, NewMaintenanceSchedule},
    schema::{devices, maintenance_schedules},
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use chrono::NaiveDateTime;
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct MaintenanceFilter {
    /// Owner of the scheduled meter.
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub status: Option<String>,
    pub maintenance_type: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

fn schedules_query(filter: &MaintenanceFilter) -> maintenance_schedules::BoxedQuery<'static, Sqlite> {
    let mut query = maintenance_schedules::table
        .filter(maintenance_schedules::deleted_at.is_null())
        .into_boxed();
    if let Some(customer_id) = filter.customer_id {
        let owned = devices::table
            .filter(devices::customer_id.eq(customer_id))
            .select(devices::id);
        query = query.filter(maintenance_schedules::device_id.eq_any(owned));
    }
    if let Some(device_id) = filter.device_id {
        query = query.filter(maintenance_schedules::device_id.eq(device_id));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(maintenance_schedules::assigned_to.eq(assigned_to));
    }
    if let Some(status) = &filter.status {
        query = query.filter(maintenance_schedules::status.eq(status.clone()));
    }
    if let Some(maintenance_type) = &filter.maintenance_type {
        query = query.filter(maintenance_schedules::maintenance_type.eq(maintenance_type.clone()));
    }
    if let Some(from) = filter.from {
        query = query.filter(maintenance_schedules::scheduled_at.ge(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(maintenance_schedules::scheduled_at.le(to));
    }
    query
}

impl DBAccessManager {
    /// Upcoming work first.
    pub fn list_maintenance(
        &mut self,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> Result<Page<MaintenanceSchedule>, AppError> {
        let total: i64 = schedules_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting maintenance schedules:"))?;
        let rows = schedules_query(filter)
            .order((maintenance_schedules::scheduled_at.asc(), maintenance_schedules::id.asc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(MaintenanceSchedule::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing maintenance schedules:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_maintenance_by_uuid(&mut self, uuid: &str) -> Result<Option<MaintenanceSchedule>, AppError> {
        maintenance_schedules::table
            .filter(maintenance_schedules::uuid.eq(uuid))
            .filter(maintenance_schedules::deleted_at.is_null())
            .select(MaintenanceSchedule::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding maintenance schedule:"))
    }

    pub fn create_maintenance(
        &mut self,
        new_schedule: NewMaintenanceSchedule,
    ) -> Result<MaintenanceSchedule, AppError> {
        diesel::insert_into(maintenance_schedules::table)
            .values(&new_schedule)
            .returning(MaintenanceSchedule::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating maintenance schedule:"))
    }

    pub fn update_maintenance(
        &mut self,
        schedule_id: i32,
        mut changes: MaintenanceChangeset,
    ) -> Result<MaintenanceSchedule, AppError> {
        changes.updated_at = Some(now());
        diesel::update(maintenance_schedules::table.find(schedule_id))
            .set(&changes)
            .returning(MaintenanceSchedule::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating maintenance schedule:"))
    }

    pub fn soft_delete_maintenance(&mut self, schedule_id: i32) -> Result<(), AppError> {
        diesel::update(maintenance_schedules::table.find(schedule_id))
            .set(maintenance_schedules::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting maintenance schedule:"))?;
        Ok(())
    }
}
