use super::{
    like_pattern,
    models::{Device, DeviceChangeset, NewDevice},
    schema::devices,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use chrono::NaiveDateTime;
use diesel::{prelude::*, sqlite::Sqlite};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct DeviceFilter {
    pub customer_id: Option<i32>,
    pub property_id: Option<i32>,
    pub status: Option<String>,
    pub connection_status: Option<String>,
    pub device_type: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeviceStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_connection_status: BTreeMap<String, i64>,
    pub by_type: BTreeMap<String, i64>,
}

fn devices_query(filter: &DeviceFilter) -> devices::BoxedQuery<'static, Sqlite> {
    let mut query = devices::table
        .filter(devices::deleted_at.is_null())
        .into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(devices::customer_id.eq(customer_id));
    }
    if let Some(property_id) = filter.property_id {
        query = query.filter(devices::property_id.eq(property_id));
    }
    if let Some(status) = &filter.status {
        query = query.filter(devices::status.eq(status.clone()));
    }
    if let Some(connection_status) = &filter.connection_status {
        query = query.filter(devices::connection_status.eq(connection_status.clone()));
    }
    if let Some(device_type) = &filter.device_type {
        query = query.filter(devices::device_type.eq(device_type.clone()));
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(term);
        query = query.filter(
            devices::device_name
                .like(pattern.clone())
                .or(devices::device_number.like(pattern.clone()))
                .or(devices::serial_number.like(pattern)),
        );
    }
    query
}

impl DBAccessManager {
    pub fn list_devices(
        &mut self,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> Result<Page<Device>, AppError> {
        let total: i64 = devices_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting devices:"))?;
        let rows = devices_query(filter)
            .order(devices::created_at.desc())
            .limit(page.per_page)
            .offset(page.offset())
            .select(Device::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing devices:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn device_stats(&mut self, customer_id: Option<i32>) -> Result<DeviceStats, AppError> {
        let filter = DeviceFilter {
            customer_id,
            ..Default::default()
        };
        let rows: Vec<(String, String, String)> = devices_query(&filter)
            .select((
                devices::status,
                devices::connection_status,
                devices::device_type,
            ))
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading device stats:"))?;

        let mut stats = DeviceStats {
            total: rows.len() as i64,
            by_status: BTreeMap::new(),
            by_connection_status: BTreeMap::new(),
            by_type: BTreeMap::new(),
        };
        for (status, connection_status, device_type) in rows {
            *stats.by_status.entry(status).or_insert(0) += 1;
            *stats.by_connection_status.entry(connection_status).or_insert(0) += 1;
            *stats.by_type.entry(device_type).or_insert(0) += 1;
        }
        Ok(stats)
    }

    pub fn find_device_by_uuid(&mut self, uuid: &str) -> Result<Option<Device>, AppError> {
        devices::table
            .filter(devices::uuid.eq(uuid))
            .filter(devices::deleted_at.is_null())
            .select(Device::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding device:"))
    }

    pub fn find_device_by_id(&mut self, id: i32) -> Result<Option<Device>, AppError> {
        devices::table
            .filter(devices::id.eq(id))
            .filter(devices::deleted_at.is_null())
            .select(Device::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding device:"))
    }

    pub fn create_device(&mut self, new_device: NewDevice) -> Result<Device, AppError> {
        diesel::insert_into(devices::table)
            .values(&new_device)
            .returning(Device::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating device:"))
    }

    pub fn update_device(
        &mut self,
        device_id: i32,
        mut changes: DeviceChangeset,
    ) -> Result<Device, AppError> {
        changes.updated_at = Some(now());
        diesel::update(devices::table.find(device_id))
            .set(&changes)
            .returning(Device::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating device:"))
    }

    pub fn soft_delete_device(&mut self, device_id: i32) -> Result<(), AppError> {
        diesel::update(devices::table.find(device_id))
            .set(devices::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting device:"))?;
        Ok(())
    }

    pub fn record_meter_reading(
        &mut self,
        device_id: i32,
        value: f64,
        at: NaiveDateTime,
    ) -> Result<(), AppError> {
        diesel::update(devices::table.find(device_id))
            .set((
                devices::last_reading_value.eq(Some(value)),
                devices::last_reading_at.eq(Some(at)),
                devices::connection_status.eq("online"),
                devices::updated_at.eq(now()),
            ))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While recording meter reading:"))?;
        Ok(())
    }

    pub fn set_device_connection(&mut self, device_id: i32, status: &str) -> Result<(), AppError> {
        diesel::update(devices::table.find(device_id))
            .set((
                devices::connection_status.eq(status),
                devices::updated_at.eq(now()),
            ))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating device connection:"))?;
        Ok(())
    }

    pub fn bump_alert_count(&mut self, device_id: i32) -> Result<(), AppError> {
        diesel::update(devices::table.find(device_id))
            .set(devices::alert_count.eq(devices::alert_count + 1))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting alerts:"))?;
        Ok(())
    }
}
