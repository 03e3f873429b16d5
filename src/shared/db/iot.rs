use super::{
    models::{IotDevice, IotDeviceChangeset, IotReading, IotStatusChangeset, NewIotDevice, NewIotReading},
    schema::{devices, iot_devices, iot_readings},
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use chrono::NaiveDateTime;
use diesel::{prelude::*, sqlite::Sqlite};

fn iot_devices_query(customer_id: Option<i32>) -> iot_devices::BoxedQuery<'static, Sqlite> {
    let mut query = iot_devices::table
        .filter(iot_devices::deleted_at.is_null())
        .into_boxed();
    if let Some(customer_id) = customer_id {
        let meters = devices::table
            .filter(devices::customer_id.eq(customer_id))
            .filter(devices::deleted_at.is_null())
            .select(devices::id.nullable());
        query = query.filter(iot_devices::device_id.eq_any(meters));
    }
    query
}

impl DBAccessManager {
    pub fn find_iot_device_by_key(&mut self, device_key: &str) -> Result<Option<IotDevice>, AppError> {
        iot_devices::table
            .filter(iot_devices::device_key.eq(device_key))
            .filter(iot_devices::deleted_at.is_null())
            .select(IotDevice::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding IoT device:"))
    }

    pub fn list_iot_devices(
        &mut self,
        customer_id: Option<i32>,
        page: PageRequest,
    ) -> Result<Page<IotDevice>, AppError> {
        let total: i64 = iot_devices_query(customer_id)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting IoT devices:"))?;
        let rows = iot_devices_query(customer_id)
            .order(iot_devices::created_at.desc())
            .limit(page.per_page)
            .offset(page.offset())
            .select(IotDevice::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing IoT devices:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn create_iot_device(&mut self, new_device: NewIotDevice) -> Result<IotDevice, AppError> {
        diesel::insert_into(iot_devices::table)
            .values(&new_device)
            .returning(IotDevice::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While registering IoT device:"))
    }

    pub fn update_iot_device(
        &mut self,
        iot_device_id: i32,
        mut changes: IotDeviceChangeset,
    ) -> Result<IotDevice, AppError> {
        changes.updated_at = Some(now());
        diesel::update(iot_devices::table.find(iot_device_id))
            .set(&changes)
            .returning(IotDevice::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating IoT device:"))
    }

    pub fn soft_delete_iot_device(&mut self, iot_device_id: i32) -> Result<(), AppError> {
        diesel::update(iot_devices::table.find(iot_device_id))
            .set(iot_devices::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting IoT device:"))?;
        Ok(())
    }

    pub fn update_iot_status(
        &mut self,
        iot_device_id: i32,
        mut changes: IotStatusChangeset,
    ) -> Result<IotDevice, AppError> {
        changes.updated_at = Some(now());
        diesel::update(iot_devices::table.find(iot_device_id))
            .set(&changes)
            .returning(IotDevice::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating IoT status:"))
    }

    pub fn bump_reboot_count(&mut self, iot_device_id: i32) -> Result<(), AppError> {
        diesel::update(iot_devices::table.find(iot_device_id))
            .set(iot_devices::reboot_count.eq(iot_devices::reboot_count + 1))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting reboots:"))?;
        Ok(())
    }

    pub fn insert_reading(&mut self, reading: NewIotReading) -> Result<IotReading, AppError> {
        diesel::insert_into(iot_readings::table)
            .values(&reading)
            .returning(IotReading::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While storing reading:"))
    }

    pub fn latest_reading(&mut self, iot_device_id: i32) -> Result<Option<IotReading>, AppError> {
        iot_readings::table
            .filter(iot_readings::iot_device_id.eq(iot_device_id))
            .order((iot_readings::reading_timestamp.desc(), iot_readings::id.desc()))
            .select(IotReading::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While loading latest reading:"))
    }

    pub fn readings_since(
        &mut self,
        iot_device_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<IotReading>, AppError> {
        iot_readings::table
            .filter(iot_readings::iot_device_id.eq(iot_device_id))
            .filter(iot_readings::reading_timestamp.ge(since))
            .order((iot_readings::reading_timestamp.asc(), iot_readings::id.asc()))
            .select(IotReading::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading reading history:"))
    }

    /// Online modules with no heartbeat or data since `cutoff`.
    pub fn stale_online_devices(&mut self, cutoff: NaiveDateTime) -> Result<Vec<IotDevice>, AppError> {
        iot_devices::table
            .filter(iot_devices::deleted_at.is_null())
            .filter(iot_devices::connection_status.eq("online"))
            .filter(
                iot_devices::last_heartbeat_at
                    .is_null()
                    .or(iot_devices::last_heartbeat_at.lt(cutoff)),
            )
            .filter(
                iot_devices::last_data_at
                    .is_null()
                    .or(iot_devices::last_data_at.lt(cutoff)),
            )
            .filter(iot_devices::updated_at.lt(cutoff))
            .select(IotDevice::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While finding stale devices:"))
    }
}
