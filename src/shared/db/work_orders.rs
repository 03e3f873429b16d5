use super::{
    models::{NewWorkOrder, WorkOrder, WorkOrderChangeset},
    schema::work_orders,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct WorkOrderFilter {
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub status: Option<String>,
    pub work_type: Option<String>,
    pub priority: Option<String>,
}

fn work_orders_query(filter: &WorkOrderFilter) -> work_orders::BoxedQuery<'static, Sqlite> {
    let mut query = work_orders::table
        .filter(work_orders::deleted_at.is_null())
        .into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(work_orders::customer_id.eq(customer_id));
    }
    if let Some(device_id) = filter.device_id {
        query = query.filter(work_orders::device_id.eq(device_id));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(work_orders::assigned_to.eq(assigned_to));
    }
    if let Some(status) = &filter.status {
        query = query.filter(work_orders::status.eq(status.clone()));
    }
    if let Some(work_type) = &filter.work_type {
        query = query.filter(work_orders::work_type.eq(work_type.clone()));
    }
    if let Some(priority) = &filter.priority {
        query = query.filter(work_orders::priority.eq(priority.clone()));
    }
    query
}

impl DBAccessManager {
    pub fn list_work_orders(
        &mut self,
        filter: &WorkOrderFilter,
        page: PageRequest,
    ) -> Result<Page<WorkOrder>, AppError> {
        let total: i64 = work_orders_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting work orders:"))?;
        let rows = work_orders_query(filter)
            .order((work_orders::created_at.desc(), work_orders::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(WorkOrder::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing work orders:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_work_order_by_uuid(&mut self, uuid: &str) -> Result<Option<WorkOrder>, AppError> {
        work_orders::table
            .filter(work_orders::uuid.eq(uuid))
            .filter(work_orders::deleted_at.is_null())
            .select(WorkOrder::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding work order:"))
    }

    pub fn create_work_order(&mut self, new_order: NewWorkOrder) -> Result<WorkOrder, AppError> {
        diesel::insert_into(work_orders::table)
            .values(&new_order)
            .returning(WorkOrder::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating work order:"))
    }

    pub fn update_work_order(
        &mut self,
        order_id: i32,
        mut changes: WorkOrderChangeset,
    ) -> Result<WorkOrder, AppError> {
        changes.updated_at = Some(now());
        diesel::update(work_orders::table.find(order_id))
            .set(&changes)
            .returning(WorkOrder::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating work order:"))
    }

    pub fn soft_delete_work_order(&mut self, order_id: i32) -> Result<(), AppError> {
        diesel::update(work_orders::table.find(order_id))
            .set(work_orders::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting work order:"))?;
        Ok(())
    }
}
