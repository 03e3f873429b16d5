use super::{
    like_pattern,
    models::{Customer, CustomerChangeset, NewCustomer},
    schema::customers,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct CustomerFilter {
    pub status: Option<String>,
    pub search: Option<String>,
    pub city: Option<String>,
}

fn customers_query(filter: &CustomerFilter) -> customers::BoxedQuery<'static, Sqlite> {
    let mut query = customers::table
        .filter(customers::deleted_at.is_null())
        .into_boxed();
    if let Some(status) = &filter.status {
        query = query.filter(customers::status.eq(status.clone()));
    }
    if let Some(city) = &filter.city {
        query = query.filter(customers::city.eq(city.clone()));
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(term);
        query = query.filter(
            customers::full_name
                .like(pattern.clone())
                .or(customers::email.like(pattern.clone()))
                .or(customers::customer_number.like(pattern.clone()))
                .or(customers::phone.like(pattern)),
        );
    }
    query
}

impl DBAccessManager {
    pub fn list_customers(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<Customer>, AppError> {
        let total: i64 = customers_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting customers:"))?;
        let rows = customers_query(filter)
            .order(customers::created_at.desc())
            .limit(page.per_page)
            .offset(page.offset())
            .select(Customer::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing customers:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_customer_by_uuid(&mut self, uuid: &str) -> Result<Option<Customer>, AppError> {
        customers::table
            .filter(customers::uuid.eq(uuid))
            .filter(customers::deleted_at.is_null())
            .select(Customer::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding customer:"))
    }

    pub fn find_customer_by_id(&mut self, id: i32) -> Result<Option<Customer>, AppError> {
        customers::table
            .filter(customers::id.eq(id))
            .filter(customers::deleted_at.is_null())
            .select(Customer::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding customer:"))
    }

    pub fn customer_for_user(&mut self, user_id: i32) -> Result<Option<Customer>, AppError> {
        customers::table
            .filter(customers::user_id.eq(user_id))
            .filter(customers::deleted_at.is_null())
            .select(Customer::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding customer:"))
    }

    pub fn customer_email_taken(&mut self, email: &str, except_id: Option<i32>) -> Result<bool, AppError> {
        let mut query: customers::BoxedQuery<'_, Sqlite> = customers::table
            .filter(customers::email.eq(email))
            .into_boxed();
        if let Some(id) = except_id {
            query = query.filter(customers::id.ne(id));
        }
        let count: i64 = query
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While checking customer email:"))?;
        Ok(count > 0)
    }

    pub fn create_customer(&mut self, new_customer: NewCustomer) -> Result<Customer, AppError> {
        diesel::insert_into(customers::table)
            .values(&new_customer)
            .returning(Customer::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating customer:"))
    }

    pub fn update_customer(
        &mut self,
        customer_id: i32,
        mut changes: CustomerChangeset,
    ) -> Result<Customer, AppError> {
        changes.updated_at = Some(now());
        diesel::update(customers::table.find(customer_id))
            .set(&changes)
            .returning(Customer::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating customer:"))
    }

    pub fn soft_delete_customer(&mut self, customer_id: i32) -> Result<(), AppError> {
        diesel::update(customers::table.find(customer_id))
            .set(customers::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting customer:"))?;
        Ok(())
    }

    pub fn adjust_balance(&mut self, customer_id: i32, delta: f64) -> Result<Customer, AppError> {
        adjust_balance(&mut self.connection, customer_id, delta)
    }
}

pub(super) fn adjust_balance(
    conn: &mut diesel::sqlite::SqliteConnection,
    customer_id: i32,
    delta: f64,
) -> Result<Customer, AppError> {
    diesel::update(customers::table.find(customer_id))
        .set((
            customers::balance.eq(customers::balance + delta),
            customers::updated_at.eq(now()),
        ))
        .returning(Customer::as_returning())
        .get_result(conn)
        .map_err(|err| AppError::from_diesel_err(err, "While adjusting balance:"))
}
