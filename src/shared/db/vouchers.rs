use super::{
    models::{NewVoucher, Voucher, VoucherChangeset},
    schema::{voucher_usages, vouchers},
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{prelude::*, sqlite::Sqlite};

fn vouchers_query(status: Option<&str>) -> vouchers::BoxedQuery<'static, Sqlite> {
    let mut query = vouchers::table
        .filter(vouchers::deleted_at.is_null())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(vouchers::status.eq(status.to_string()));
    }
    query
}

impl DBAccessManager {
    pub fn list_vouchers(
        &mut self,
        status: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Voucher>, AppError> {
        let total: i64 = vouchers_query(status)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting vouchers:"))?;
        let rows = vouchers_query(status)
            .order(vouchers::created_at.desc())
            .limit(page.per_page)
            .offset(page.offset())
            .select(Voucher::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing vouchers:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_voucher_by_uuid(&mut self, uuid: &str) -> Result<Option<Voucher>, AppError> {
        vouchers::table
            .filter(vouchers::uuid.eq(uuid))
            .filter(vouchers::deleted_at.is_null())
            .select(Voucher::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding voucher:"))
    }

    pub fn find_voucher_by_code(&mut self, code: &str) -> Result<Option<Voucher>, AppError> {
        vouchers::table
            .filter(vouchers::code.eq(code.trim().to_uppercase()))
            .filter(vouchers::deleted_at.is_null())
            .select(Voucher::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding voucher:"))
    }

    pub fn find_voucher_by_id(&mut self, id: i32) -> Result<Option<Voucher>, AppError> {
        vouchers::table
            .filter(vouchers::id.eq(id))
            .filter(vouchers::deleted_at.is_null())
            .select(Voucher::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding voucher:"))
    }

    pub fn create_voucher(&mut self, new_voucher: NewVoucher) -> Result<Voucher, AppError> {
        diesel::insert_into(vouchers::table)
            .values(&new_voucher)
            .returning(Voucher::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating voucher:"))
    }

    pub fn update_voucher(
        &mut self,
        voucher_id: i32,
        mut changes: VoucherChangeset,
    ) -> Result<Voucher, AppError> {
        changes.updated_at = Some(now());
        diesel::update(vouchers::table.find(voucher_id))
            .set(&changes)
            .returning(Voucher::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating voucher:"))
    }

    pub fn soft_delete_voucher(&mut self, voucher_id: i32) -> Result<(), AppError> {
        diesel::update(vouchers::table.find(voucher_id))
            .set(vouchers::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting voucher:"))?;
        Ok(())
    }

    pub fn customer_voucher_usage_count(
        &mut self,
        voucher_id: i32,
        customer_id: i32,
    ) -> Result<i64, AppError> {
        customer_usage_count(&mut self.connection, voucher_id, customer_id)
    }
}

pub(super) fn customer_usage_count(
    conn: &mut diesel::sqlite::SqliteConnection,
    voucher_id: i32,
    customer_id: i32,
) -> Result<i64, AppError> {
    voucher_usages::table
        .filter(voucher_usages::voucher_id.eq(voucher_id))
        .filter(voucher_usages::customer_id.eq(customer_id))
        .count()
        .get_result(conn)
        .map_err(|err| AppError::from_diesel_err(err, "While counting voucher usage:"))
}
