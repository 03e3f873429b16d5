use super::{
    customers,
    models::{Customer, NewPayment, NewVoucherUsage, Payment, Voucher},
    schema::{payments, voucher_usages, vouchers},
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{
    billing::voucher_rejection,
    errors::{AppError, ErrorType},
    utils::{new_uuid, now},
};
use super::vouchers::customer_usage_count;
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct PaymentFilter {
    pub customer_id: Option<i32>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
}

fn payments_query(filter: &PaymentFilter) -> payments::BoxedQuery<'static, Sqlite> {
    let mut query = payments::table
        .filter(payments::deleted_at.is_null())
        .into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(payments::customer_id.eq(customer_id));
    }
    if let Some(status) = &filter.status {
        query = query.filter(payments::status.eq(status.clone()));
    }
    if let Some(method) = &filter.payment_method {
        query = query.filter(payments::payment_method.eq(method.clone()));
    }
    query
}

impl DBAccessManager {
    pub fn list_payments(
        &mut self,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<Payment>, AppError> {
        let total: i64 = payments_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting payments:"))?;
        let rows = payments_query(filter)
            .order((payments::created_at.desc(), payments::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(Payment::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing payments:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_payment_by_uuid(&mut self, uuid: &str) -> Result<Option<Payment>, AppError> {
        payments::table
            .filter(payments::uuid.eq(uuid))
            .filter(payments::deleted_at.is_null())
            .select(Payment::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding payment:"))
    }

    pub fn create_payment(&mut self, new_payment: NewPayment) -> Result<Payment, AppError> {
        diesel::insert_into(payments::table)
            .values(&new_payment)
            .returning(Payment::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating payment:"))
    }

    /// Marks a pending payment paid, credits the customer and books the
    /// voucher usage, all or nothing. Voucher limits are checked again against
    /// the usages booked so far.
    pub fn confirm_payment(&mut self, payment_id: i32) -> Result<(Payment, Customer), AppError> {
        self.connection.transaction::<_, AppError, _>(|conn| {
            let at = now();
            let payment = diesel::update(
                payments::table
                    .find(payment_id)
                    .filter(payments::status.eq("pending")),
            )
            .set((
                payments::status.eq("paid"),
                payments::paid_at.eq(Some(at)),
                payments::updated_at.eq(at),
            ))
            .returning(Payment::as_returning())
            .get_result(conn)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While confirming payment:"))?
            .ok_or_else(|| AppError::new("Only pending payments can be confirmed.", ErrorType::Validation))?;

            if let Some(voucher_id) = payment.voucher_id {
                let voucher: Voucher = vouchers::table
                    .find(voucher_id)
                    .select(Voucher::as_select())
                    .first(conn)
                    .map_err(|err| AppError::from_diesel_err(err, "While loading voucher:"))?;
                let uses = customer_usage_count(conn, voucher_id, payment.customer_id)?;
                if let Some(reason) = voucher_rejection(&voucher, uses, payment.amount, at) {
                    return Err(AppError::field("voucher_code", &reason));
                }
            }

            let customer = customers::adjust_balance(conn, payment.customer_id, payment.amount)?;

            if let Some(voucher_id) = payment.voucher_id {
                diesel::insert_into(voucher_usages::table)
                    .values(&NewVoucherUsage {
                        uuid: new_uuid(),
                        voucher_id,
                        customer_id: payment.customer_id,
                        payment_id: Some(payment.id),
                        discount_amount: payment.discount_amount,
                        used_at: at,
                        created_at: at,
                        updated_at: at,
                    })
                    .execute(conn)
                    .map_err(|err| AppError::from_diesel_err(err, "While recording voucher usage:"))?;
                diesel::update(vouchers::table.find(voucher_id))
                    .set(vouchers::usage_count.eq(vouchers::usage_count + 1))
                    .execute(conn)
                    .map_err(|err| AppError::from_diesel_err(err, "While counting voucher usage:"))?;
            }

            Ok((payment, customer))
        })
    }

    pub fn refund_payment(&mut self, payment_id: i32) -> Result<(Payment, Customer), AppError> {
        self.connection.transaction::<_, AppError, _>(|conn| {
            let payment = diesel::update(
                payments::table
                    .find(payment_id)
                    .filter(payments::status.eq("paid")),
            )
            .set((
                payments::status.eq("refunded"),
                payments::updated_at.eq(now()),
            ))
            .returning(Payment::as_returning())
            .get_result(conn)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While refunding payment:"))?
            .ok_or_else(|| AppError::new("Only paid payments can be refunded.", ErrorType::Validation))?;

            let customer = customers::adjust_balance(conn, payment.customer_id, -payment.amount)?;
            Ok((payment, customer))
        })
    }

    pub fn expire_payment(&mut self, payment_id: i32) -> Result<(), AppError> {
        diesel::update(
            payments::table
                .find(payment_id)
                .filter(payments::status.eq("pending")),
        )
        .set((
            payments::status.eq("expired"),
            payments::updated_at.eq(now()),
        ))
        .execute(&mut self.connection)
        .map_err(|err| AppError::from_diesel_err(err, "While expiring payment:"))?;
        Ok(())
    }
}
