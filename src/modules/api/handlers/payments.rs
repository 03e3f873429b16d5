use super::{found, non_empty, record_activity, vouchers::normalize_code, ActivityEntry};
use crate::{
    modules::api::{
        filters::{AuthUser, ClientInfo},
        models::{validated, CreatePaymentBody, PaymentQuery},
        responder::{respond, respond_with},
    },
    shared::{
        billing::{voucher_discount, voucher_rejection},
        db::{models::NewPayment, DBAccessManager, PageRequest, PaymentFilter},
        errors::{AppError, ErrorMessage, ErrorType},
        utils::{generate_number, new_uuid, now, round2},
    },
};
use serde_json::json;
use warp::{http::StatusCode, reply::Response, Rejection};

pub const PAYMENT_TTL_HOURS: i64 = 24;
const STAFF_PERMISSION: &str = "payments.process";

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentBody,
    responses(
        (status = 201, description = "Pending top-up created"),
        (status = 422, description = "Validation errors or voucher refused", body = ErrorMessage),
    )
)]
pub async fn create_payment(
    auth: AuthUser,
    body: CreatePaymentBody,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let customer = match (auth.customer_scope(STAFF_PERMISSION)?, body.customer_id) {
        (Some(own), _) => found(db.find_customer_by_id(own)?, "Customer")?,
        (None, Some(customer_id)) => db
            .find_customer_by_id(customer_id)?
            .ok_or_else(|| AppError::field("customer_id", "The selected customer id is invalid."))?,
        (None, None) => match auth.customer.clone() {
            Some(own) => own,
            None => return Err(AppError::field("customer_id", "The customer id field is required.").into()),
        },
    };

    let mut voucher_id = None;
    let mut discount = 0.0;
    if let Some(code) = non_empty(body.voucher_code) {
        let voucher = db
            .find_voucher_by_code(&normalize_code(&code))?
            .ok_or_else(|| AppError::field("voucher_code", "The selected voucher code is invalid."))?;
        let uses = db.customer_voucher_usage_count(voucher.id, customer.id)?;
        if let Some(reason) = voucher_rejection(&voucher, uses, body.amount, now()) {
            return Err(AppError::field("voucher_code", &reason).into());
        }
        discount = voucher_discount(&voucher, body.amount);
        voucher_id = Some(voucher.id);
    }

    let at = now();
    let payment = db.create_payment(NewPayment {
        uuid: new_uuid(),
        customer_id: customer.id,
        reference_id: generate_number("PAY", 12),
        amount: round2(body.amount),
        discount_amount: discount,
        final_amount: round2(body.amount - discount),
        payment_method: body.payment_method,
        payment_provider: None,
        status: String::from("pending"),
        voucher_id,
        expired_at: Some(at + chrono::Duration::hours(PAYMENT_TTL_HOURS)),
        description: body.description,
        metadata: None,
        created_at: at,
        updated_at: at,
    })?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "payment",
            subject_id: payment.id,
            activity_type: "payment_created",
            action: "create",
            description: format!("Payment {} created", payment.reference_id),
            properties: Some(json!({ "amount": payment.amount, "final_amount": payment.final_amount })),
        },
        &client,
    );
    respond_with(payment, "Payment created successfully", StatusCode::CREATED)
}

pub async fn list_payments(auth: AuthUser, query: PaymentQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let customer_id = match auth.customer_scope(STAFF_PERMISSION)? {
        Some(own) => Some(own),
        None => query.customer_id,
    };
    let filter = PaymentFilter {
        customer_id,
        status: non_empty(query.status),
        payment_method: non_empty(query.payment_method),
    };
    respond(
        db.list_payments(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn get_payment(uuid: String, auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let scope = auth.customer_scope(STAFF_PERMISSION)?;
    let payment = found(db.find_payment_by_uuid(&uuid)?, "Payment")?;
    if scope.is_some_and(|own| own != payment.customer_id) {
        return Err(AppError::not_found("Payment").into());
    }
    respond(Ok(payment), StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/payments/{uuid}/confirm",
    params(("uuid" = String, Path, description = "Payment UUID")),
    responses(
        (status = 200, description = "Payment confirmed and balance credited"),
        (status = 422, description = "Payment not pending or expired", body = ErrorMessage),
    )
)]
pub async fn confirm_payment(
    uuid: String,
    auth: AuthUser,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let payment = found(db.find_payment_by_uuid(&uuid)?, "Payment")?;
    if payment.status == "pending" && payment.expired_at.is_some_and(|expiry| expiry < now()) {
        db.expire_payment(payment.id)?;
        return Err(AppError::new("Payment has expired.", ErrorType::Validation).into());
    }

    let (payment, customer) = db.confirm_payment(payment.id)?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "payment",
            subject_id: payment.id,
            activity_type: "payment_confirmed",
            action: "update",
            description: format!("Payment {} confirmed", payment.reference_id),
            properties: Some(json!({ "balance": customer.balance })),
        },
        &client,
    );
    log::info!("Payment {} credited {} to {}", payment.reference_id, payment.amount, customer.customer_number);
    respond_with(
        json!({ "payment": payment, "balance": customer.balance }),
        "Payment confirmed successfully",
        StatusCode::OK,
    )
}

pub async fn refund_payment(
    uuid: String,
    auth: AuthUser,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let payment = found(db.find_payment_by_uuid(&uuid)?, "Payment")?;
    let (payment, customer) = db.refund_payment(payment.id)?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "payment",
            subject_id: payment.id,
            activity_type: "payment_refunded",
            action: "update",
            description: format!("Payment {} refunded", payment.reference_id),
            properties: Some(json!({ "balance": customer.balance })),
        },
        &client,
    );
    respond_with(
        json!({ "payment": payment, "balance": customer.balance }),
        "Payment refunded successfully",
        StatusCode::OK,
    )
}
