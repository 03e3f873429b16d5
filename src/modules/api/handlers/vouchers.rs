use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, CreateVoucherBody, UpdateVoucherBody, ValidateVoucherBody, VoucherQuery},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        billing::{voucher_discount, voucher_rejection},
        db::{
            json::Json,
            models::{NewVoucher, VoucherChangeset},
            DBAccessManager, PageRequest,
        },
        errors::{AppError, ErrorMessage},
        utils::{new_uuid, now, round2},
    },
};
use serde_json::json;
use warp::{http::StatusCode, reply::Response, Rejection};

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub async fn list_vouchers(_auth: AuthUser, query: VoucherQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let status = non_empty(query.status);
    respond(
        db.list_vouchers(status.as_deref(), PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn get_voucher(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(found(db.find_voucher_by_uuid(&uuid)?, "Voucher"), StatusCode::OK)
}

pub async fn create_voucher(
    _auth: AuthUser,
    body: CreateVoucherBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    if body.valid_until <= body.valid_from {
        return Err(AppError::field("valid_until", "The valid until must be a date after valid from.").into());
    }
    let code = normalize_code(&body.code);
    if db.find_voucher_by_code(&code)?.is_some() {
        return Err(AppError::field("code", "The code has already been taken.").into());
    }

    let at = now();
    let voucher = db.create_voucher(NewVoucher {
        uuid: new_uuid(),
        code,
        name: body.name.trim().to_string(),
        description: body.description,
        discount_type: body.discount_type,
        discount_value: body.discount_value,
        max_discount_amount: body.max_discount_amount,
        min_purchase_amount: body.min_purchase_amount.unwrap_or(0.0),
        usage_limit: body.usage_limit,
        usage_count: 0,
        per_customer_limit: body.per_customer_limit.unwrap_or(1),
        valid_from: body.valid_from,
        valid_until: body.valid_until,
        status: body.status.unwrap_or_else(|| String::from("active")),
        metadata: body.metadata.map(Json),
        created_at: at,
        updated_at: at,
    })?;
    respond_with(voucher, "Voucher created successfully", StatusCode::CREATED)
}

pub async fn update_voucher(
    uuid: String,
    _auth: AuthUser,
    body: UpdateVoucherBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let voucher = found(db.find_voucher_by_uuid(&uuid)?, "Voucher")?;
    let valid_from = body.valid_from.unwrap_or(voucher.valid_from);
    let valid_until = body.valid_until.unwrap_or(voucher.valid_until);
    if valid_until <= valid_from {
        return Err(AppError::field("valid_until", "The valid until must be a date after valid from.").into());
    }
    let updated = db.update_voucher(
        voucher.id,
        VoucherChangeset {
            name: body.name,
            description: body.description,
            discount_type: body.discount_type,
            discount_value: body.discount_value,
            max_discount_amount: body.max_discount_amount,
            min_purchase_amount: body.min_purchase_amount,
            usage_limit: body.usage_limit,
            per_customer_limit: body.per_customer_limit,
            valid_from: body.valid_from,
            valid_until: body.valid_until,
            status: body.status,
            updated_at: Some(now()),
        },
    )?;
    respond_with(updated, "Voucher updated successfully", StatusCode::OK)
}

pub async fn delete_voucher(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let voucher = found(db.find_voucher_by_uuid(&uuid)?, "Voucher")?;
    db.soft_delete_voucher(voucher.id)?;
    respond_message("Voucher deleted successfully")
}

#[utoipa::path(
    post,
    path = "/api/vouchers/validate",
    request_body = ValidateVoucherBody,
    responses(
        (status = 200, description = "Voucher applies; discount and final amount"),
        (status = 404, description = "Voucher not found", body = ErrorMessage),
        (status = 422, description = "Voucher cannot be applied", body = ErrorMessage),
    )
)]
pub async fn validate_voucher(
    auth: AuthUser,
    body: ValidateVoucherBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let voucher = found(db.find_voucher_by_code(&normalize_code(&body.code))?, "Voucher")?;
    let customer_id = match auth.customer_id() {
        Some(own) => Some(own),
        None if auth.can("vouchers.view") => body.customer_id,
        None => None,
    };
    let customer_uses = match customer_id {
        Some(customer_id) => db.customer_voucher_usage_count(voucher.id, customer_id)?,
        None => 0,
    };
    if let Some(reason) = voucher_rejection(&voucher, customer_uses, body.amount, now()) {
        return Err(AppError::field("code", &reason).into());
    }

    let discount = voucher_discount(&voucher, body.amount);
    respond_with(
        json!({
            "voucher": voucher,
            "amount": body.amount,
            "discount_amount": discount,
            "final_amount": round2(body.amount - discount),
        }),
        "Voucher is valid",
        StatusCode::OK,
    )
}

#[cfg(test)]
mod tests {
    use super::normalize_code;

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_code("  hemat10 "), "HEMAT10");
    }
}
