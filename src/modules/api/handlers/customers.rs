use super::{found, non_empty, record_activity, ActivityEntry};
use crate::{
    modules::api::{
        filters::{AuthUser, ClientInfo},
        models::{validated, CreateCustomerBody, ListQuery, UpdateCustomerBody},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{CustomerChangeset, NewCustomer},
            CustomerFilter, DBAccessManager, PageRequest,
        },
        errors::{AppError, ErrorMessage},
        utils::{generate_number, new_uuid, now},
    },
};
use serde_json::json;
use warp::{http::StatusCode, reply::Response, Rejection};

#[utoipa::path(
    get,
    path = "/api/customers",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated customers"),
        (status = 403, description = "Missing customers.view", body = ErrorMessage),
    )
)]
pub async fn list_customers(
    _auth: AuthUser,
    query: ListQuery,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let filter = CustomerFilter {
        status: non_empty(query.status),
        search: non_empty(query.search),
        city: non_empty(query.city),
    };
    respond(
        db.list_customers(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn get_customer(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(found(db.find_customer_by_uuid(&uuid)?, "Customer"), StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerBody,
    responses(
        (status = 201, description = "Customer created successfully"),
        (status = 422, description = "Validation errors", body = ErrorMessage),
    )
)]
pub async fn create_customer(
    auth: AuthUser,
    body: CreateCustomerBody,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let user = db
        .find_user_by_id(body.user_id)?
        .ok_or_else(|| AppError::field("user_id", "The selected user id is invalid."))?;
    if db.customer_for_user(user.id)?.is_some() {
        return Err(AppError::field("user_id", "The user already has a customer profile.").into());
    }
    let email = body.email.trim().to_lowercase();
    if db.customer_email_taken(&email, None)? {
        return Err(AppError::field("email", "The email has already been taken.").into());
    }

    let at = now();
    let customer = db.create_customer(NewCustomer {
        uuid: new_uuid(),
        user_id: user.id,
        customer_number: generate_number("CUST", 8),
        full_name: body.full_name.trim().to_string(),
        email,
        phone: body.phone,
        address: body.address,
        city: body.city,
        province: body.province,
        postal_code: body.postal_code,
        balance: 0.0,
        status: body.status.unwrap_or_else(|| String::from("active")),
        metadata: body.metadata.map(Json),
        created_at: at,
        updated_at: at,
    })?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "customer",
            subject_id: customer.id,
            activity_type: "customer_created",
            action: "create",
            description: format!("Customer {} created", customer.customer_number),
            properties: None,
        },
        &client,
    );
    respond_with(customer, "Customer created successfully", StatusCode::CREATED)
}

pub async fn update_customer(
    uuid: String,
    auth: AuthUser,
    body: UpdateCustomerBody,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let customer = found(db.find_customer_by_uuid(&uuid)?, "Customer")?;
    let email = body.email.map(|email| email.trim().to_lowercase());
    if let Some(email) = &email {
        if db.customer_email_taken(email, Some(customer.id))? {
            return Err(AppError::field("email", "The email has already been taken.").into());
        }
    }

    let updated = db.update_customer(
        customer.id,
        CustomerChangeset {
            full_name: body.full_name,
            email,
            phone: body.phone,
            address: body.address,
            city: body.city,
            province: body.province,
            postal_code: body.postal_code,
            status: body.status.clone(),
            metadata: body.metadata.map(Json),
            updated_at: Some(now()),
        },
    )?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "customer",
            subject_id: updated.id,
            activity_type: "customer_updated",
            action: "update",
            description: format!("Customer {} updated", updated.customer_number),
            properties: body.status.map(|status| json!({ "status": status })),
        },
        &client,
    );
    respond_with(updated, "Customer updated successfully", StatusCode::OK)
}

pub async fn delete_customer(
    uuid: String,
    auth: AuthUser,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let customer = found(db.find_customer_by_uuid(&uuid)?, "Customer")?;
    db.soft_delete_customer(customer.id)?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "customer",
            subject_id: customer.id,
            activity_type: "customer_deleted",
            action: "delete",
            description: format!("Customer {} deleted", customer.customer_number),
            properties: None,
        },
        &client,
    );
    respond_message("Customer deleted successfully")
}
