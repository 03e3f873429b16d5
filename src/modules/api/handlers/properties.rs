use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, CreatePropertyBody, ListQuery, UpdatePropertyBody},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{NewProperty, PropertyChangeset},
            DBAccessManager, PageRequest, PropertyFilter,
        },
        errors::AppError,
        utils::{generate_number, new_uuid, now},
    },
};
use warp::{http::StatusCode, reply::Response, Rejection};

pub async fn list_properties(
    _auth: AuthUser,
    query: ListQuery,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let filter = PropertyFilter {
        customer_id: query.customer_id,
        status: non_empty(query.status),
        property_type: non_empty(query.property_type),
        search: non_empty(query.search),
    };
    respond(
        db.list_properties(&filter, PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}

pub async fn get_property(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(found(db.find_property_by_uuid(&uuid)?, "Property"), StatusCode::OK)
}

pub async fn create_property(
    _auth: AuthUser,
    body: CreatePropertyBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let customer = db
        .find_customer_by_id(body.customer_id)?
        .ok_or_else(|| AppError::field("customer_id", "The selected customer id is invalid."))?;

    let at = now();
    let property = db.create_property(NewProperty {
        uuid: new_uuid(),
        customer_id: customer.id,
        property_name: body.property_name.trim().to_string(),
        property_number: generate_number("PROP", 10),
        property_type: body.property_type,
        address: body.address,
        city: body.city,
        province: body.province,
        postal_code: body.postal_code,
        latitude: body.latitude,
        longitude: body.longitude,
        area_size: body.area_size,
        occupants: body.occupants,
        status: body.status.unwrap_or_else(|| String::from("active")),
        metadata: body.metadata.map(Json),
        created_at: at,
        updated_at: at,
    })?;
    respond_with(property, "Property created successfully", StatusCode::CREATED)
}

pub async fn update_property(
    uuid: String,
    _auth: AuthUser,
    body: UpdatePropertyBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let property = found(db.find_property_by_uuid(&uuid)?, "Property")?;
    let updated = db.update_property(
        property.id,
        PropertyChangeset {
            property_name: body.property_name,
            property_type: body.property_type,
            address: body.address,
            city: body.city,
            province: body.province,
            postal_code: body.postal_code,
            latitude: body.latitude,
            longitude: body.longitude,
            area_size: body.area_size,
            occupants: body.occupants,
            status: body.status,
            metadata: body.metadata.map(Json),
            updated_at: Some(now()),
        },
    )?;
    respond_with(updated, "Property updated successfully", StatusCode::OK)
}

pub async fn delete_property(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let property = found(db.find_property_by_uuid(&uuid)?, "Property")?;
    db.soft_delete_property(property.id)?;
    respond_message("Property deleted successfully")
}
