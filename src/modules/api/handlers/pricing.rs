use super::found;
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, CalculateBody, PricingTierBody, UpdatePricingTierBody},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        billing::{compute_bill, validate_ranges, Bill, PriceRange, PricingModel},
        db::{
            json::Json,
            models::{NewPricingTier, PricingTier, PricingTierChangeset},
            seed::seed_default_pricing,
            DBAccessManager,
        },
        errors::{AppError, ErrorMessage, ErrorType},
        utils::{new_uuid, now},
    },
};
use serde_json::json;
use warp::{http::StatusCode, reply::Response, Rejection};

pub fn tier_ranges(tier: &PricingTier) -> Result<Vec<PriceRange>, AppError> {
    serde_json::from_value(tier.price_ranges.0.clone()).map_err(|err| {
        AppError::new(
            &format!("Stored price ranges of tier {} are invalid: {}", tier.uuid, err),
            ErrorType::Internal,
        )
    })
}

fn checked_ranges(ranges: &[PriceRange]) -> Result<Json, AppError> {
    validate_ranges(ranges).map_err(|message| AppError::field("price_ranges", &message))?;
    serde_json::to_value(ranges).map(Json).map_err(|err| {
        AppError::new(
            &format!("Error serializing price ranges: {}", err),
            ErrorType::Internal,
        )
    })
}

pub async fn list_tiers(_auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(db.list_pricing_tiers(false), StatusCode::OK)
}

pub async fn create_tier(
    _auth: AuthUser,
    body: PricingTierBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let price_ranges = checked_ranges(&body.price_ranges)?;
    let at = now();
    let tier = db.create_pricing_tier(NewPricingTier {
        uuid: new_uuid(),
        tier_name: body.tier_name.trim().to_string(),
        customer_tier: body.customer_tier,
        pricing_model: body.pricing_model,
        price_ranges,
        admin_fee: body.admin_fee,
        minimum_charge: body.minimum_charge,
        description: body.description,
        is_active: body.is_active.unwrap_or(true),
        created_at: at,
        updated_at: at,
    })?;
    respond_with(tier, "Pricing tier created successfully", StatusCode::CREATED)
}

pub async fn update_tier(
    uuid: String,
    _auth: AuthUser,
    body: UpdatePricingTierBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let tier = found(db.find_pricing_tier_by_uuid(&uuid)?, "Pricing tier")?;
    let price_ranges = match &body.price_ranges {
        Some(ranges) => Some(checked_ranges(ranges)?),
        None => None,
    };
    let updated = db.update_pricing_tier(
        &tier,
        PricingTierChangeset {
            tier_name: body.tier_name,
            customer_tier: body.customer_tier,
            pricing_model: body.pricing_model,
            price_ranges,
            admin_fee: body.admin_fee,
            minimum_charge: body.minimum_charge,
            description: body.description,
            is_active: body.is_active,
            updated_at: None,
        },
    )?;
    respond_with(updated, "Pricing tier updated successfully", StatusCode::OK)
}

pub async fn delete_tier(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let tier = found(db.find_pricing_tier_by_uuid(&uuid)?, "Pricing tier")?;
    db.soft_delete_pricing_tier(tier.id)?;
    respond_message("Pricing tier deleted successfully")
}

#[utoipa::path(
    post,
    path = "/api/pricing/calculate",
    request_body = CalculateBody,
    responses(
        (status = 200, description = "Bill for the volume under the active tier", body = Bill),
        (status = 404, description = "No active tier for the customer tier", body = ErrorMessage),
        (status = 422, description = "Validation errors", body = ErrorMessage),
    )
)]
pub async fn calculate(_auth: AuthUser, body: CalculateBody, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let tier = found(db.active_tier_for(&body.customer_tier)?, "Active pricing tier")?;
    let model = PricingModel::parse(&tier.pricing_model).unwrap_or(PricingModel::Tiered);
    let ranges = tier_ranges(&tier)?;
    let bill = compute_bill(model, &ranges, tier.admin_fee, tier.minimum_charge, body.usage_volume);
    respond(Ok(json!({ "tier": tier, "bill": bill })), StatusCode::OK)
}

pub async fn seed_defaults(_auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let created = seed_default_pricing(&mut db)?;
    respond_with(
        json!({ "created": created }),
        "Default pricing tiers installed",
        StatusCode::OK,
    )
}
