use super::{found, non_empty};
use crate::{
    modules::api::{
        filters::AuthUser,
        models::{validated, CreateTipBody, EngageBody, TipQuery, UpdateTipBody},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        db::{
            json::Json,
            models::{NewTip, Tip, TipChangeset},
            DBAccessManager, PageRequest, TipFilter,
        },
        engagement::EngagementAction,
        errors::{AppError, ErrorMessage, ErrorType},
        utils::{new_uuid, now},
    },
};
use serde_json::Value;
use warp::{http::StatusCode, reply::Response, Rejection};

const PUBLISHED: &str = "published";
const DEFAULT_RANDOM: i64 = 3;
const MAX_RANDOM: i64 = 20;

fn string_list(items: Vec<String>) -> Option<Json> {
    let items: Vec<Value> = items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .map(Value::String)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(Json(Value::Array(items)))
    }
}

fn published_filter(query: TipQuery) -> TipFilter {
    TipFilter {
        category: non_empty(query.category),
        difficulty: non_empty(query.difficulty),
        status: Some(PUBLISHED.to_string()),
        search: non_empty(query.search),
    }
}

/// Drafts are visible to tip editors only.
fn visible_tip(db: &mut DBAccessManager, auth: &AuthUser, uuid: &str) -> Result<Tip, AppError> {
    let tip = found(db.find_tip_by_uuid(uuid)?, "Tip")?;
    if tip.status != PUBLISHED && !auth.can("tips.edit") {
        return Err(AppError::not_found("Tip"));
    }
    Ok(tip)
}

#[utoipa::path(
    get,
    path = "/api/tips",
    params(TipQuery),
    responses((status = 200, description = "Published tips, most liked first"))
)]
pub async fn list_tips(_auth: AuthUser, query: TipQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let page = PageRequest::new(query.page, query.per_page);
    respond(db.list_tips(&published_filter(query), page), StatusCode::OK)
}

pub async fn random_tips(_auth: AuthUser, query: TipQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let limit = query.limit.unwrap_or(DEFAULT_RANDOM).clamp(1, MAX_RANDOM);
    respond(db.random_tips(&published_filter(query), limit), StatusCode::OK)
}

pub async fn get_tip(uuid: String, auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let tip = visible_tip(&mut db, &auth, &uuid)?;
    respond(db.increment_tip_views(tip.id), StatusCode::OK)
}

pub async fn create_tip(_auth: AuthUser, body: CreateTipBody, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let at = now();
    let tip = db.create_tip(NewTip {
        uuid: new_uuid(),
        title: body.title.trim().to_string(),
        description: body.description,
        category: body.category.trim().to_string(),
        difficulty: body.difficulty,
        potential_savings_percentage: body.potential_savings_percentage,
        implementation_time: body.implementation_time,
        implementation_steps: string_list(body.implementation_steps),
        benefits: string_list(body.benefits),
        required_tools: string_list(body.required_tools),
        tags: string_list(body.tags),
        status: body.status.unwrap_or_else(|| PUBLISHED.to_string()),
        created_at: at,
        updated_at: at,
    })?;
    respond_with(tip, "Tip created successfully", StatusCode::CREATED)
}

pub async fn update_tip(
    uuid: String,
    _auth: AuthUser,
    body: UpdateTipBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let tip = found(db.find_tip_by_uuid(&uuid)?, "Tip")?;
    let updated = db.update_tip(
        tip.id,
        TipChangeset {
            title: body.title,
            description: body.description,
            category: body.category,
            difficulty: body.difficulty,
            potential_savings_percentage: body.potential_savings_percentage,
            implementation_time: body.implementation_time,
            implementation_steps: body.implementation_steps.and_then(string_list),
            benefits: body.benefits.and_then(string_list),
            required_tools: body.required_tools.and_then(string_list),
            tags: body.tags.and_then(string_list),
            status: body.status,
            updated_at: None,
        },
    )?;
    respond_with(updated, "Tip updated successfully", StatusCode::OK)
}

pub async fn delete_tip(uuid: String, _auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let tip = found(db.find_tip_by_uuid(&uuid)?, "Tip")?;
    db.soft_delete_tip(tip.id)?;
    respond_message("Tip deleted successfully")
}

#[utoipa::path(
    post,
    path = "/api/tips/{uuid}/engage",
    request_body = EngageBody,
    params(("uuid" = String, Path, description = "Tip UUID")),
    responses(
        (status = 200, description = "Engagement state and updated counters"),
        (status = 403, description = "Caller has no customer record", body = ErrorMessage),
        (status = 422, description = "Unknown action", body = ErrorMessage),
    )
)]
pub async fn engage_tip(
    uuid: String,
    auth: AuthUser,
    body: EngageBody,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let action = EngagementAction::parse(body.action.trim())
        .ok_or_else(|| AppError::field("action", "The selected action is invalid."))?;
    let customer_id = auth
        .customer_id()
        .ok_or_else(|| AppError::new("Only customers can engage with tips", ErrorType::Forbidden))?;
    let tip = visible_tip(&mut db, &auth, &uuid)?;
    let outcome = db.engage_tip(tip.id, customer_id, action, non_empty(body.notes), body.rating)?;
    respond_with(outcome, "Engagement recorded", StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::string_list;
    use serde_json::json;

    #[test]
    fn blank_list_items_are_dropped() {
        let list = string_list(vec![" Fix leaks ".into(), "  ".into()]).map(|j| j.0);
        assert_eq!(list, Some(json!(["Fix leaks"])));
        assert!(string_list(vec![String::new()]).is_none());
    }
}
