use super::non_empty;
use crate::{
    modules::api::{filters::AuthUser, models::ActivityQuery, responder::respond},
    shared::db::{DBAccessManager, PageRequest},
};
use warp::{http::StatusCode, reply::Response, Rejection};

pub async fn list_activities(_auth: AuthUser, query: ActivityQuery, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let activity_type = non_empty(query.activity_type);
    respond(
        db.list_activities(activity_type.as_deref(), PageRequest::new(query.page, query.per_page)),
        StatusCode::OK,
    )
}
