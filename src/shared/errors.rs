use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use std::{collections::BTreeMap, convert::Infallible, fmt};
use utoipa::ToSchema;
use warp::{body::BodyDeserializeError, http::StatusCode, reject::Reject, Rejection, Reply};

pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    BadRequest,
    AuthError,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    TooManyRequests,
    Internal,
}

#[derive(Debug)]
pub struct AppError {
    pub message: String,
    pub err_type: ErrorType,
    pub errors: Option<FieldErrors>,
}

impl AppError {
    pub fn new(message: &str, err_type: ErrorType) -> AppError {
        AppError {
            message: message.to_string(),
            err_type,
            errors: None,
        }
    }

    pub fn not_found(what: &str) -> AppError {
        AppError::new(&format!("{} not found", what), ErrorType::NotFound)
    }

    pub fn unauthenticated() -> AppError {
        AppError::new("Unauthenticated", ErrorType::AuthError)
    }

    /// Single-field validation failure.
    pub fn field(field: &str, message: &str) -> AppError {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        AppError::validation(errors)
    }

    pub fn validation(errors: FieldErrors) -> AppError {
        let message = errors
            .values()
            .flat_map(|messages| messages.first())
            .next()
            .cloned()
            .unwrap_or_else(|| String::from("The given data was invalid."));
        AppError {
            message,
            err_type: ErrorType::Validation,
            errors: Some(errors),
        }
    }

    pub fn from_diesel_err(err: DieselError, context: &str) -> AppError {
        match err {
            DieselError::NotFound => AppError::new(
                &format!("{} record not found", context),
                ErrorType::NotFound,
            ),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let field = unique_violation_field(info.message());
                AppError::field(
                    &field,
                    &format!("The {} has already been taken.", field.replace('_', " ")),
                )
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                AppError::new(
                    &format!("{} references a missing record", context),
                    ErrorType::BadRequest,
                )
            }
            err => {
                log::error!("{} {}", context, err);
                AppError::new(
                    &format!("{} database error", context),
                    ErrorType::Internal,
                )
            }
        }
    }

    pub fn to_http_status(&self) -> StatusCode {
        match self.err_type {
            ErrorType::BadRequest => StatusCode::BAD_REQUEST,
            ErrorType::AuthError => StatusCode::UNAUTHORIZED,
            ErrorType::Forbidden => StatusCode::FORBIDDEN,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::Conflict => StatusCode::CONFLICT,
            ErrorType::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorType::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// "UNIQUE constraint failed: users.email" -> "email"
fn unique_violation_field(message: &str) -> String {
    message
        .rsplit(": ")
        .next()
        .and_then(|columns| columns.split(',').next())
        .and_then(|column| column.trim().rsplit('.').next())
        .filter(|column| !column.is_empty())
        .unwrap_or("value")
        .to_string()
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl Reject for AppError {}

impl From<DieselError> for AppError {
    fn from(err: DieselError) -> AppError {
        AppError::from_diesel_err(err, "While querying:")
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> AppError {
        let mut fields = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let messages = field_errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("The {} field is invalid ({}).", field, e.code),
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        AppError::validation(fields)
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorMessage {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

fn error_reply(status: StatusCode, message: String, errors: Option<FieldErrors>) -> warp::reply::Response {
    let json = warp::reply::json(&ErrorMessage {
        success: false,
        message,
        errors,
    });
    warp::reply::with_status(json, status).into_response()
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(app_err) = err.find::<AppError>() {
        let status = app_err.to_http_status();
        if status.is_server_error() {
            log::error!("{}", app_err.message);
        }
        return Ok(error_reply(status, app_err.message.clone(), app_err.errors.clone()));
    }

    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, String::from("Not Found"), None));
    }

    if err.find::<warp_rate_limit::RateLimitRejection>().is_some() {
        return Ok(error_reply(
            StatusCode::TOO_MANY_REQUESTS,
            String::from("Too Many Attempts."),
            None,
        ));
    }

    if let Some(e) = err.find::<BodyDeserializeError>() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            format!("Malformed JSON body: {}", e),
            None,
        ));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            String::from("Payload too large"),
            None,
        ));
    }

    if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, e.to_string(), None));
    }

    if err.find::<warp::reject::MissingHeader>().is_some() {
        return Ok(error_reply(
            StatusCode::UNAUTHORIZED,
            String::from("Unauthenticated"),
            None,
        ));
    }

    if err.find::<warp::reject::LengthRequired>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            String::from("Expected a JSON body"),
            None,
        ));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            String::from("Method Not Allowed"),
            None,
        ));
    }

    log::error!("Unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        String::from("Internal Server Error"),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_names_the_column() {
        assert_eq!(unique_violation_field("UNIQUE constraint failed: users.email"), "email");
        assert_eq!(
            unique_violation_field("UNIQUE constraint failed: tip_engagements.tip_id, tip_engagements.customer_id"),
            "tip_id"
        );
        assert_eq!(unique_violation_field(""), "value");
    }

    #[test]
    fn validation_message_is_first_field_error() {
        let mut errors = FieldErrors::new();
        errors.insert("email".into(), vec!["The email has already been taken.".into()]);
        errors.insert("name".into(), vec!["The name field is required.".into()]);
        let err = AppError::validation(errors);
        assert_eq!(err.message, "The email has already been taken.");
        assert_eq!(err.to_http_status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn diesel_not_found_maps_to_404() {
        let err = AppError::from_diesel_err(DieselError::NotFound, "Customer");
        assert_eq!(err.to_http_status(), StatusCode::NOT_FOUND);
    }
}
