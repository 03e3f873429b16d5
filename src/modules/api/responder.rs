use bytes::Bytes;
use serde::Serialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use warp::{
    http::{header, HeaderValue, StatusCode},
    hyper::Body,
    reply::Response,
    Rejection, Reply,
};

use crate::shared::errors::AppError;

/// `{success: true, data}` with `status`, or the error rejection.
pub fn respond<T: Serialize>(result: Result<T, AppError>, status: StatusCode) -> Result<Response, Rejection> {
    let data = result?;
    Ok(envelope(json!({ "success": true, "data": data }), status))
}

pub fn respond_with<T: Serialize>(data: T, message: &str, status: StatusCode) -> Result<Response, Rejection> {
    Ok(envelope(
        json!({ "success": true, "message": message, "data": data }),
        status,
    ))
}

pub fn respond_message(message: &str) -> Result<Response, Rejection> {
    Ok(envelope(json!({ "success": true, "message": message }), StatusCode::OK))
}

/// Top-level fields instead of a `data` member.
pub fn respond_fields(mut fields: Value, status: StatusCode) -> Result<Response, Rejection> {
    if let Value::Object(map) = &mut fields {
        map.insert(String::from("success"), Value::Bool(true));
    }
    Ok(envelope(fields, status))
}

fn envelope(body: Value, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// Streams `prefix`, the items joined by commas, then `suffix`.
pub fn json_stream<T>(prefix: String, items: Vec<T>, suffix: &'static str) -> Response
where
    T: Serialize + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        yield Ok::<Bytes, Infallible>(Bytes::from(prefix));

        let mut first = true;
        for item in items.iter() {
            match serde_json::to_vec(item) {
                Ok(json) => {
                    if !first {
                        yield Ok(Bytes::from(","));
                    }
                    first = false;
                    yield Ok(Bytes::from(json));
                }
                Err(e) => {
                    log::error!("Serialization error: {:?}", e);
                    break;
                }
            }
        }

        yield Ok(Bytes::from(suffix));
    };

    let body = Body::wrap_stream(stream);
    let mut res = Response::new(body);
    res.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    res
}

pub fn json_array_stream<T>(items: Vec<T>) -> Response
where
    T: Serialize + Send + Sync + 'static,
{
    json_stream(String::from("["), items, "]")
}
