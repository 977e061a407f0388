use actix_web::{error::JsonPayloadError, HttpRequest};
use log::debug;

use crate::errors::ServerError;

/// Order ids arrive as path segments. Anything that isn't an integer is a bad request rather than a missing route.
pub fn parse_order_id(raw: &str) -> Result<i64, ServerError> {
    raw.trim().parse::<i64>().map_err(|_| ServerError::InvalidRequestPath(format!("'{raw}' is not a valid order id")))
}

/// Renders malformed JSON bodies as `400 {message}` instead of actix's plain text response.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Could not deserialize the body of {} {}. {err}", req.method(), req.path());
    ServerError::InvalidRequestBody(format!("Invalid JSON payload. {err}")).into()
}
