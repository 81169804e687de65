use crate::error::{ApiError, ValidationErrorResponse};
use crate::models::{MessageResponse, UserResponse};
use crate::routes;
use axum::{extract::Path, http::StatusCode, Json};
use serde_json::Number;
use std::str::FromStr;

pub const USERS_MESSAGE: &str = "Get Users!";

/// GET /users handler - Static user-list message
#[utoipa::path(
    get,
    path = routes::USERS,
    responses(
        (status = 200, description = "Fixed user-list message", body = MessageResponse)
    ),
    tag = "users"
)]
pub async fn list_users_handler() -> (StatusCode, Json<MessageResponse>) {
    (StatusCode::OK, Json(MessageResponse::new(USERS_MESSAGE)))
}

/// GET /users/{user_id} handler - Echo the user id
///
/// The id is not looked up anywhere. Any integer is accepted, whatever its
/// size, and echoed back in canonical form.
#[utoipa::path(
    get,
    path = routes::USER_ITEM,
    params(
        ("user_id" = i64, Path, description = "Integer user id to echo back, any size")
    ),
    responses(
        (status = 200, description = "User id echoed", body = UserResponse),
        (status = 422, description = "user_id is not an integer", body = ValidationErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user_handler(
    Path(user_id_str): Path<String>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = parse_user_id(&user_id_str).ok_or_else(|| {
        tracing::info!("Rejected non-integer user_id: {}", user_id_str);
        ApiError::InvalidUserId(user_id_str.clone())
    })?;

    Ok((StatusCode::OK, Json(UserResponse { user })))
}

/// Parse an integer of arbitrary size: surrounding whitespace, an optional
/// sign, then ASCII digits. Leading zeros, `+` and `-0` are normalized away.
fn parse_user_id(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude = digits.trim_start_matches('0');
    let canonical = match (negative, magnitude) {
        (_, "") => "0".to_string(),
        (true, m) => format!("-{}", m),
        (false, m) => m.to_string(),
    };
    Number::from_str(&canonical).ok()
}
