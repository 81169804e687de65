use crate::models::MessageResponse;
use crate::routes;
use axum::{http::StatusCode, Json};

pub const GREETING: &str = "Hello World";

/// GET / handler - Greeting
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Fixed greeting", body = MessageResponse)
    ),
    tag = "root"
)]
pub async fn root_handler() -> (StatusCode, Json<MessageResponse>) {
    tracing::debug!("Serving greeting");
    (StatusCode::OK, Json(MessageResponse::new(GREETING)))
}
