use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// A single failed check on a request input
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ValidationErrorDetail {
    /// Where the bad input sits, e.g. `["path", "user_id"]`
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub input: String,
}

/// Body returned with 422 Unprocessable Entity
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ValidationErrorResponse {
    pub detail: Vec<ValidationErrorDetail>,
}

/// Custom error type for API endpoints
///
/// Maps request-level failures to HTTP status codes and formats them as
/// JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// `user_id` path segment is not an integer
    InvalidUserId(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidUserId(input) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ValidationErrorDetail {
                    loc: vec!["path".to_string(), "user_id".to_string()],
                    msg: "Input should be a valid integer, unable to parse string as an integer"
                        .to_string(),
                    kind: "int_parsing".to_string(),
                    input,
                },
            ),
        };

        let body = Json(ValidationErrorResponse {
            detail: vec![detail],
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_user_id_body() {
        let response = ApiError::InvalidUserId("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "detail": [{
                    "loc": ["path", "user_id"],
                    "msg": "Input should be a valid integer, unable to parse string as an integer",
                    "type": "int_parsing",
                    "input": "abc"
                }]
            })
        );
    }
}
