use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Response type for the fixed-message endpoints
#[derive(Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Response type for GET /users/{user_id}
///
/// `user` is an integer of any size, serialized as a bare JSON number.
#[derive(Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(value_type = i64)]
    pub user: Number,
}
