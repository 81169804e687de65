use utoipa::openapi::{OpenApi as OpenApiSpec, Server};
use utoipa::OpenApi;

use crate::config::Config;
use crate::error::{ValidationErrorDetail, ValidationErrorResponse};
use crate::handlers;
use crate::models::{MessageResponse, UserResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "greeting-api",
        version = "0.1.0",
        description = "A minimal greeting and user-echo HTTP API"
    ),
    paths(
        handlers::root::root_handler,
        handlers::users::list_users_handler,
        handlers::users::get_user_handler
    ),
    components(
        schemas(
            MessageResponse,
            UserResponse,
            ValidationErrorResponse,
            ValidationErrorDetail
        )
    ),
    tags(
        (name = "root", description = "Greeting"),
        (name = "users", description = "User operations")
    )
)]
pub struct ApiDoc;

/// Build the published document. With a stage configured, the only server
/// listed is `/<stage>`; route paths themselves stay unprefixed.
pub fn openapi(config: &Config) -> OpenApiSpec {
    let mut doc = ApiDoc::openapi();
    if config.stage.is_some() {
        doc.servers = Some(vec![Server::new(config.root_path())]);
    }
    doc
}
