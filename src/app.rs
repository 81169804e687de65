//! Route table assembly.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc;
use crate::config::Config;
use crate::handlers::{get_user_handler, list_users_handler, root_handler};
use crate::routes;

/// Create the API router.
///
/// The stage in `config` only shows up in the published OpenAPI document;
/// routes are always matched unprefixed.
pub fn create_router(config: &Config) -> Router {
    Router::new()
        .route(routes::ROOT, get(root_handler))
        .route(routes::USERS, get(list_users_handler))
        .route(routes::USER_ITEM, get(get_user_handler))
        .merge(SwaggerUi::new(routes::DOCS).url(routes::OPENAPI_JSON, api_doc::openapi(config)))
        .layer(TraceLayer::new_for_http())
}
