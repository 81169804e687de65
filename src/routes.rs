// Route path constants - single source of truth for all API paths

pub const ROOT: &str = "/";
pub const USERS: &str = "/users";
pub const USER_ITEM: &str = "/users/{user_id}";

pub const OPENAPI_JSON: &str = "/openapi.json";
pub const DOCS: &str = "/docs";
