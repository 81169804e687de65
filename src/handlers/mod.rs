pub mod root;
pub mod users;

pub use root::root_handler;
pub use users::{get_user_handler, list_users_handler};
