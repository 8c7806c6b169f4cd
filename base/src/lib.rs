pub mod error;
pub mod hook_event;
pub mod limits;
pub mod permissions;
pub mod settings;

pub static APP_NAME: &str = "bifrost";
pub static APP_FRONT_NAME: &str = "bifrost-front";
