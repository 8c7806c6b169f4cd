pub mod access_token;
pub mod application;
pub mod refresh_token;
