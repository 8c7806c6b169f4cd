pub mod client;
pub mod rdb;
pub mod rows;
