pub mod rdb;
pub mod rows;
