pub mod cache;
pub mod rdb;
#[cfg(any(test, feature = "test-utils"))]
pub mod test;
