pub mod config;
pub mod error;
pub mod key_value_store;
pub mod storage;
