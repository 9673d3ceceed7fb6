pub mod command_log;
pub mod config;
pub mod error;
pub mod task_store_client;
