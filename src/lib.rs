// Library for tests to access modules

pub mod cli;
pub mod config;
pub mod console_repo;
pub mod diagnose;
pub mod fetch;
pub mod jvm_repo;
pub mod log_scan;
pub mod models;
pub mod monitor;
pub mod proc_repo;
pub mod report;
pub mod sink;
pub mod trend;
pub mod version;
