pub mod app;
pub mod config;
pub mod db;
pub mod mollie;
pub mod report_worker;
pub mod setup;
