pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod logs;
pub mod memory;
pub mod reminders;
pub mod schedules;
pub mod state;
pub mod validate;
