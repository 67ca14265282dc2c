pub mod app;
pub mod app_dirs;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod quiz;
pub mod runtime;
pub mod session;
pub mod ui;
