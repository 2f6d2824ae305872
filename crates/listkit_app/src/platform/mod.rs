//! Terminal front end: stands in for the list views of the web UI.
mod app;
mod commands;
mod config;
mod effects;
mod logging;
mod records;
mod render;

pub use app::{run_app, Args};
