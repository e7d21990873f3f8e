mod app;
mod config;
mod effects;
mod notify;
mod persistence;
mod render;

pub use app::{run_app, CliArgs};
