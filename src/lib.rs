pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod sheets;
pub mod types;

pub use app::{app, AppState};

#[cfg(test)]
pub mod testing;
