// handlers/mod.rs - HTTP handlers
//
// The service exposes a single method-routed sync endpoint plus a liveness
// probe. Routing and shared middleware live in app.rs.

pub mod health;
pub mod sheet_sync;

pub use health::{health, not_found};
pub use sheet_sync::sheet_sync;
