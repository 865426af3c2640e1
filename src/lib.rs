// Library crate for the LogAnything API server
// This file exposes the public API for integration tests and the client

pub mod ai;
pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod logs;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use config::AppConfig;
pub use shared::{AppError, AppState};
