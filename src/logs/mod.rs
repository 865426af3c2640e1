// Public API - what other modules can use
pub use handlers::{create_log, delete_log, list_logs, update_log, upload_video};

// Internal modules
pub mod content;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
pub mod upload;
