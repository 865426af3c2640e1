// Public API - what other modules can use
pub use handlers::{get_user, update_user};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
