// Public API - what other modules can use
pub use handlers::{login, signup};
pub use middleware::{optional_identity, require_auth, AUTH_HEADER};
pub use token::TokenConfig;
pub use types::{AuthUser, Claims};

// Internal modules
mod handlers;
mod middleware;
pub mod password;
pub mod service;
mod token;
pub mod types;
