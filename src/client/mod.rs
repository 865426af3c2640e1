//! Typed client for the HTTP API.
//!
//! Authenticated calls take the [`ClientSession`] explicitly, so an expired
//! session is caught locally before any request is sent.

pub use api::{ApiClient, VideoFields};
pub use error::ClientError;
pub use notifications::{new_logs_since, NewLogs};
pub use session::ClientSession;

mod api;
mod error;
mod notifications;
mod session;
