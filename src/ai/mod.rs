// Public API - what other modules can use
pub use backend::{GeminiBackend, GenerativeBackend};
pub use handlers::{ai_root, chat, ping, ChatRequest, ChatResponse};

// Internal modules
mod backend;
mod handlers;
pub mod prompt;
