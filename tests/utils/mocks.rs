#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use loganything::{ai::GenerativeBackend, AppError};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Answers every generation request with a fixed reply and records the prompts
pub struct MockGenerativeBackend {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerativeBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for MockGenerativeBackend {
    async fn generate(&self, payload: Value) -> Result<Value, AppError> {
        let prompt = payload
            .pointer("/contents/0/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.prompts.lock().unwrap().push(prompt);

        Ok(json!({
            "candidates": [{ "content": { "parts": [{ "text": self.reply }] } }]
        }))
    }
}
