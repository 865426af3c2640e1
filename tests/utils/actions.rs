#![allow(dead_code)] // Test utilities may not all be used in every test

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use loganything::auth::AUTH_HEADER;

use super::setup::TestServer;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and returns the status with the body parsed as JSON (Null if not JSON)
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = token {
            request = request.header(AUTH_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.unwrap();
        let status = response.status();
        let text = response.text().await.unwrap();
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn signup(&self, first_name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({
                "firstName": first_name,
                "lastName": "Tester",
                "username": first_name.to_lowercase(),
                "email": email,
                "password": password
            })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Signs up and logs in, returning the token
    pub async fn register(&self, first_name: &str, email: &str) -> String {
        let (status, _) = self.signup(first_name, email, "pw123456").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.login(email, "pw123456").await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_log(&self, token: &str, log: Value) -> Value {
        let (status, body) = self.call(Method::POST, "/logs", Some(token), Some(log)).await;
        assert_eq!(status, StatusCode::OK, "create_log failed: {}", body);
        body["log"].clone()
    }

    pub async fn list_logs(&self, token: &str) -> Vec<Value> {
        let (status, body) = self.call(Method::GET, "/logs", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().cloned().unwrap()
    }
}
