use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Settings for the generative-AI upstream
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Full endpoint override; built from `model` and `api_key` when absent
    pub api_url: Option<String>,
}

impl GeminiConfig {
    pub fn endpoint(&self) -> String {
        self.api_url.clone().unwrap_or_else(|| {
            format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
                self.model, self.api_key
            )
        })
    }
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub database_url: Option<String>,
    pub upload_dir: PathBuf,
    pub gemini: Option<GeminiConfig>,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?;

        let port = match get("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidVar {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let token_ttl_minutes = match get("TOKEN_TTL_MINUTES") {
            Some(value) => match value.parse::<i64>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: "TOKEN_TTL_MINUTES",
                        value,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let gemini = get("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_url: get("GEMINI_API_URL"),
        });

        Ok(Self {
            port,
            jwt_secret,
            token_ttl_minutes,
            database_url: get("DATABASE_URL"),
            upload_dir: PathBuf::from(
                get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            gemini,
        })
    }
}
