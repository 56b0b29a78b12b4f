// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use thiserror::Error;

/// Number of quizzes requested from the model for one passage.
pub const QUIZ_ITEM_COUNT: usize = 3;

/// Type tag stored on quiz sets and quizzes.
pub const QUIZ_TYPE: &str = "fill_in_the_blank";

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Settings for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 1.0,
            max_output_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    pub gemini: GeminiConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let port = parsed_or("PORT", 3000)?;

        let mut gemini = GeminiConfig::new(required("GEMINI_API_KEY")?);
        if let Ok(base) = env::var("GEMINI_API_BASE") {
            gemini.api_base = base.trim_end_matches('/').to_string();
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            gemini.model = model;
        }
        gemini.temperature = parsed_or("GEMINI_TEMPERATURE", gemini.temperature)?;
        gemini.max_output_tokens = parsed_or("GEMINI_MAX_OUTPUT_TOKENS", gemini.max_output_tokens)?;
        gemini.timeout_secs = parsed_or("GEMINI_TIMEOUT_SECS", gemini.timeout_secs)?;

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            gemini,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parsed_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
