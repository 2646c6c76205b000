// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

/// Interval between two countdown ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Remaining seconds at or below which the countdown is shown as running low.
pub const LOW_TIME_THRESHOLD_SECS: u32 = 60;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the quiz backend, e.g. `https://lms.example.com/api`.
    pub api_url: Url,
    /// Bearer token sent with every request.
    pub api_token: String,
    pub http_timeout: Duration,
    pub rust_log: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let api_url = env::var("QUIZ_API_URL")
            .map_err(|_| AppError::Config("QUIZ_API_URL must be set".to_string()))?;
        let api_url = Url::parse(&api_url)?;

        let api_token = env::var("QUIZ_API_TOKEN")
            .map_err(|_| AppError::Config("QUIZ_API_TOKEN must be set".to_string()))?;

        let http_timeout = match env::var("QUIZ_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("QUIZ_HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Self {
            api_url,
            api_token,
            http_timeout: Duration::from_secs(http_timeout),
            rust_log,
            log_dir,
        })
    }
}
