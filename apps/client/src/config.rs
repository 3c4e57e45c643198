use anyhow::{Context, Result};

const DEFAULT_SERVICE_URL: &str = "http://localhost:5000/image-capture";

/// Application configuration loaded from environment variables.
/// Everything has a default so a bare `cargo run` talks to a local service.
#[derive(Debug, Clone)]
pub struct Config {
    pub analysis_service_url: String,
    pub analysis_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            analysis_service_url: env_or("ANALYSIS_SERVICE_URL", DEFAULT_SERVICE_URL),
            analysis_timeout_secs: env_or("ANALYSIS_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
