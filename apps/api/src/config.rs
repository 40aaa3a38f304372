use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Application configuration loaded from environment variables.
/// Startup aborts if a required credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    /// OAuth client id handed to the frontend for Google sign-in.
    pub google_client_id: String,
    pub google_userinfo_url: String,
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    /// Sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_url: optional_env("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            google_client_id: require_env("GOOGLE_CLIENT_ID")?,
            google_userinfo_url: optional_env("GOOGLE_USERINFO_URL", DEFAULT_GOOGLE_USERINFO_URL),
            data_dir: PathBuf::from(optional_env("DATA_DIR", "data")),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            session_idle_timeout: Duration::from_secs(
                60 * optional_env("SESSION_IDLE_MINUTES", "60")
                    .parse::<u64>()
                    .context("SESSION_IDLE_MINUTES must be a whole number of minutes")?,
            ),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
