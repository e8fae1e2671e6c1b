use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything except the listen port has a usable default so the service
/// boots locally with in-memory storage and file-system assets.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Generative text API key. `None` disables the assist endpoints.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub ai_timeout_secs: u64,
    /// When set, static assets and stylesheets are fetched over HTTP from here.
    pub asset_base_url: Option<String>,
    pub assets_dir: String,
    pub asset_fetch_timeout_secs: u64,
    pub session_ttl_hours: i64,
    /// Minutes between sweeps of expired sessions and orphaned previews.
    pub session_sweep_minutes: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            ai_timeout_secs: parse_env("AI_TIMEOUT_SECS", 10)?,
            asset_base_url: optional_env("ASSET_BASE_URL"),
            assets_dir: std::env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".to_string()),
            asset_fetch_timeout_secs: parse_env("ASSET_FETCH_TIMEOUT_SECS", 5)?,
            session_ttl_hours: parse_env("SESSION_TTL_HOURS", 720)?,
            session_sweep_minutes: parse_env("SESSION_SWEEP_MINUTES", 30)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Base URL rendered pages use for images that were not embedded.
    /// Without `ASSET_BASE_URL` this is the locally served `/assets` mount.
    pub fn public_asset_base(&self) -> &str {
        self.asset_base_url.as_deref().unwrap_or(LOCAL_ASSET_MOUNT)
    }
}

/// Path under which `ASSETS_DIR` is served when no asset base URL is set.
pub const LOCAL_ASSET_MOUNT: &str = "/assets";

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or_default(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_or_default<T>(key: &str, raw: Option<&str>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{v}'")),
    }
}
