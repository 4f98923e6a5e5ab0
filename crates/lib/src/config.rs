//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.whatsapp-service/config.json`) and environment.
//! Environment values always win over the file so deployments can keep secrets out of it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Twilio account and WhatsApp sender.
    #[serde(default)]
    pub twilio: TwilioConfig,
}

/// Service bind, port, and auth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Port for the HTTP tool surface (default 2022).
    #[serde(default = "default_service_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_service_bind")]
    pub bind: String,

    /// Auth settings. When absent, defaults to no auth for loopback bind.
    #[serde(default)]
    pub auth: ServiceAuthConfig,
}

/// Service auth: bearer token or none (loopback-only when none).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAuthConfig {
    /// "none" = no API key (only safe when bind is loopback). "token" = require `Authorization: Bearer`.
    #[serde(default)]
    pub mode: ServiceAuthMode,

    /// API key callers must present. Overridden by WHATSAPP_SERVICE_API_KEY env.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAuthMode {
    /// No auth; allow only when bind is loopback.
    #[default]
    None,

    /// Require a bearer token matching the configured API key.
    Token,
}

/// Twilio settings. Every field is overridden by its environment variable when set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwilioConfig {
    /// Account SID (TWILIO_ACCOUNT_SID).
    pub account_sid: Option<String>,
    /// Auth token (TWILIO_AUTH_TOKEN).
    pub auth_token: Option<String>,
    /// Sender number in E.164, without the `whatsapp:` prefix (TWILIO_WHATSAPP_NUMBER).
    pub whatsapp_number: Option<String>,
    /// REST API base URL (TWILIO_API_BASE); defaults to https://api.twilio.com.
    pub api_base: Option<String>,
}

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

fn default_service_port() -> u16 {
    2022
}

fn default_service_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: default_service_port(),
            bind: default_service_bind(),
            auth: ServiceAuthConfig::default(),
        }
    }
}

/// Read an env var, treating unset and blank the same.
pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Trimmed config value, `None` when blank.
pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the service API key: env WHATSAPP_SERVICE_API_KEY overrides config.
pub fn resolve_service_token(config: &Config) -> Option<String> {
    non_empty_env("WHATSAPP_SERVICE_API_KEY")
        .or_else(|| non_empty(config.service.auth.token.as_ref()))
}

/// Resolve the Twilio API base URL: env TWILIO_API_BASE overrides config. Trailing slash removed.
pub fn resolve_twilio_api_base(config: &Config) -> String {
    non_empty_env("TWILIO_API_BASE")
        .or_else(|| non_empty(config.twilio.api_base.as_ref()))
        .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("WHATSAPP_SERVICE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".whatsapp-service").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or WHATSAPP_SERVICE_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
