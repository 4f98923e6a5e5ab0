//! Twilio credential resolution.
//!
//! All process-wide lookups go through a [`CredentialSource`] so tests can inject
//! fake values without touching the real environment. Credentials are resolved
//! once per invocation and never logged.

use std::collections::HashMap;
use std::fmt;

use crate::config::{non_empty, TwilioConfig};
use crate::error::ToolError;

/// The three settings every operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccountSid,
    AuthToken,
    WhatsappNumber,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::AccountSid,
        CredentialKey::AuthToken,
        CredentialKey::WhatsappNumber,
    ];

    /// Environment variable name for this key.
    pub fn env_var(self) -> &'static str {
        match self {
            CredentialKey::AccountSid => "TWILIO_ACCOUNT_SID",
            CredentialKey::AuthToken => "TWILIO_AUTH_TOKEN",
            CredentialKey::WhatsappNumber => "TWILIO_WHATSAPP_NUMBER",
        }
    }
}

/// Where credential values come from.
pub trait CredentialSource: Send + Sync {
    fn lookup(&self, key: CredentialKey) -> Option<String>;
}

/// Reads an environment variable; `None` when unset.
pub type EnvReader = fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Reads the environment first, then the config file's `twilio` section.
/// Blank values on either side count as unset.
#[derive(Clone)]
pub struct EnvCredentialSource {
    fallback: TwilioConfig,
    env: EnvReader,
}

impl EnvCredentialSource {
    pub fn new(fallback: TwilioConfig) -> Self {
        Self::with_env_reader(fallback, process_env)
    }

    /// Same lookup order, with `env` standing in for the process environment.
    pub fn with_env_reader(fallback: TwilioConfig, env: EnvReader) -> Self {
        Self { fallback, env }
    }
}

impl fmt::Debug for EnvCredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentialSource")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new(TwilioConfig::default())
    }
}

impl CredentialSource for EnvCredentialSource {
    fn lookup(&self, key: CredentialKey) -> Option<String> {
        non_empty((self.env)(key.env_var()).as_ref()).or_else(|| {
            let v = match key {
                CredentialKey::AccountSid => self.fallback.account_sid.as_ref(),
                CredentialKey::AuthToken => self.fallback.auth_token.as_ref(),
                CredentialKey::WhatsappNumber => self.fallback.whatsapp_number.as_ref(),
            };
            non_empty(v)
        })
    }
}

/// Fixed values, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialSource {
    values: HashMap<CredentialKey, String>,
}

impl StaticCredentialSource {
    pub fn new(account_sid: &str, auth_token: &str, whatsapp_number: &str) -> Self {
        Self::default()
            .with(CredentialKey::AccountSid, account_sid)
            .with(CredentialKey::AuthToken, auth_token)
            .with(CredentialKey::WhatsappNumber, whatsapp_number)
    }

    pub fn with(mut self, key: CredentialKey, value: &str) -> Self {
        self.values.insert(key, value.to_string());
        self
    }

    pub fn without(mut self, key: CredentialKey) -> Self {
        self.values.remove(&key);
        self
    }
}

impl CredentialSource for StaticCredentialSource {
    fn lookup(&self, key: CredentialKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

/// Resolved Twilio credentials. Debug output redacts the auth token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number as configured (E.164, unprefixed).
    pub sender: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("sender", &self.sender)
            .finish()
    }
}

/// Resolve all three credentials or fail naming every missing setting.
pub fn resolve_credentials(source: &dyn CredentialSource) -> Result<Credentials, ToolError> {
    let mut missing = Vec::new();
    let mut get = |key: CredentialKey| {
        let v = source
            .lookup(key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if v.is_none() {
            missing.push(key.env_var());
        }
        v.unwrap_or_default()
    };
    let account_sid = get(CredentialKey::AccountSid);
    let auth_token = get(CredentialKey::AuthToken);
    let sender = get(CredentialKey::WhatsappNumber);
    if !missing.is_empty() {
        return Err(ToolError::MissingCredentials(missing));
    }
    Ok(Credentials {
        account_sid,
        auth_token,
        sender,
    })
}
