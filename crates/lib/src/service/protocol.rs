//! Wire types for the HTTP surface.

use serde::{Deserialize, Serialize};

/// Static description of this service, as shown to the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub title: String,
    pub description: String,
    pub version: String,
    pub tags: Vec<String>,
}

impl Default for ServiceMetadata {
    fn default() -> Self {
        Self {
            title: "WhatsApp Messaging Service".to_string(),
            description: "Send and read WhatsApp messages via Twilio".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tags: vec![
                "whatsapp".to_string(),
                "messaging".to_string(),
                "twilio".to_string(),
            ],
        }
    }
}

/// `GET /` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPayload {
    pub runtime: String,
    pub port: u16,
    pub service: ServiceMetadata,
    pub tools: Vec<String>,
}

/// Body for non-tool errors (unknown tool, bad JSON, auth).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
