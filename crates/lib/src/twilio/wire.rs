//! Twilio REST wire types (2010-04-01 API).

use serde::{Deserialize, Serialize};

/// Form body for `POST /Accounts/{sid}/Messages.json`. Addresses are already `whatsapp:`-prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendMessageParams {
    pub to: String,
    pub from: String,
    pub body: String,
}

/// Query for `GET /Accounts/{sid}/Messages.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMessagesParams {
    /// Passed through as-is; the provider decides what to do with 0 or negative values.
    pub page_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Message resource as returned by Twilio. Only the fields this crate maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilioMessage {
    pub sid: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// RFC 2822, e.g. "Thu, 30 Jul 2015 20:12:31 +0000". Null until the message is sent.
    #[serde(default)]
    pub date_sent: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
}

/// Page wrapper for the list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct MessagePage {
    #[serde(default)]
    pub messages: Vec<TwilioMessage>,
}

/// Error body Twilio sends with non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}
