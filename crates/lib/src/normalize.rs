//! Response normalization: Twilio message resources to stable output records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::mapping::from_gateway_address;
use crate::twilio::{GatewayError, TwilioMessage};

/// One message in this crate's output schema. Built only by [`normalize_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub body: String,
    /// RFC 3339, UTC.
    pub sent_at: String,
    /// Provider status, passed through unchanged (queued, sent, delivered, failed, received, ...).
    pub delivery_status: String,
}

/// Delivery receipt for a created message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub status: String,
    pub sid: String,
}

/// Convert Twilio's RFC 2822 timestamp to RFC 3339 UTC.
pub fn to_iso8601(rfc2822: &str) -> Result<String, GatewayError> {
    let dt = DateTime::parse_from_rfc2822(rfc2822.trim())
        .map_err(|e| GatewayError::Malformed(format!("bad timestamp {:?}: {}", rfc2822, e)))?;
    Ok(dt
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Timestamp for a message: `date_sent`, or `date_created` when `date_sent` is
/// absent or unparseable. Malformed only when neither parses.
fn sent_at(msg: &TwilioMessage) -> Result<String, GatewayError> {
    let mut last_err = None;
    for stamp in [msg.date_sent.as_deref(), msg.date_created.as_deref()]
        .into_iter()
        .flatten()
    {
        match to_iso8601(stamp) {
            Ok(iso) => return Ok(iso),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        GatewayError::Malformed(format!("message {} has no timestamp", msg.sid))
    }))
}

/// Normalize one Twilio message.
pub fn normalize_message(msg: &TwilioMessage) -> Result<MessageRecord, GatewayError> {
    if msg.sid.trim().is_empty() {
        return Err(GatewayError::Malformed("message without sid".to_string()));
    }
    let from = msg
        .from
        .as_deref()
        .ok_or_else(|| GatewayError::Malformed(format!("message {} has no sender", msg.sid)))?;
    Ok(MessageRecord {
        id: msg.sid.clone(),
        from: from_gateway_address(from).to_string(),
        to: msg.to.as_deref().map(|t| from_gateway_address(t).to_string()),
        body: msg.body.clone().unwrap_or_default(),
        sent_at: sent_at(msg)?,
        delivery_status: msg.status.clone().unwrap_or_default(),
    })
}

/// Normalize a page, keeping provider order. Fails on the first malformed record.
pub fn normalize_messages(msgs: &[TwilioMessage]) -> Result<Vec<MessageRecord>, GatewayError> {
    msgs.iter().map(normalize_message).collect()
}

/// Receipt from a created message resource.
pub fn send_receipt(msg: &TwilioMessage) -> Result<SendReceipt, GatewayError> {
    if msg.sid.trim().is_empty() {
        return Err(GatewayError::Malformed("created message without sid".to_string()));
    }
    Ok(SendReceipt {
        status: msg.status.clone().unwrap_or_default(),
        sid: msg.sid.clone(),
    })
}
