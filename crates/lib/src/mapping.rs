//! Request mapping: typed tool input to Twilio request shapes.
//!
//! WhatsApp addresses on Twilio are phone numbers with a `whatsapp:` channel prefix.
//! Inputs are validated here, before any network call.

use crate::credentials::Credentials;
use crate::error::ToolError;
use crate::twilio::{ListMessagesParams, SendMessageParams};

/// Channel prefix Twilio uses for WhatsApp addresses.
pub const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Default page size for listing.
pub const DEFAULT_LIMIT: i64 = 10;

/// Prefix an E.164 number for Twilio. Already-prefixed input is returned unchanged.
pub fn to_gateway_address(number: &str) -> String {
    let n = number.trim();
    if n.starts_with(WHATSAPP_PREFIX) {
        n.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, n)
    }
}

/// Strip one leading `whatsapp:` prefix, if present.
pub fn from_gateway_address(address: &str) -> &str {
    address.strip_prefix(WHATSAPP_PREFIX).unwrap_or(address)
}

/// Validate an E.164 number (`+` then 1-15 digits, no leading zero). Accepts a `whatsapp:` prefix.
/// Returns the bare number.
pub fn parse_e164(field: &str, value: &str) -> Result<String, ToolError> {
    let v = from_gateway_address(value.trim());
    let digits = v.strip_prefix('+').ok_or_else(|| {
        ToolError::InvalidInput(format!("{} must be an E.164 number starting with '+'", field))
    })?;
    let valid = !digits.is_empty()
        && digits.len() <= 15
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if !valid {
        return Err(ToolError::InvalidInput(format!(
            "{} must be an E.164 number (e.g. +15551234567), got {:?}",
            field, value
        )));
    }
    Ok(v.to_string())
}

/// A validated outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessageRequest {
    /// Bare E.164 recipient.
    pub recipient: String,
    pub body: String,
}

impl OutboundMessageRequest {
    pub fn new(recipient: &str, body: &str) -> Result<Self, ToolError> {
        let recipient = parse_e164("recipient", recipient)?;
        if body.trim().is_empty() {
            return Err(ToolError::InvalidInput("body must not be empty".to_string()));
        }
        Ok(Self {
            recipient,
            body: body.to_string(),
        })
    }

    /// Twilio form body, with both addresses prefixed.
    pub fn to_params(&self, credentials: &Credentials) -> SendMessageParams {
        SendMessageParams {
            to: to_gateway_address(&self.recipient),
            from: to_gateway_address(&credentials.sender),
            body: self.body.clone(),
        }
    }
}

/// A validated list query. Absent filters mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessageQuery {
    pub limit: i64,
    pub sender_filter: Option<String>,
    pub recipient_filter: Option<String>,
}

impl Default for InboundMessageQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            sender_filter: None,
            recipient_filter: None,
        }
    }
}

impl InboundMessageQuery {
    /// Build a query. `limit` is kept verbatim; empty-string filters are rejected.
    pub fn new(
        limit: Option<i64>,
        sender_filter: Option<&str>,
        recipient_filter: Option<&str>,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            sender_filter: sender_filter
                .map(|f| parse_filter("senderFilter", f))
                .transpose()?,
            recipient_filter: recipient_filter
                .map(|f| parse_filter("recipientFilter", f))
                .transpose()?,
        })
    }

    /// Twilio query; only provided filters are prefixed and sent.
    pub fn to_params(&self) -> ListMessagesParams {
        ListMessagesParams {
            page_size: self.limit,
            from: self.sender_filter.as_deref().map(to_gateway_address),
            to: self.recipient_filter.as_deref().map(to_gateway_address),
        }
    }
}

fn parse_filter(field: &str, value: &str) -> Result<String, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidInput(format!(
            "{} must not be empty; omit it to disable filtering",
            field
        )));
    }
    parse_e164(field, value)
}
