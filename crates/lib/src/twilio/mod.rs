//! Twilio Programmable Messaging gateway.
//!
//! [`MessagingGateway`] is the seam the tools call through; [`TwilioClient`] is the
//! REST implementation. One trait call is exactly one HTTP request.

mod client;
mod wire;

pub use client::TwilioClient;
pub use wire::{ListMessagesParams, SendMessageParams, TwilioErrorBody, TwilioMessage};

use crate::credentials::Credentials;
use async_trait::async_trait;

/// Errors from the remote call or from decoding its response.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("twilio request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Provider-reported failure; `message` is the provider's text, unchanged.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("malformed twilio response: {0}")]
    Malformed(String),
}

/// Send and list operations against the messaging provider.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Create one outbound message. Returns the provider's message resource.
    async fn send_message(
        &self,
        credentials: &Credentials,
        params: &SendMessageParams,
    ) -> Result<TwilioMessage, GatewayError>;

    /// Fetch one page of messages in the provider's order (newest first).
    async fn list_messages(
        &self,
        credentials: &Credentials,
        params: &ListMessagesParams,
    ) -> Result<Vec<TwilioMessage>, GatewayError>;
}
