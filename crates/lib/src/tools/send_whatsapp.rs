//! `send-whatsapp`: send one WhatsApp message through Twilio.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Tool, ToolContext, ToolDefinition};
use crate::credentials::resolve_credentials;
use crate::envelope::{OperationResult, Presentation};
use crate::error::ToolError;
use crate::mapping::OutboundMessageRequest;
use crate::normalize::{send_receipt, SendReceipt};

pub const TOOL_ID: &str = "send-whatsapp";

/// Input. `to` is an alias of `recipient` and `message` of `body`; an object
/// carrying both names of a pair is rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct SendWhatsappInput {
    #[serde(alias = "to")]
    pub recipient: String,
    #[serde(alias = "message")]
    pub body: String,
}

const FIELD_ALIASES: [(&str, &str); 2] = [("recipient", "to"), ("body", "message")];

/// Decode raw tool arguments into [`SendWhatsappInput`].
fn parse_input(args: serde_json::Value) -> Result<SendWhatsappInput, ToolError> {
    if let Some(obj) = args.as_object() {
        for (name, alias) in FIELD_ALIASES {
            if obj.contains_key(name) && obj.contains_key(alias) {
                return Err(ToolError::InvalidInput(format!(
                    "use either `{}` or `{}`, not both",
                    name, alias
                )));
            }
        }
    }
    serde_json::from_value(args).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

/// Run the send operation. Never fails: errors become a failure envelope with `status = "failed"`.
pub async fn send_whatsapp(
    ctx: &ToolContext,
    input: &SendWhatsappInput,
) -> OperationResult<SendReceipt> {
    let invocation = uuid::Uuid::new_v4();
    log::debug!("{}[{}]: start", TOOL_ID, invocation);
    match send(ctx, input).await {
        Ok((receipt, recipient)) => {
            log::info!(
                "{}[{}]: sent {} ({})",
                TOOL_ID,
                invocation,
                receipt.sid,
                receipt.status
            );
            OperationResult::success(
                "WhatsApp message sent successfully",
                receipt,
                Presentation::card(
                    "Message Sent Successfully",
                    format!("Message sent to {}", recipient),
                ),
            )
        }
        Err(e) => {
            log::warn!("{}[{}]: {}", TOOL_ID, invocation, e);
            failure(&e)
        }
    }
}

async fn send(
    ctx: &ToolContext,
    input: &SendWhatsappInput,
) -> Result<(SendReceipt, String), ToolError> {
    let credentials = resolve_credentials(ctx.credentials.as_ref())?;
    let request = OutboundMessageRequest::new(&input.recipient, &input.body)?;
    let created = ctx
        .gateway
        .send_message(&credentials, &request.to_params(&credentials))
        .await?;
    let receipt = send_receipt(&created)?;
    Ok((receipt, request.recipient))
}

fn failure(err: &ToolError) -> OperationResult<SendReceipt> {
    let message = err.to_string();
    OperationResult::failure(
        format!("Failed to send WhatsApp message: {}", message),
        SendReceipt {
            status: "failed".to_string(),
            sid: String::new(),
        },
        Presentation::error_alert("Message Send Failed", message),
    )
}

/// Registry entry for `send-whatsapp`.
pub struct SendWhatsapp;

#[async_trait]
impl Tool for SendWhatsapp {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            id: TOOL_ID.to_string(),
            name: "Send WhatsApp Message".to_string(),
            description: "Send a WhatsApp message using Twilio".to_string(),
            input: json!({
                "type": "object",
                "required": ["recipient", "body"],
                "properties": {
                    "recipient": { "type": "string", "description": "Recipient's WhatsApp number in E.164 format" },
                    "body": { "type": "string", "description": "Message content to send" }
                }
            }),
            output: json!({
                "type": "object",
                "required": ["status", "sid"],
                "properties": {
                    "status": { "type": "string" },
                    "sid": { "type": "string" }
                }
            }),
        }
    }

    async fn call(
        &self,
        ctx: &ToolContext,
        args: serde_json::Value,
    ) -> OperationResult<serde_json::Value> {
        match parse_input(args) {
            Ok(input) => send_whatsapp(ctx, &input).await.into_json(),
            Err(e) => failure(&e).into_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::{CredentialKey, StaticCredentialSource};
    use crate::envelope::{AlertVariant, Outcome};
    use crate::tools::testing::FakeGateway;

    fn ctx(creds: StaticCredentialSource, gateway: Arc<FakeGateway>) -> ToolContext {
        ToolContext::new(Arc::new(creds), gateway)
    }

    fn valid_creds() -> StaticCredentialSource {
        StaticCredentialSource::new("AC1", "token", "+14155238886")
    }

    fn input(recipient: &str, body: &str) -> SendWhatsappInput {
        SendWhatsappInput {
            recipient: recipient.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn accepted_send_returns_gateway_sid_and_status() {
        let gateway = Arc::new(FakeGateway::default());
        let c = ctx(valid_creds(), gateway.clone());
        let res = send_whatsapp(&c, &input("+15551234567", "Hello")).await;
        assert_eq!(res.outcome, Outcome::Success);
        assert_eq!(res.text, "WhatsApp message sent successfully");
        assert_eq!(res.data.status, "queued");
        assert_eq!(res.data.sid, "SM00000000000000000000000000000001");
        assert_eq!(
            res.presentation,
            Presentation::card("Message Sent Successfully", "Message sent to +15551234567")
        );
        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent[0].to, "whatsapp:+15551234567");
        assert_eq!(sent[0].from, "whatsapp:+14155238886");
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network_call() {
        for key in CredentialKey::ALL {
            let gateway = Arc::new(FakeGateway::default());
            let res = send_whatsapp(
                &ctx(valid_creds().without(key), gateway.clone()),
                &input("+15551234567", "Hello"),
            )
            .await;
            assert_eq!(res.outcome, Outcome::Failure);
            assert_eq!(res.data.status, "failed");
            assert_eq!(res.data.sid, "");
            assert!(res
                .text
                .starts_with("Failed to send WhatsApp message: Missing Twilio credentials"));
            assert_eq!(gateway.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn gateway_error_text_is_surfaced() {
        let gateway = Arc::new(FakeGateway::failing(
            400,
            "The 'To' number is not a valid phone number.",
        ));
        let c = ctx(valid_creds(), gateway);
        let res = send_whatsapp(&c, &input("+15551234567", "Hello")).await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert_eq!(
            res.text,
            "Failed to send WhatsApp message: The 'To' number is not a valid phone number."
        );
        match res.presentation {
            Presentation::Alert { variant, title, message } => {
                assert_eq!(variant, AlertVariant::Error);
                assert_eq!(title, "Message Send Failed");
                assert_eq!(message, "The 'To' number is not a valid phone number.");
            }
            other => panic!("expected alert, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected_locally() {
        let gateway = Arc::new(FakeGateway::default());
        let c = ctx(valid_creds(), gateway.clone());
        let res = send_whatsapp(&c, &input("5551234567", "Hello")).await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert_eq!(res.data.status, "failed");
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_args_keep_output_shape() {
        let gateway = Arc::new(FakeGateway::default());
        let res = SendWhatsapp
            .call(&ctx(valid_creds(), gateway.clone()), json!({ "to": "+15551234567" }))
            .await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert_eq!(res.data, json!({ "status": "failed", "sid": "" }));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn name_and_alias_together_are_rejected() {
        let gateway = Arc::new(FakeGateway::default());
        let c = ctx(valid_creds(), gateway.clone());
        let args = json!({ "recipient": "+15551234567", "to": "+15557654321", "body": "Hi" });
        let res = SendWhatsapp.call(&c, args).await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert_eq!(
            res.text,
            "Failed to send WhatsApp message: invalid input: use either `recipient` or `to`, not both"
        );
        assert_eq!(res.data, json!({ "status": "failed", "sid": "" }));

        let args = json!({ "to": "+15551234567", "body": "Hi", "message": "Hi" });
        let res = SendWhatsapp.call(&c, args).await;
        assert!(res.text.ends_with("use either `body` or `message`, not both"));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn aliases_alone_are_accepted() {
        let gateway = Arc::new(FakeGateway::default());
        let c = ctx(valid_creds(), gateway.clone());
        let res = SendWhatsapp
            .call(&c, json!({ "to": "+15551234567", "message": "Hi" }))
            .await;
        assert_eq!(res.outcome, Outcome::Success);
        assert_eq!(gateway.sent.lock().unwrap()[0].body, "Hi");
    }
}
