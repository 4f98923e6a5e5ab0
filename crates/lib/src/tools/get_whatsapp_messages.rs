//! `get-whatsapp-messages`: list messages on the Twilio account, newest first.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Tool, ToolContext, ToolDefinition};
use crate::credentials::resolve_credentials;
use crate::envelope::{OperationResult, Presentation, TableColumn};
use crate::error::ToolError;
use crate::mapping::InboundMessageQuery;
use crate::normalize::{normalize_messages, MessageRecord};

pub const TOOL_ID: &str = "get-whatsapp-messages";

/// Input. Absent filters disable filtering; empty-string filters are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWhatsappMessagesInput {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub sender_filter: Option<String>,
    #[serde(default)]
    pub recipient_filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesData {
    pub messages: Vec<MessageRecord>,
}

/// Run the list operation. Never fails: errors become a failure envelope with no messages.
pub async fn get_whatsapp_messages(
    ctx: &ToolContext,
    input: &GetWhatsappMessagesInput,
) -> OperationResult<MessagesData> {
    let invocation = uuid::Uuid::new_v4();
    log::debug!("{}[{}]: start", TOOL_ID, invocation);
    match list(ctx, input).await {
        Ok(messages) => {
            log::info!(
                "{}[{}]: retrieved {} message(s)",
                TOOL_ID,
                invocation,
                messages.len()
            );
            let presentation = Presentation::table(columns(&messages), &messages);
            OperationResult::success(
                format!("Retrieved {} WhatsApp messages", messages.len()),
                MessagesData { messages },
                presentation,
            )
        }
        Err(e) => {
            log::warn!("{}[{}]: {}", TOOL_ID, invocation, e);
            failure(&e)
        }
    }
}

async fn list(
    ctx: &ToolContext,
    input: &GetWhatsappMessagesInput,
) -> Result<Vec<MessageRecord>, ToolError> {
    let credentials = resolve_credentials(ctx.credentials.as_ref())?;
    let query = InboundMessageQuery::new(
        input.limit,
        input.sender_filter.as_deref(),
        input.recipient_filter.as_deref(),
    )?;
    let page = ctx
        .gateway
        .list_messages(&credentials, &query.to_params())
        .await?;
    let mut records = normalize_messages(&page)?;
    if let Ok(limit) = usize::try_from(query.limit) {
        if limit > 0 {
            records.truncate(limit);
        }
    }
    Ok(records)
}

/// Table columns; `to` only when some record carries a recipient.
fn columns(messages: &[MessageRecord]) -> Vec<TableColumn> {
    let mut cols = vec![TableColumn::text("from", "From")];
    if messages.iter().any(|m| m.to.is_some()) {
        cols.push(TableColumn::text("to", "To"));
    }
    cols.push(TableColumn::text("body", "Message"));
    cols.push(TableColumn::text("sentAt", "Sent At"));
    cols.push(TableColumn::text("deliveryStatus", "Status"));
    cols
}

fn failure(err: &ToolError) -> OperationResult<MessagesData> {
    let message = err.to_string();
    OperationResult::failure(
        format!("Failed to retrieve WhatsApp messages: {}", message),
        MessagesData::default(),
        Presentation::error_alert("Failed to Retrieve Messages", message),
    )
}

/// Registry entry for `get-whatsapp-messages`.
pub struct GetWhatsappMessages;

#[async_trait]
impl Tool for GetWhatsappMessages {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            id: TOOL_ID.to_string(),
            name: "Get WhatsApp Messages".to_string(),
            description: "Retrieve WhatsApp messages from Twilio".to_string(),
            input: json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "default": 10, "description": "Maximum number of messages to retrieve" },
                    "senderFilter": { "type": "string", "description": "Only messages from this E.164 number" },
                    "recipientFilter": { "type": "string", "description": "Only messages to this E.164 number" }
                }
            }),
            output: json!({
                "type": "object",
                "required": ["messages"],
                "properties": {
                    "messages": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["id", "from", "body", "sentAt", "deliveryStatus"],
                            "properties": {
                                "id": { "type": "string" },
                                "from": { "type": "string" },
                                "to": { "type": "string" },
                                "body": { "type": "string" },
                                "sentAt": { "type": "string", "format": "date-time" },
                                "deliveryStatus": { "type": "string" }
                            }
                        }
                    }
                }
            }),
        }
    }

    async fn call(
        &self,
        ctx: &ToolContext,
        args: serde_json::Value,
    ) -> OperationResult<serde_json::Value> {
        let args = if args.is_null() { json!({}) } else { args };
        match serde_json::from_value::<GetWhatsappMessagesInput>(args) {
            Ok(input) => get_whatsapp_messages(ctx, &input).await.into_json(),
            Err(e) => failure(&ToolError::InvalidInput(e.to_string())).into_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::{CredentialKey, StaticCredentialSource};
    use crate::envelope::Outcome;
    use crate::tools::testing::{native_message, FakeGateway};

    fn ctx(creds: StaticCredentialSource, gateway: Arc<FakeGateway>) -> ToolContext {
        ToolContext::new(Arc::new(creds), gateway)
    }

    fn valid_creds() -> StaticCredentialSource {
        StaticCredentialSource::new("AC1", "token", "+14155238886")
    }

    fn stored(n: usize) -> Arc<FakeGateway> {
        Arc::new(FakeGateway {
            messages: (0..n).map(native_message).collect(),
            ..FakeGateway::default()
        })
    }

    fn limit(n: i64) -> GetWhatsappMessagesInput {
        GetWhatsappMessagesInput {
            limit: Some(n),
            ..GetWhatsappMessagesInput::default()
        }
    }

    #[tokio::test]
    async fn returns_limit_records_in_gateway_order() {
        let gateway = stored(20);
        let res = get_whatsapp_messages(&ctx(valid_creds(), gateway.clone()), &limit(5)).await;
        assert_eq!(res.outcome, Outcome::Success);
        assert_eq!(res.text, "Retrieved 5 WhatsApp messages");
        let ids: Vec<_> = res.data.messages.iter().map(|m| m.id.clone()).collect();
        let expected: Vec<_> = (0..5).map(|i| native_message(i).sid).collect();
        assert_eq!(ids, expected);
        for m in &res.data.messages {
            assert!(!m.from.contains("whatsapp:"));
            assert!(!m.to.as_deref().unwrap_or("").contains("whatsapp:"));
        }
        assert_eq!(gateway.listed.lock().unwrap()[0].page_size, 5);
        match &res.presentation {
            Presentation::Table { columns, rows } => {
                let keys: Vec<_> = columns.iter().map(|c| c.key.as_str()).collect();
                assert_eq!(keys, vec!["from", "to", "body", "sentAt", "deliveryStatus"]);
                assert_eq!(rows.len(), 5);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn default_limit_is_ten() {
        let gateway = stored(20);
        let res = get_whatsapp_messages(
            &ctx(valid_creds(), gateway.clone()),
            &GetWhatsappMessagesInput::default(),
        )
        .await;
        assert_eq!(res.data.messages.len(), 10);
        assert_eq!(gateway.listed.lock().unwrap()[0].page_size, 10);
    }

    #[tokio::test]
    async fn over_returned_page_is_cut_to_limit() {
        let gateway = Arc::new(FakeGateway {
            messages: (0..20).map(native_message).collect(),
            over_return: true,
            ..FakeGateway::default()
        });
        let c = ctx(valid_creds(), gateway.clone());

        let res = get_whatsapp_messages(&c, &limit(5)).await;
        assert_eq!(res.outcome, Outcome::Success);
        let ids: Vec<_> = res.data.messages.iter().map(|m| m.id.clone()).collect();
        let expected: Vec<_> = (0..5).map(|i| native_message(i).sid).collect();
        assert_eq!(ids, expected);

        for n in [0, -3] {
            let res = get_whatsapp_messages(&c, &limit(n)).await;
            assert_eq!(res.outcome, Outcome::Success);
            assert_eq!(res.data.messages.len(), 20);
            assert_eq!(res.text, "Retrieved 20 WhatsApp messages");
        }
        let listed = gateway.listed.lock().unwrap();
        let sizes: Vec<_> = listed.iter().map(|p| p.page_size).collect();
        assert_eq!(sizes, vec![5, 0, -3]);
    }

    #[tokio::test]
    async fn unparseable_date_sent_uses_date_created() {
        let mut queued = native_message(0);
        queued.date_sent = Some(String::new());
        queued.date_created = Some("Thu, 30 Jul 2015 20:12:30 +0000".to_string());
        let gateway = Arc::new(FakeGateway {
            messages: vec![queued],
            ..FakeGateway::default()
        });
        let res = get_whatsapp_messages(&ctx(valid_creds(), gateway), &limit(5)).await;
        assert_eq!(res.outcome, Outcome::Success);
        assert_eq!(res.data.messages[0].sent_at, "2015-07-30T20:12:30Z");
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let gateway = stored(8);
        let c = ctx(valid_creds(), gateway);
        let a = get_whatsapp_messages(&c, &limit(6)).await;
        let b = get_whatsapp_messages(&c, &limit(6)).await;
        assert_eq!(a.data, b.data);
    }

    #[tokio::test]
    async fn empty_success_is_marked_success() {
        let res = get_whatsapp_messages(&ctx(valid_creds(), stored(0)), &limit(5)).await;
        assert_eq!(res.outcome, Outcome::Success);
        assert!(res.data.messages.is_empty());
        assert_eq!(res.text, "Retrieved 0 WhatsApp messages");
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network_call() {
        let gateway = stored(3);
        let creds = valid_creds().with(CredentialKey::WhatsappNumber, "");
        let res = get_whatsapp_messages(&ctx(creds, gateway.clone()), &limit(5)).await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert!(res.data.messages.is_empty());
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn authorization_error_is_surfaced() {
        let gateway = Arc::new(FakeGateway::failing(401, "Authenticate"));
        let res = get_whatsapp_messages(&ctx(valid_creds(), gateway), &limit(5)).await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert_eq!(res.text, "Failed to retrieve WhatsApp messages: Authenticate");
        assert_eq!(res.data, MessagesData::default());
        assert!(matches!(res.presentation, Presentation::Alert { .. }));
    }

    #[tokio::test]
    async fn malformed_record_becomes_failure() {
        let mut bad = native_message(0);
        bad.date_sent = None;
        let gateway = Arc::new(FakeGateway {
            messages: vec![native_message(1), bad],
            ..FakeGateway::default()
        });
        let res = get_whatsapp_messages(&ctx(valid_creds(), gateway), &limit(5)).await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert!(res.text.contains("malformed twilio response"));
    }

    #[tokio::test]
    async fn filters_are_prefixed_and_empty_filter_rejected() {
        let gateway = stored(3);
        let c = ctx(valid_creds(), gateway.clone());
        let input = GetWhatsappMessagesInput {
            limit: Some(3),
            sender_filter: Some("+15550000001".to_string()),
            recipient_filter: None,
        };
        get_whatsapp_messages(&c, &input).await;
        {
            let listed = gateway.listed.lock().unwrap();
            assert_eq!(listed[0].from.as_deref(), Some("whatsapp:+15550000001"));
            assert_eq!(listed[0].to, None);
        }

        let empty = GetWhatsappMessagesInput {
            recipient_filter: Some(String::new()),
            ..GetWhatsappMessagesInput::default()
        };
        let res = get_whatsapp_messages(&c, &empty).await;
        assert_eq!(res.outcome, Outcome::Failure);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn null_args_use_defaults() {
        let gateway = stored(2);
        let res = GetWhatsappMessages
            .call(&ctx(valid_creds(), gateway), serde_json::Value::Null)
            .await;
        assert_eq!(res.outcome, Outcome::Success);
        assert_eq!(res.data["messages"].as_array().map(|a| a.len()), Some(2));
    }
}
