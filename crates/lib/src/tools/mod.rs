//! Tool layer: the two WhatsApp operations, their definitions, and a registry that dispatches by id.
//!
//! Every call ends in an [`OperationResult`]; errors never escape a tool.

mod get_whatsapp_messages;
mod send_whatsapp;

pub use get_whatsapp_messages::{
    get_whatsapp_messages, GetWhatsappMessages, GetWhatsappMessagesInput, MessagesData,
};
pub use send_whatsapp::{send_whatsapp, SendWhatsapp, SendWhatsappInput};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credentials::CredentialSource;
use crate::envelope::OperationResult;
use crate::twilio::MessagingGateway;

/// Tool metadata as exposed to the agent runtime (id, name, description, JSON schemas).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub input: serde_json::Value,
    pub output: serde_json::Value,
}

/// What a tool needs per invocation. No state survives between calls.
#[derive(Clone)]
pub struct ToolContext {
    pub credentials: Arc<dyn CredentialSource>,
    pub gateway: Arc<dyn MessagingGateway>,
}

impl ToolContext {
    pub fn new(credentials: Arc<dyn CredentialSource>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self {
            credentials,
            gateway,
        }
    }
}

/// One invocable operation.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run with raw JSON arguments. Malformed arguments produce a failure envelope.
    async fn call(
        &self,
        ctx: &ToolContext,
        args: serde_json::Value,
    ) -> OperationResult<serde_json::Value>;
}

/// Registered tools plus the context they run with.
#[derive(Clone)]
pub struct ToolRegistry {
    ctx: ToolContext,
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry with `send-whatsapp` and `get-whatsapp-messages`.
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            ctx,
            tools: vec![Arc::new(SendWhatsapp), Arc::new(GetWhatsappMessages)],
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.definition().id).collect()
    }

    /// Return true if a tool with this id is registered.
    pub fn has_tool(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    fn find(&self, id: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().id == id)
    }

    /// Run a tool by id. Only an unknown id is an error; tool failures come back as envelopes.
    pub async fn execute(
        &self,
        id: &str,
        args: serde_json::Value,
    ) -> Result<OperationResult<serde_json::Value>, String> {
        let tool = self.find(id).ok_or_else(|| format!("unknown tool: {}", id))?;
        Ok(tool.call(&self.ctx, args).await)
    }
}
