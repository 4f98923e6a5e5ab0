//! Twilio REST client: create and list messages on an account.

use async_trait::async_trait;

use super::wire::{
    ListMessagesParams, MessagePage, SendMessageParams, TwilioErrorBody, TwilioMessage,
};
use super::{GatewayError, MessagingGateway};
use crate::config::DEFAULT_TWILIO_API_BASE;
use crate::credentials::Credentials;

const API_VERSION: &str = "2010-04-01";

/// Client for the Twilio Messages resource. Cheap to clone.
#[derive(Clone)]
pub struct TwilioClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for TwilioClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TwilioClient {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/Messages.json",
            self.base_url, API_VERSION, account_sid
        )
    }
}

/// Turn a non-2xx response into an `Api` error, preferring Twilio's own message text.
async fn api_error(res: reqwest::Response) -> GatewayError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    match serde_json::from_str::<TwilioErrorBody>(&body) {
        Ok(e) => GatewayError::Api {
            status: status.as_u16(),
            code: e.code,
            message: e.message,
        },
        Err(_) => GatewayError::Api {
            status: status.as_u16(),
            code: None,
            message: format!("{} {}", status, body.trim()),
        },
    }
}

#[async_trait]
impl MessagingGateway for TwilioClient {
    /// POST /2010-04-01/Accounts/{sid}/Messages.json (form-encoded To, From, Body).
    async fn send_message(
        &self,
        credentials: &Credentials,
        params: &SendMessageParams,
    ) -> Result<TwilioMessage, GatewayError> {
        let url = self.messages_url(&credentials.account_sid);
        let res = self
            .client
            .post(&url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(params)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(api_error(res).await);
        }
        let text = res.text().await?;
        serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))
    }

    /// GET /2010-04-01/Accounts/{sid}/Messages.json?PageSize=..&From=..&To=..
    async fn list_messages(
        &self,
        credentials: &Credentials,
        params: &ListMessagesParams,
    ) -> Result<Vec<TwilioMessage>, GatewayError> {
        let url = self.messages_url(&credentials.account_sid);
        let res = self
            .client
            .get(&url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .query(params)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(api_error(res).await);
        }
        let text = res.text().await?;
        let page: MessagePage =
            serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(page.messages)
    }
}
