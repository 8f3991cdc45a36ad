//! Cloudflare Workers AI provider — the primary fast-inference backend.
//!
//! Speaks the Workers AI REST API:
//! `POST /client/v4/accounts/{account}/ai/run/{model}` with a uniform
//! role/content message list. The reply text lives in `result.response`.
//!
//! An empty-but-successful reply is returned as-is; the fallback chain
//! treats it as terminal rather than escalating to a secondary vendor.

use super::{Provider, ProviderError};
use async_trait::async_trait;
use billy_memory::Message;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Workers AI provider.
pub struct WorkersAiProvider {
    client: Client,
    account_id: Option<String>,
    api_token: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct WorkersAiRequest<'a> {
    messages: Vec<WorkersAiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WorkersAiMessage<'a> {
    role: String,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WorkersAiResponse {
    #[serde(default)]
    result: Option<WorkersAiResult>,
}

#[derive(Debug, Deserialize)]
struct WorkersAiResult {
    #[serde(default)]
    response: Option<String>,
}

impl WorkersAiProvider {
    /// Create a new Workers AI provider.
    ///
    /// The provider is unconfigured (and skipped by the chain) unless both
    /// the account id and API token are present.
    pub fn new(account_id: Option<String>, api_token: Option<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(account_id, api_token, model, "https://api.cloudflare.com")
    }

    /// Create with a custom base URL (used by tests).
    pub fn with_base_url(
        account_id: Option<String>,
        api_token: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            account_id: account_id.filter(|v| !v.is_empty()),
            api_token: api_token.filter(|v| !v.is_empty()),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Provider for WorkersAiProvider {
    fn name(&self) -> &str {
        "workers-ai"
    }

    fn is_configured(&self) -> bool {
        self.account_id.is_some() && self.api_token.is_some()
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let (Some(account_id), Some(api_token)) = (&self.account_id, &self.api_token) else {
            return Err(ProviderError::new(self.name(), "Missing credentials"));
        };

        let url = format!(
            "{}/client/v4/accounts/{}/ai/run/{}",
            self.base_url, account_id, self.model
        );

        let request = WorkersAiRequest {
            messages: messages
                .iter()
                .map(|m| WorkersAiMessage {
                    role: m.role.to_string(),
                    content: &m.content,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::new(self.name(), format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::with_status(
                self.name(),
                format!("API error: {body}"),
                status.as_u16(),
            ));
        }

        let parsed: WorkersAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(self.name(), format!("Failed to parse response: {e}")))?;

        Ok(parsed
            .result
            .and_then(|r| r.response)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_requires_both_credentials() {
        let model = "@cf/meta/llama-3.1-8b-instruct";

        let provider = WorkersAiProvider::new(Some("acct".into()), Some("token".into()), model);
        assert!(provider.is_configured());

        let provider = WorkersAiProvider::new(Some("acct".into()), None, model);
        assert!(!provider.is_configured());

        let provider = WorkersAiProvider::new(None, Some("token".into()), model);
        assert!(!provider.is_configured());

        // Empty strings count as absent
        let provider = WorkersAiProvider::new(Some(String::new()), Some("token".into()), model);
        assert!(!provider.is_configured());
    }

    #[test]
    fn request_serialization() {
        let request = WorkersAiRequest {
            messages: vec![WorkersAiMessage {
                role: "user".into(),
                content: "Hello",
            }],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"Hello\""));
    }

    #[test]
    fn response_text_is_optional() {
        let parsed: WorkersAiResponse =
            serde_json::from_str(r#"{"result":{},"success":true}"#).unwrap();
        assert!(parsed.result.unwrap().response.is_none());

        let parsed: WorkersAiResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(parsed.result.is_none());
    }
}
