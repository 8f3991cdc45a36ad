//! OpenAI provider — secondary vendor B.
//!
//! The chat completions schema accepts a uniform role/content list including
//! the system message, so no payload splitting is needed.

use super::{Provider, ProviderError};
use async_trait::async_trait;
use billy_memory::Message;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// OpenAI API provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    model: String,
    max_tokens: i64,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    pub fn new(api_key: Option<String>, max_tokens: i64) -> Self {
        Self::with_base_url(api_key, max_tokens, "https://api.openai.com")
    }

    /// Create with a custom base URL (used by tests).
    pub fn with_base_url(
        api_key: Option<String>,
        max_tokens: i64,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.filter(|v| !v.is_empty()),
            model: DEFAULT_MODEL.to_string(),
            max_tokens,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::new(self.name(), "Missing API key"));
        };

        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
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

        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(self.name(), format!("Failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::new(self.name(), "Response contained no choices"))
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: i64,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_only_with_key() {
        assert!(OpenAIProvider::new(Some("sk-test".into()), 1024).is_configured());
        assert!(!OpenAIProvider::new(None, 1024).is_configured());
    }

    #[test]
    fn request_keeps_system_in_message_list() {
        let messages = vec![Message::system("Be Billy"), Message::user("Hello")];
        let request = OpenAIRequest {
            model: DEFAULT_MODEL.into(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: 1024,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn response_takes_first_choice() {
        let parsed: OpenAIResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"first"}},{"message":{"role":"assistant","content":"second"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content, "first");
    }
}
