//! Anthropic (Claude) provider — secondary vendor A.
//!
//! The Messages API wants the system prompt in a separate `system` field, so
//! the first system message is extracted and the remaining turns sent as the
//! message list.

use super::{Provider, ProviderError};
use async_trait::async_trait;
use billy_memory::{Message, Role};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Anthropic API provider.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    max_tokens: i64,
    base_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    pub fn new(api_key: Option<String>, max_tokens: i64) -> Self {
        Self::with_base_url(api_key, max_tokens, "https://api.anthropic.com")
    }

    /// Create with a custom base URL (used by tests).
    pub fn with_base_url(
        api_key: Option<String>,
        max_tokens: i64,
        base_url: impl Into<String>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: api_key.filter(|v| !v.is_empty()),
            model: DEFAULT_MODEL.to_string(),
            max_tokens,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::new(self.name(), "Missing API key"));
        };

        let url = format!("{}/v1/messages", self.base_url);

        // System message goes into its own field; the rest stay as turns
        let system = messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.clone());
        let turns: Vec<AnthropicMessage> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| AnthropicMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect();

        let request = AnthropicRequest {
            model: self.model.clone(),
            messages: turns,
            max_tokens: self.max_tokens,
            system,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
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

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(self.name(), format!("Failed to parse response: {e}")))?;

        let content = parsed
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        Ok(content)
    }
}

// ============================================================================
// Anthropic API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_only_with_key() {
        assert!(AnthropicProvider::new(Some("sk-test".into()), 1024).is_configured());
        assert!(!AnthropicProvider::new(None, 1024).is_configured());
        assert!(!AnthropicProvider::new(Some(String::new()), 1024).is_configured());
    }

    #[test]
    fn request_serialization() {
        let request = AnthropicRequest {
            model: DEFAULT_MODEL.into(),
            messages: vec![AnthropicMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            max_tokens: 1024,
            system: Some("Be Billy".into()),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(DEFAULT_MODEL));
        assert!(json.contains("\"system\":\"Be Billy\""));
    }

    #[test]
    fn response_joins_text_blocks() {
        let parsed: AnthropicResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"Hello "},{"type":"text","text":"there"}]}"#,
        )
        .unwrap();
        let content: String = parsed.content.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(content, "Hello there");
    }
}
