//! Multi-provider abstraction for LLM backends.
//!
//! Provides a unified interface over the text-generation backends Billy can
//! reach (Cloudflare Workers AI, Anthropic, OpenAI) and the fallback chain
//! that picks between them.

mod anthropic;
mod fallback;
mod openai;
mod workers_ai;

pub use anthropic::AnthropicProvider;
pub use fallback::{FallbackChain, FALLBACK_RESPONSES};
pub use openai::OpenAIProvider;
pub use workers_ai::WorkersAiProvider;

use async_trait::async_trait;
use billy_memory::Message;

// ============================================================================
// Provider Trait
// ============================================================================

/// Unified interface for text-generation backends.
///
/// Implementations are stateless between calls and perform exactly one
/// network round trip per `generate` invocation — no retries.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Whether credentials for this provider are present.
    ///
    /// The fallback chain only attempts configured providers.
    fn is_configured(&self) -> bool;

    /// Generate a reply for the ordered message list.
    ///
    /// The first message conventionally carries the persona/system
    /// instructions; providers that want a separate system field extract it
    /// themselves.
    async fn generate(&self, messages: &[Message]) -> Result<String, ProviderError>;
}

/// Error from a provider.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl ProviderError {
    /// Create an error without an HTTP status.
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create an error carrying the backend's HTTP status.
    pub fn with_status(
        provider: impl Into<String>,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
            status_code: Some(status),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for ProviderError {}
