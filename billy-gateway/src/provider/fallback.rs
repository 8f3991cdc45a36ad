//! Provider fallback chain.
//!
//! Providers are held in strict priority order. Exactly ONE configured
//! backend is attempted per invocation; there are no retries and no
//! escalation after an attempt. Every failure degrades to a canned response,
//! so the chain never fails outwardly.

use super::Provider;
use billy_memory::Message;
use rand::Rng;
use std::sync::Arc;

/// Canned responses returned when no provider yields usable output.
pub const FALLBACK_RESPONSES: &[&str] = &[
    "Look, I'd love to help, but something's broken on my end. Try again in a minute.",
    "AI's taking a coffee break. Come back later.",
    "Error 418: I'm a teapot. And also broken. Try again.",
    "System's down. Even I can't BS my way out of this one.",
    "Technical difficulties. Translation: something's fucked. Try again.",
];

/// Ordered chain of text-generation backends.
///
/// Stateless between calls; safe to share across concurrent requests.
pub struct FallbackChain {
    providers: Vec<Arc<dyn Provider>>,
}

impl FallbackChain {
    /// Create a chain from providers in priority order.
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Name of the provider an invocation would attempt, if any.
    pub fn active_provider(&self) -> Option<&str> {
        self.providers
            .iter()
            .find(|p| p.is_configured())
            .map(|p| p.name())
    }

    /// Generate a reply for the message list.
    ///
    /// The first configured provider is invoked exactly once. A successful
    /// non-empty reply is returned verbatim. An empty-but-successful reply
    /// is terminal and degrades to a canned response without escalating to
    /// later providers, as does any backend error.
    pub async fn generate(&self, messages: &[Message]) -> String {
        let Some(provider) = self.providers.iter().find(|p| p.is_configured()) else {
            tracing::warn!("No text-generation provider configured");
            return canned_response();
        };

        match provider.generate(messages).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(provider = provider.name(), "Provider returned empty text");
                canned_response()
            }
            Err(e) => {
                tracing::error!(
                    provider = provider.name(),
                    status = ?e.status_code,
                    error = %e,
                    "Provider call failed"
                );
                canned_response()
            }
        }
    }
}

/// Pick a canned response uniformly at random.
fn canned_response() -> String {
    let idx = rand::thread_rng().gen_range(0..FALLBACK_RESPONSES.len());
    FALLBACK_RESPONSES[idx].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock provider for testing
    struct MockProvider {
        name: &'static str,
        configured: bool,
        calls: Arc<AtomicUsize>,
        result: Result<&'static str, &'static str>,
    }

    impl MockProvider {
        fn new(
            name: &'static str,
            configured: bool,
            result: Result<&'static str, &'static str>,
        ) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    name,
                    configured,
                    calls: Arc::clone(&calls),
                    result,
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn generate(&self, _messages: &[Message]) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(ProviderError::with_status(self.name, msg, 500)),
            }
        }
    }

    fn messages() -> Vec<Message> {
        vec![Message::system("Be Billy"), Message::user("hello")]
    }

    #[tokio::test]
    async fn primary_text_returned_verbatim() {
        let (primary, primary_calls) = MockProvider::new("primary", true, Ok("straight talk"));
        let (secondary, secondary_calls) = MockProvider::new("secondary", true, Ok("never"));

        let chain = FallbackChain::new(vec![primary, secondary]);
        let reply = chain.generate(&messages()).await;

        assert_eq!(reply, "straight talk");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unconfigured_providers_are_skipped() {
        let (primary, primary_calls) = MockProvider::new("primary", false, Ok("never"));
        let (secondary, _) = MockProvider::new("secondary", true, Ok("from secondary"));

        let chain = FallbackChain::new(vec![primary, secondary]);
        let reply = chain.generate(&messages()).await;

        assert_eq!(reply, "from secondary");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_success_is_terminal() {
        let (primary, _) = MockProvider::new("primary", true, Ok(""));
        let (secondary, secondary_calls) = MockProvider::new("secondary", true, Ok("never"));

        let chain = FallbackChain::new(vec![primary, secondary]);
        let reply = chain.generate(&messages()).await;

        // Degrades to canned text without escalating past the primary
        assert!(FALLBACK_RESPONSES.contains(&reply.as_str()));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitespace_only_success_is_terminal() {
        let (primary, _) = MockProvider::new("primary", true, Ok("   \n"));
        let chain = FallbackChain::new(vec![primary]);

        let reply = chain.generate(&messages()).await;
        assert!(FALLBACK_RESPONSES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn errors_do_not_escalate() {
        let (primary, primary_calls) = MockProvider::new("primary", true, Err("down"));
        let (secondary, secondary_calls) = MockProvider::new("secondary", true, Ok("never"));

        let chain = FallbackChain::new(vec![primary, secondary]);
        let reply = chain.generate(&messages()).await;

        assert!(FALLBACK_RESPONSES.contains(&reply.as_str()));
        // Exactly one attempt, no retries, no fallback to the secondary
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_chain_yields_canned_response() {
        let chain = FallbackChain::new(vec![]);
        let reply = chain.generate(&messages()).await;
        assert!(!reply.is_empty());
        assert!(FALLBACK_RESPONSES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn active_provider_reports_first_configured() {
        let (primary, _) = MockProvider::new("primary", false, Ok(""));
        let (secondary, _) = MockProvider::new("secondary", true, Ok(""));

        let chain = FallbackChain::new(vec![primary, secondary]);
        assert_eq!(chain.active_provider(), Some("secondary"));

        let empty = FallbackChain::new(vec![]);
        assert!(empty.active_provider().is_none());
    }

    #[test]
    fn canned_pool_is_nonempty_strings() {
        assert!(!FALLBACK_RESPONSES.is_empty());
        assert!(FALLBACK_RESPONSES.iter().all(|s| !s.is_empty()));
    }
}
