//! Billy Gateway - A no-BS AI agent service.
//!
//! This crate provides the Billy service:
//! - Multi-provider response generation with a strict-priority fallback chain
//!   (Cloudflare Workers AI → Anthropic → OpenAI → canned responses)
//! - Bounded, best-effort conversation history per session
//! - The Billy persona and its operation modes (chat, review, roast,
//!   analyze, debate)
//! - Review analytics extraction (BS score, code smell markers)
//!
//! ## Architecture
//!
//! ```text
//! Client → Routes → BillyAgent → FallbackChain → provider (at most one)
//!             ↓
//!      ConversationStore (KvStore: SQLite / in-memory)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod agent;
pub mod analytics;
pub mod provider;
pub mod routes;

pub use agent::BillyAgent;
pub use provider::{
    AnthropicProvider, FallbackChain, OpenAIProvider, Provider, ProviderError, WorkersAiProvider,
    FALLBACK_RESPONSES,
};
pub use routes::AppState;

use axum::Router;
use billy_common::config::Config;
use billy_memory::{ConversationStore, KvStore, SqliteStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the provider chain from configured credentials, in priority order.
pub fn build_chain(config: &Config) -> FallbackChain {
    let providers: Vec<Arc<dyn Provider>> = vec![
        Arc::new(WorkersAiProvider::new(
            config.providers.cloudflare_account_id.clone(),
            config.providers.cloudflare_api_token.clone(),
            config.agent.default_model.clone(),
        )),
        Arc::new(AnthropicProvider::new(
            config.providers.anthropic_api_key.clone(),
            config.agent.max_tokens,
        )),
        Arc::new(OpenAIProvider::new(
            config.providers.openai_api_key.clone(),
            config.agent.max_tokens,
        )),
    ];

    FallbackChain::new(providers)
}

/// Build the gateway router backed by the configured SQLite store.
pub fn build_router(config: &Config) -> anyhow::Result<Router> {
    let store = Arc::new(SqliteStore::new(&config.db_path())?);
    Ok(build_router_with_store(config, store))
}

/// Build the gateway router on an explicit storage backend.
/// This is useful for testing with isolated or in-memory stores.
pub fn build_router_with_store(config: &Config, store: Arc<dyn KvStore>) -> Router {
    let state = AppState {
        agent: Arc::new(BillyAgent::new(build_chain(config))),
        conversations: ConversationStore::new(store, config.agent.max_conversation_length),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::build_routes(state).layer(cors)
}

/// Start the gateway server.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let router = build_router(config)?;

    tracing::info!("Starting Billy Gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
