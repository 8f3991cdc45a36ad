//! Route definitions for the Billy gateway.
//!
//! Every mode endpoint validates its input, delegates to the agent, and
//! replies with a Billy-toned JSON body. Generation never fails outwardly
//! (the provider chain degrades to canned text), so the only error responses
//! here are validation 400s and the JSON 404 fallback.

use crate::agent::BillyAgent;
use crate::analytics;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use billy_memory::{ConversationStore, Message, Role};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<BillyAgent>,
    pub conversations: ConversationStore,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response Bodies
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub billy_says: String,
}

#[derive(Debug, Deserialize)]
pub struct RoastRequest {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoastResponse {
    pub roast: String,
    pub warning: String,
    pub billy_says: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub review: String,
    pub language: String,
    pub billy_says: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub billy_says: String,
}

#[derive(Debug, Deserialize)]
pub struct DebateRequest {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DebateResponse {
    pub topic: String,
    #[serde(rename = "yourPosition")]
    pub your_position: String,
    #[serde(rename = "billysSide")]
    pub billys_side: String,
    pub billy_says: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the gateway routes on top of shared state.
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/roast", post(roast_handler))
        .route("/review", post(review_handler))
        .route("/analyze", post(analyze_handler))
        .route("/debate", post(debate_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Service card.
async fn root_handler() -> Json<Value> {
    Json(json!({
        "agent": "Billy Bullshit",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "online",
        "tagline": "Calling BS on your BS code since 2024",
        "primary_function": "💩 Code Review - Calling out bullshit code",
        "endpoints": {
            "review": "/review (PRIMARY - Code Review)",
            "chat": "/chat",
            "roast": "/roast",
            "analyze": "/analyze",
            "debate": "/debate",
            "health": "/health",
        },
        "personality": {
            "traits": ["brutally honest", "sarcastic", "no-nonsense", "insightful", "code-review-obsessed"],
            "warning": "Billy doesnt sugarcoat anything. Proceed at your own risk.",
            "mission": "Call out BS in your code. That's what I do.",
        },
    }))
}

/// Health check handler.
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "message": "Billy is alive and ready to call out your BS",
    }))
}

/// Chat with Billy, with optional session continuity.
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(message) = request.message.filter(|m| !m.is_empty()) else {
        return Err(bad_request("No message provided. What, cat got your tongue?"));
    };

    let history = match &request.session_id {
        Some(session_id) => state.conversations.history(session_id).await,
        None => Vec::new(),
    };

    let response = state.agent.chat(&message, &history).await;

    // Persist both turns; a sessionless chat stays stateless and just gets
    // a fresh id back for opting into continuity.
    if let Some(session_id) = &request.session_id {
        state
            .conversations
            .add_message(session_id, Message::now(Role::User, &message))
            .await;
        state
            .conversations
            .add_message(session_id, Message::now(Role::Assistant, &response))
            .await;
    }

    let session_id = request
        .session_id
        .unwrap_or_else(|| format!("billy_{}", uuid::Uuid::new_v4()));

    Ok(Json(ChatResponse {
        response,
        session_id,
        billy_says: "There you go. No BS, just straight talk.".to_string(),
    }))
}

/// Roast whatever the caller dares to submit.
async fn roast_handler(
    State(state): State<AppState>,
    Json(request): Json<RoastRequest>,
) -> Result<Json<RoastResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(target) = request.target.filter(|t| !t.is_empty()) else {
        return Err(bad_request("What am I supposed to roast? Thin air?"));
    };

    let roast = state.agent.roast(&target, request.context.as_deref()).await;

    Ok(Json(RoastResponse {
        roast,
        warning: "You asked for it. Dont blame me if your feelings get hurt.".to_string(),
        billy_says: "🔥".to_string(),
    }))
}

/// Code review, Billy's primary function.
async fn review_handler(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(code) = request.code.filter(|c| !c.is_empty()) else {
        return Err(bad_request(
            "No code to review. You expect me to critique thin air?",
        ));
    };

    let review = state
        .agent
        .review_code(&code, request.language.as_deref(), request.context.as_deref())
        .await;

    analytics::track_review(
        &review,
        request.language.as_deref(),
        state.agent.active_provider(),
    );

    Ok(Json(ReviewResponse {
        review,
        language: request.language.unwrap_or_else(|| "unknown".to_string()),
        billy_says: "💩 BS detected and called out. You're welcome.".to_string(),
    }))
}

/// Brutally honest analysis.
async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(subject) = request.subject.filter(|s| !s.is_empty()) else {
        return Err(bad_request("Analyze what? Your lack of input?"));
    };

    let kind = request.kind.unwrap_or_else(|| "general".to_string());
    let analysis = state.agent.analyze(&subject, &kind).await;

    Ok(Json(AnalyzeResponse {
        analysis,
        kind,
        billy_says: "Analysis complete. Truth hurts, doesnt it?".to_string(),
    }))
}

/// Argue with Billy. Good luck.
async fn debate_handler(
    State(state): State<AppState>,
    Json(request): Json<DebateRequest>,
) -> Result<Json<DebateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (Some(position), Some(topic)) = (
        request.position.filter(|p| !p.is_empty()),
        request.topic.filter(|t| !t.is_empty()),
    ) else {
        return Err(bad_request("Need a position and topic. Come prepared."));
    };

    let billys_side = state.agent.debate(&position, &topic).await;

    Ok(Json(DebateResponse {
        topic,
        your_position: position,
        billys_side,
        billy_says: "Lets see if you can handle the truth.".to_string(),
    }))
}

/// JSON 404 fallback.
async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "billy_says": "Wrong URL, genius. Try reading the docs.",
            "endpoints": ["/chat", "/roast", "/review", "/analyze", "/debate", "/health"],
        })),
    )
}
