//! Minimal web shell over the same library code the CLI uses.
//!
//! Three JSON routes: a welcome page listing the scenario catalog, a
//! prompt-template endpoint, and a plain chat endpoint. The provider is
//! chosen per request from `LLM_PROVIDER`, so a misconfigured environment
//! surfaces as an HTTP error instead of a startup abort.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Args;
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

use crate::llm::chat::{AskOptions, ChatClient, ChatMessage};
use crate::llm::provider::{self, ConfigError, ProcessEnv};
use crate::scenario;

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub addr: String,
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    response: String,
}

enum ApiError {
    Config(ConfigError),
    Chat(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            // A bad provider name is the caller's mistake; everything else
            // is a server-side configuration or upstream failure.
            Self::Config(ConfigError::UnsupportedProvider(_)) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Chat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Chat(detail) => detail.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/generate", post(generate))
        .route("/chat", post(chat))
}

pub async fn run(args: ServeArgs) -> Result<(), String> {
    let listener = TcpListener::bind(&args.addr)
        .await
        .map_err(|err| format!("Failed to bind '{}': {err}", args.addr))?;
    eprintln!(
        "{}",
        format!("listening on http://{}", args.addr).dimmed()
    );
    axum::serve(listener, router())
        .await
        .map_err(|err| format!("Server error: {err}"))
}

async fn root() -> Json<serde_json::Value> {
    let scenarios: Vec<_> = scenario::builtin()
        .iter()
        .map(|scenario| {
            json!({
                "name": scenario.name,
                "title": scenario.title,
                "description": scenario.description,
            })
        })
        .collect();
    Json(json!({
        "message": "Welcome to the parley demo API",
        "scenarios": scenarios,
    }))
}

async fn generate(Json(request): Json<QueryRequest>) -> Result<Json<QueryResponse>, ApiError> {
    let prompt = format!(
        "You are a helpful assistant. Answer the following query: {}",
        request.query
    );
    let response = ask_once(&[ChatMessage::user(prompt)]).await?;
    Ok(Json(QueryResponse { response }))
}

async fn chat(Json(request): Json<QueryRequest>) -> Result<Json<QueryResponse>, ApiError> {
    let messages = [
        ChatMessage::system("You are a helpful assistant that provides concise answers."),
        ChatMessage::user(request.query),
    ];
    let response = ask_once(&messages).await?;
    Ok(Json(QueryResponse { response }))
}

async fn ask_once(messages: &[ChatMessage]) -> Result<String, ApiError> {
    let provider_name = std::env::var("LLM_PROVIDER")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "openai".to_string());

    let config = provider::resolve(&provider_name, &ProcessEnv).map_err(ApiError::Config)?;
    let client = ChatClient::new(&config);
    let response = client
        .ask_messages(messages, AskOptions::default())
        .await
        .map_err(|err| ApiError::Chat(err.to_string()))?;
    Ok(response.content)
}
