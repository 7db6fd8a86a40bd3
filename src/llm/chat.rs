use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::llm::provider::{Pricing, Provider, ProviderConfig};
use crate::llm::runtime::{RetryPolicy, SendFailure, send_with_retry};

/// Chat message in provider wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Per-request knobs. Temperature lives on the resolved config, not here.
#[derive(Debug, Clone, Copy)]
pub struct AskOptions {
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            max_tokens: None,
            timeout_secs: None,
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

/// Token counts reported by the provider.
#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl Usage {
    /// Display-only dollar estimate from per-1k rates.
    pub fn estimated_cost(&self, pricing: &Pricing) -> f64 {
        let prompt = f64::from(self.prompt_tokens.unwrap_or(0)) / 1_000.0;
        let completion = f64::from(self.completion_tokens.unwrap_or(0)) / 1_000.0;
        prompt * pricing.prompt_per_1k + completion * pricing.completion_per_1k
    }
}

#[derive(Debug, Clone)]
pub struct AskResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug)]
pub enum ChatError {
    Request {
        provider: Provider,
        source: reqwest::Error,
    },
    Api {
        provider: Provider,
        status: StatusCode,
        body: String,
    },
    EmptyResponse {
        provider: Provider,
    },
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { provider, source } => {
                write!(f, "{} request failed: {source}", provider.as_str())
            }
            Self::Api {
                provider,
                status,
                body,
            } => write!(f, "{} API error {status}: {body}", provider.as_str()),
            Self::EmptyResponse { provider } => write!(
                f,
                "{} response did not contain message content",
                provider.as_str()
            ),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

/// Chat-completions client over a resolved [`ProviderConfig`].
///
/// The endpoint, credential, model, and temperature all come from the config;
/// this layer never reads the environment itself.
#[derive(Debug, Clone)]
pub struct ChatClient {
    provider: Provider,
    model: String,
    endpoint: String,
    api_key: String,
    temperature: f64,
    pricing: Option<Pricing>,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            provider: config.provider,
            model: config.model.clone(),
            endpoint: chat_endpoint(&config.base_url),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            pricing: config.pricing,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn pricing(&self) -> Option<&Pricing> {
        self.pricing.as_ref()
    }

    /// One-shot convenience wrapper around [`ChatClient::ask_messages`].
    pub async fn ask(&self, prompt: &str) -> Result<String, ChatError> {
        let response = self
            .ask_messages(&[ChatMessage::user(prompt)], AskOptions::default())
            .await?;
        Ok(response.content)
    }

    pub async fn ask_messages(
        &self,
        messages: &[ChatMessage],
        options: AskOptions,
    ) -> Result<AskResponse, ChatError> {
        let provider = self.provider;
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: options.max_tokens,
        };

        let response = send_with_retry(
            &self.client,
            &self.endpoint,
            &self.api_key,
            &payload,
            RetryPolicy {
                timeout_secs: options.timeout_secs,
                retries: options.retries,
                retry_delay_ms: options.retry_delay_ms,
            },
        )
        .await
        .map_err(|failure| match failure {
            SendFailure::Transport(source) => ChatError::Request { provider, source },
            SendFailure::Api { status, body } => ChatError::Api {
                provider,
                status,
                body,
            },
        })?;

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|source| ChatError::Request { provider, source })?;
        let content = body
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.is_empty())
            .ok_or(ChatError::EmptyResponse { provider })?;
        let usage = body.usage.map(|usage| Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        });

        Ok(AskResponse { content, usage })
    }
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}
