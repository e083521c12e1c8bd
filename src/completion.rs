use crate::error::CompletionError;
use crate::history::Turn;
use crate::models::{ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use std::time::Duration;

const ERROR_DETAIL_MAX: usize = 300;

/// One completion call's inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Turn>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

/// The language model behind the bot. A call either yields text or a
/// classified [`CompletionError`]; callers never retry.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl CompletionClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl CompletionGateway for CompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(ChatMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            stream: false,
        };

        let res = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(classify_status(status, &text));
        }

        let completion: ChatCompletionResponse = res
            .json()
            .await
            .map_err(|e| CompletionError::Unknown(format!("unreadable response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Model("response contained no message".to_string()))
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
pub fn classify_status(status: StatusCode, body: &str) -> CompletionError {
    let detail = format!("{}: {}", status.as_u16(), error_detail(body));
    match status.as_u16() {
        401 | 403 => CompletionError::Auth(detail),
        429 => CompletionError::RateLimit(detail),
        400 | 404 | 413 | 422 => CompletionError::Model(detail),
        code if (500..600).contains(&code) => CompletionError::Model(detail),
        _ => CompletionError::Unknown(detail),
    }
}

fn error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    body.chars().take(ERROR_DETAIL_MAX).collect()
}
