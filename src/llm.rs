//! LLM client adapter.
//!
//! [`AnswerGenerator`] is the seam between the request handler and the hosted
//! model. [`ChatCompletionClient`] implements it against an OpenAI-compatible
//! `POST {base_url}/chat/completions` endpoint (Groq by default).
//!
//! One call is one request: no retries and no internal fallback. Failures are
//! returned as [`LlmError`] and the caller decides what to do with them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{LlmConfig, API_KEY_ENV};
use crate::error::{LlmError, LlmResult};
use crate::knowledge::KnowledgeBase;
use crate::matcher::MatchResult;
use crate::prompt::{build_context, build_user_message, SYSTEM_PROMPT};

/// Sampling temperature for every completion. Kept low so the model stays
/// close to the knowledge base.
pub const TEMPERATURE: f32 = 0.2;

/// Produces an answer for a question given its closest knowledge-base match.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Returns the trimmed answer text; an empty string when the provider
    /// returned no content.
    async fn generate_answer(&self, user_question: &str, best: &MatchResult) -> LlmResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat-completion client grounded on a fixed knowledge base.
///
/// The knowledge-base context is serialized once at construction; it is
/// identical for every request.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
    context: String,
}

impl ChatCompletionClient {
    pub fn new(config: &LlmConfig, api_key: String, kb: &KnowledgeBase) -> LlmResult<Self> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey(API_KEY_ENV));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            context: build_context(kb),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn map_send_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::Transport(err)
        }
    }
}

#[async_trait]
impl AnswerGenerator for ChatCompletionClient {
    async fn generate_answer(&self, user_question: &str, best: &MatchResult) -> LlmResult<String> {
        let user_content = build_user_message(user_question, best, &self.context);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
            temperature: TEMPERATURE,
        };

        tracing::debug!(model = %self.model, endpoint = %self.endpoint, "sending chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        parse_chat_response(&text)
    }
}

/// Extracts the first choice's content from a chat-completion response body.
fn parse_chat_response(body: &str) -> LlmResult<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("malformed JSON: {}", e)))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("no choices returned".to_string()))?;

    Ok(choice
        .message
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default())
}
