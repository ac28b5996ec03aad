use std::time::Duration;

use log::debug;
use reqwest::StatusCode;

use crate::chat::Turn;
use crate::error::{ChatError, Result};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";

pub const DEFAULT_SYSTEM_PROMPT: &str = "I want you to provide a comprehensive summary of this text provided, \
and then list the key points. Finally, write a short conclusion about what the video is about.";

const STOP_SEQUENCE: &str = "\n\nHuman";

const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// A hosted model that answers one input given the prior turns of a conversation.
#[allow(async_fn_in_trait)]
pub trait ChatModel {
    async fn complete(&self, history: &[Turn], input: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_attempts: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        ModelSettings {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            max_attempts: 10,
        }
    }
}

/// Chat model reached over HTTP; Claude models go to Anthropic, everything else to OpenAI
#[derive(Debug, Clone)]
pub struct HttpChatModel {
    client: reqwest::Client,
    settings: ModelSettings,
}

impl HttpChatModel {
    pub fn new(client: reqwest::Client, settings: ModelSettings) -> Self {
        HttpChatModel { client, settings }
    }

    async fn complete_anthropic(&self, history: &[Turn], input: &str) -> Result<String> {
        let api_key = api_key("ANTHROPIC_API_KEY", "Claude")?;
        debug!("Calling Anthropic API with model {}", self.settings.model);

        let body = serde_json::json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "stop_sequences": [STOP_SEQUENCE],
            "system": self.settings.system_prompt,
            "messages": conversation_messages(history, input),
        });

        let json = self
            .post_json("Anthropic", || {
                self.client
                    .post("https://api.anthropic.com/v1/messages")
                    .header("x-api-key", &api_key)
                    .header("anthropic-version", "2023-06-01")
                    .header("Content-Type", "application/json")
                    .json(&body)
            })
            .await?;
        extract_anthropic_text(&json)
    }

    async fn complete_openai(&self, history: &[Turn], input: &str) -> Result<String> {
        let api_key = api_key("OPENAI_API_KEY", "OpenAI")?;
        debug!("Calling OpenAI API with model {}", self.settings.model);

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": self.settings.system_prompt,
        })];
        messages.extend(conversation_messages(history, input));

        let body = serde_json::json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "stop": [STOP_SEQUENCE],
            "messages": messages,
        });

        let json = self
            .post_json("OpenAI", || {
                self.client
                    .post("https://api.openai.com/v1/chat/completions")
                    .bearer_auth(&api_key)
                    .header("Content-Type", "application/json")
                    .json(&body)
            })
            .await?;
        extract_openai_text(&json)
    }

    /// Send a request, retrying transport failures, 429 and 5xx with exponential backoff
    async fn post_json<F>(&self, provider: &str, request: F) -> Result<serde_json::Value>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let (status, message) = match request().send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .json()
                        .await
                        .map_err(|e| ChatError::DownstreamModelError(e.to_string()));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    (Some(status), format!("{provider} API returned {status}: {body}"))
                }
                Err(e) => (None, e.to_string()),
            };

            if !should_retry(status, attempt, self.settings.max_attempts) {
                return Err(ChatError::DownstreamModelError(message));
            }

            let delay = backoff_delay(attempt);
            debug!("Attempt {attempt} failed: {message}, retrying in {delay:?}");
            tokio::time::sleep(delay).await;
        }
    }
}

impl ChatModel for HttpChatModel {
    async fn complete(&self, history: &[Turn], input: &str) -> Result<String> {
        if is_anthropic_model(&self.settings.model) {
            self.complete_anthropic(history, input).await
        } else {
            self.complete_openai(history, input).await
        }
    }
}

fn api_key(var: &str, provider: &str) -> Result<String> {
    std::env::var(var).map_err(|_| {
        ChatError::DownstreamModelError(format!("{var} environment variable not set (required for {provider} models)"))
    })
}

fn is_anthropic_model(model: &str) -> bool {
    model.starts_with("claude")
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Whether another attempt follows a failed one. `status` is `None` when no response arrived.
fn should_retry(status: Option<StatusCode>, attempt: u32, max_attempts: u32) -> bool {
    attempt < max_attempts.max(1) && status.is_none_or(is_retryable)
}

fn backoff_delay(attempt: u32) -> Duration {
    let millis = 500u64.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    Duration::from_millis(millis).min(MAX_BACKOFF)
}

/// Prior turns as alternating user/assistant messages, followed by the new input
fn conversation_messages(history: &[Turn], input: &str) -> Vec<serde_json::Value> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 1);
    for turn in history {
        messages.push(serde_json::json!({"role": "user", "content": turn.input}));
        messages.push(serde_json::json!({"role": "assistant", "content": turn.answer}));
    }
    messages.push(serde_json::json!({"role": "user", "content": input}));
    messages
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let text: String = content
            .iter()
            .filter_map(|block| {
                if block.get("type")?.as_str()? == "text" {
                    block.get("text")?.as_str().map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Err(ChatError::DownstreamModelError(
        "unexpected Anthropic API response format".to_string(),
    ))
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| ChatError::DownstreamModelError("unexpected OpenAI API response format".to_string()))
}
