// src/client.rs
use crate::config::ChatbotConfig;
use crate::error::ChatbotError;
use crate::types::ChatMessage;
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Parameters of a single chat-completions call.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Anything that can turn a chat transcript into an assistant reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatbotError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, ChatbotError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &ChatbotConfig) -> Result<Self, ChatbotError> {
        Self::new(config.require_api_key()?, &config.base_url, config.timeout)
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatbotError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatbotError::Api(format!(
                "{} returned {}: {}",
                request.model, status, error_text
            )));
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ChatbotError::Api(format!("{} returned no choices", request.model)))
    }
}

/// Exponential backoff between attempts: `multiplier * 2^(n-1)` kept within
/// `min_delay..=max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: Duration::from_secs(1),
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1), ..Self::default() }
    }

    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            multiplier: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.multiplier
            .saturating_mul(factor)
            .max(self.min_delay)
            .min(self.max_delay)
    }
}

/// Runs `op` until it succeeds or the policy is exhausted; the last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ChatbotError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ChatbotError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "⚠️ [{}] attempt {}/{} failed: {} (retrying in {:.1}s)",
                    label,
                    attempt,
                    attempts,
                    e,
                    delay.as_secs_f64()
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            Err(e) => {
                error!("❌ [{}] all {} attempts failed", label, attempts);
                return Err(e);
            }
        }
    }
}

/// Sampling settings for one kind of call.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const CHAT_SAMPLING: Sampling = Sampling { temperature: 0.3, max_tokens: 800 };
pub const SUMMARY_SAMPLING: Sampling = Sampling { temperature: 0.4, max_tokens: 400 };

/// Primary model with retries, then the backup model with the same policy.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn ChatBackend>,
    primary_model: String,
    backup_model: String,
    retry: RetryPolicy,
    force_failure: bool,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn ChatBackend>, primary_model: &str, backup_model: &str) -> Self {
        Self {
            backend,
            primary_model: primary_model.to_string(),
            backup_model: backup_model.to_string(),
            retry: RetryPolicy::default(),
            force_failure: false,
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &ChatbotConfig) -> Self {
        Self::new(backend, &config.primary_model, &config.backup_model)
            .with_retry(RetryPolicy::with_attempts(config.max_retries))
            .with_forced_failure(config.force_llm_failure)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Makes every call fail without touching the network; exercises fallback paths.
    pub fn with_forced_failure(mut self, force_failure: bool) -> Self {
        if force_failure {
            warn!("🚨 DEBUG MODE: every chat API call will fail");
        }
        self.force_failure = force_failure;
        self
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        sampling: Sampling,
    ) -> Result<String, ChatbotError> {
        match self.complete_with_model(&self.primary_model, system_prompt, history, sampling).await {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!(
                    "[llm] primary failed ({}), trying backup {}: {}",
                    self.primary_model, self.backup_model, e
                );
                self.complete_with_model(&self.backup_model, system_prompt, history, sampling)
                    .await
            }
        }
    }

    async fn complete_with_model(
        &self,
        model: &str,
        system_prompt: &str,
        history: &[ChatMessage],
        sampling: Sampling,
    ) -> Result<String, ChatbotError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(history);

        let request = CompletionRequest {
            model: model.to_string(),
            messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        };
        debug!("[llm] model={} messages={}", model, request.messages.len());

        retry_with_backoff(self.retry, model, || async {
            if self.force_failure {
                return Err(ChatbotError::Api("forced failure (DEBUG_FORCE_OPENAI_FAIL=1)".into()));
            }
            self.backend.complete(&request).await
        })
        .await
    }
}
