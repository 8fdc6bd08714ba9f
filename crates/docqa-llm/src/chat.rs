//! OpenAI-compatible chat-completions provider
//!
//! Sends each prompt as a single user message to `{endpoint}/chat/completions`
//! and returns the first choice's content. One attempt per call; the client
//! timeout bounds the whole exchange.
//!
//! # Examples
//!
//! ```no_run
//! use docqa_llm::{ChatCompletionsProvider, InferenceSettings, LlmProvider};
//!
//! # async fn run() -> Result<(), docqa_llm::LlmError> {
//! let provider = ChatCompletionsProvider::new(InferenceSettings::default())?;
//! let answer = provider.generate("What is in this document?").await?;
//! # Ok(())
//! # }
//! ```

use crate::settings::InferenceSettings;
use crate::{LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat-completions API provider
#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsProvider {
    /// Build a provider from settings
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] when the settings are invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(settings: InferenceSettings) -> Result<Self, LlmError> {
        settings.validate().map_err(LlmError::NotConfigured)?;

        let timeout = settings.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            url: format!("{}/chat/completions", settings.endpoint.trim_end_matches('/')),
            api_key: settings.resolve_api_key(),
            model: settings.model,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout,
            client,
        })
    }

    /// Full URL requests are posted to
    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Communication(err.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Sending inference request");

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Inference endpoint returned an error");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
