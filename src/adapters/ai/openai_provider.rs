//! OpenAI chat-completions backend.
//!
//! ```ignore
//! let provider = OpenAIProvider::new(
//!     OpenAIConfig::new(api_key)
//!         .with_model("gpt-3.5-turbo-16k")
//!         .with_economy_model("gpt-3.5-turbo"),
//! )?;
//! ```
//!
//! Status 429 becomes [`AIError::RateLimited`]; everything else the API can
//! say is mapped to a non-capacity variant.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::triage::ContextRole;
use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ModelTier};

/// Used when a 429 carries no usable hint.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    pub economy_model: String,
    pub base_url: String,
    /// Transport-level timeout. The handler applies its own per-call deadline
    /// on top of this.
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-3.5-turbo-16k".to_string(),
            economy_model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(25),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_economy_model(mut self, model: impl Into<String>) -> Self {
        self.economy_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OpenAIProvider {
    config: OpenAIConfig,
    endpoint: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::Network(format!("cannot build HTTP client: {e}")))?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatBody<'a> {
        let messages = std::iter::once(WireMessage {
            role: ContextRole::System,
            content: &request.system_prompt,
        })
        .chain(request.messages.iter().map(|m| WireMessage {
            role: m.role,
            content: &m.content,
        }))
        .collect();

        ChatBody {
            model: self.model_for(request.tier),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> AIError {
        if err.is_timeout() {
            AIError::Timeout(self.config.timeout)
        } else {
            AIError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&self.body(&request))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_header(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, retry_after, body));
        }

        let parsed: ChatReply = response
            .json()
            .await
            .map_err(|e| AIError::Parse(e.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::Parse("response has no choices".to_string()))?;

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            model: parsed.model,
            truncated: choice.finish_reason.as_deref() == Some("length"),
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Primary => &self.config.model,
            ModelTier::Economy => &self.config.economy_model,
        }
    }
}

fn classify_failure(status: StatusCode, retry_after: Option<u32>, body: String) -> AIError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => AIError::RateLimited {
            retry_after_secs: retry_after
                .or_else(|| retry_after_in_body(&body))
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AIError::AuthenticationFailed,
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            AIError::InvalidRequest(body)
        }
        s if s.is_server_error() => AIError::Unavailable(format!("{s}: {body}")),
        s => AIError::Network(format!("unexpected status {s}: {body}")),
    }
}

fn retry_after_header(headers: &HeaderMap) -> Option<u32> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

/// OpenAI phrases the hint as "... try again in 20s." inside the error message.
fn retry_after_in_body(body: &str) -> Option<u32> {
    let parsed: ErrorReply = serde_json::from_str(body).ok()?;
    let (_, rest) = parsed.error.message.split_once("try again in ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: ContextRole,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    model: String,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
