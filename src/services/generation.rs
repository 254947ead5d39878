//! Text-generation client.
//!
//! [`GenerationClient`] is the seam between the tool layer and the remote
//! model. [`AzureOpenAiClient`] talks to an Azure OpenAI chat-completions
//! deployment; tests substitute a recording stub.

use crate::config::GenerationConfig;
use crate::error::{GenerationError, GenerationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling parameters for a completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub stop: Option<Vec<String>>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 10_000,
            temperature: 0.2,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
        }
    }
}

impl GenerationOptions {
    /// Applies caller overrides on top of the defaults.
    #[must_use]
    pub fn with_overrides(temperature: Option<f64>, max_tokens: Option<u32>) -> Self {
        let mut options = Self::default();
        if let Some(t) = temperature {
            options.temperature = t;
        }
        if let Some(m) = max_tokens {
            options.max_tokens = m;
        }
        options
    }
}

/// A system/user prompt pair plus sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub options: GenerationOptions,
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// A successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// Remote text-generation service.
///
/// Implementations report every failure (bad configuration, transport,
/// non-success status) as an `Err`; they never panic.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult<Completion>;
}

/// One chat message in the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Parses a chat-completions response body.
///
/// A response without choices or content yields an empty completion rather
/// than an error.
///
/// # Errors
///
/// Returns `GenerationError::Parse` if the body is not valid JSON of the
/// expected shape.
pub fn parse_completion(body: &str) -> GenerationResult<Completion> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;

    let first = response.choices.into_iter().next();
    let (content, finish_reason) = match first {
        Some(choice) => (
            choice.message.and_then(|m| m.content).unwrap_or_default(),
            choice.finish_reason,
        ),
        None => (String::new(), None),
    };

    Ok(Completion {
        content,
        finish_reason,
        usage: response.usage,
    })
}

/// Azure OpenAI chat-completions client.
#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    config: GenerationConfig,
}

impl AzureOpenAiClient {
    /// Creates a client. Credentials are checked per request, not here.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Request` if the HTTP client cannot be built
    /// (e.g. TLS backend initialization failure).
    pub fn new(config: GenerationConfig) -> GenerationResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Creates a client over a caller-built `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(config: GenerationConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Builds the deployment's chat-completions URL.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Config` when the key, endpoint, deployment
    /// or API version is missing or still a placeholder.
    pub fn completions_url(&self) -> GenerationResult<String> {
        if !self.config.has_api_key() {
            return Err(GenerationError::Config(
                "Azure OpenAI API key is not configured. Please set AZURE_OPENAI_API_KEY environment variable."
                    .to_string(),
            ));
        }
        if !self.config.has_endpoint() {
            return Err(GenerationError::Config(
                "Azure OpenAI endpoint is not configured. Please set AZURE_OPENAI_ENDPOINT environment variable."
                    .to_string(),
            ));
        }
        let deployment = non_empty(self.config.deployment.as_deref()).ok_or_else(|| {
            GenerationError::Config(
                "Azure OpenAI deployment is not configured. Please set AZURE_COMPLETION_DEPLOYMENT environment variable."
                    .to_string(),
            )
        })?;
        let api_version = non_empty(self.config.api_version.as_deref()).ok_or_else(|| {
            GenerationError::Config(
                "Azure OpenAI API version is not configured. Please set AZURE_OPENAI_API_VERSION environment variable."
                    .to_string(),
            )
        })?;

        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/');

        Ok(format!(
            "{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={api_version}"
        ))
    }

    /// Sends a chat-completions request.
    ///
    /// # Errors
    ///
    /// Returns an error for missing configuration, an empty message list,
    /// transport failures, non-success HTTP status or an unparseable body.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> GenerationResult<Completion> {
        let url = self.completions_url()?;

        if messages.is_empty() {
            return Err(GenerationError::EmptyMessages);
        }

        let body = ChatCompletionRequest {
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            stop: options.stop.as_deref(),
        };

        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let response = self
            .http
            .post(&url)
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                "Azure OpenAI API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let completion = parse_completion(&text)?;
        if let Some(usage) = &completion.usage {
            tracing::debug!(
                "Completion used {} prompt + {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }
        Ok(completion)
    }
}

#[async_trait]
impl GenerationClient for AzureOpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> GenerationResult<Completion> {
        let messages = [
            ChatMessage::system(request.system),
            ChatMessage::user(request.user),
        ];
        self.chat(&messages, &request.options).await
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
