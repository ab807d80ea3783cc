//! HTTP client for the supported providers.

use crate::config::LlmConfig;
use crate::parse::parse_outline;
use crate::prompt::build_prompt;
use crate::provider::{Provider, ProviderSettings};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use slidegen_core::{Error, Outline, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Everything needed to ask a provider for an outline.
#[derive(Debug, Clone)]
pub struct OutlineRequest {
    pub provider: Provider,
    pub api_key: SecretString,
    pub text: String,
    pub guidance: Option<String>,
}

/// Something that turns text into a slide outline.
#[async_trait]
pub trait OutlineSource: Send + Sync {
    async fn generate_outline(&self, request: &OutlineRequest) -> Result<Outline>;
}

/// Calls the provider's HTTP API directly.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ProviderUnavailable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send `prompt` and return the provider's text reply.
    pub async fn complete(
        &self,
        provider: Provider,
        api_key: &SecretString,
        prompt: &str,
    ) -> Result<String> {
        let settings = self.config.settings(provider);
        let body = request_body(provider, &settings, prompt, &self.config);

        let response = match self.send(provider, &settings, api_key, &body).await {
            Err(e) if e.is_connect() => {
                log::warn!("Connection to {} failed, retrying once: {}", provider, e);
                self.send(provider, &settings, api_key, &body).await
            }
            other => other,
        }
        .map_err(|e| transport_error(provider, e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(provider, e))?;

        if !(200..300).contains(&status) {
            let message = redact(&text, api_key);
            log::warn!("{} returned HTTP {}", provider, status);
            return Err(classify_status(provider, status, &message));
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            Error::MalformedResponse(format!("{} returned invalid JSON: {}", provider, e))
        })?;
        extract_text(provider, &value)
    }

    async fn send(
        &self,
        provider: Provider,
        settings: &ProviderSettings,
        api_key: &SecretString,
        body: &Value,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let key = api_key.expose_secret();
        let request = match provider {
            Provider::OpenAi | Provider::AiPipe => self
                .http
                .post(format!("{}/chat/completions", settings.base_url))
                .bearer_auth(key),
            Provider::Anthropic => self
                .http
                .post(format!("{}/v1/messages", settings.base_url))
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            Provider::Gemini => self
                .http
                .post(format!(
                    "{}/v1beta/models/{}:generateContent",
                    settings.base_url, settings.model
                ))
                .header("x-goog-api-key", key),
        };
        request.json(body).send().await
    }
}

#[async_trait]
impl OutlineSource for LlmClient {
    async fn generate_outline(&self, request: &OutlineRequest) -> Result<Outline> {
        let prompt = build_prompt(&request.text, request.guidance.as_deref());
        log::info!(
            "Requesting outline from {} ({} chars of text)",
            request.provider,
            request.text.chars().count()
        );

        let reply = tokio::time::timeout(
            self.config.timeout,
            self.complete(request.provider, &request.api_key, &prompt),
        )
        .await
        .map_err(|_| {
            Error::Timeout(format!(
                "{} did not answer within {}s",
                request.provider,
                self.config.timeout.as_secs()
            ))
        })??;

        parse_outline(&reply)
    }
}

/// JSON request body in the provider's wire format.
fn request_body(
    provider: Provider,
    settings: &ProviderSettings,
    prompt: &str,
    config: &LlmConfig,
) -> Value {
    match provider {
        Provider::OpenAi | Provider::AiPipe => json!({
            "model": settings.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        }),
        Provider::Anthropic => json!({
            "model": settings.model,
            "max_tokens": config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        }),
        Provider::Gemini => json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {
                "maxOutputTokens": config.max_tokens,
                "temperature": config.temperature,
            },
        }),
    }
}

/// Pull the generated text out of a successful response.
fn extract_text(provider: Provider, value: &Value) -> Result<String> {
    let text = match provider {
        Provider::OpenAi | Provider::AiPipe => value
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(String::from),
        Provider::Anthropic => join_text(
            value
                .get("content")
                .and_then(Value::as_array)
                .map(|blocks| {
                    blocks
                        .iter()
                        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                        .filter_map(|b| b.get("text").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default(),
        ),
        Provider::Gemini => join_text(
            value
                .pointer("/candidates/0/content/parts")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(|p| p.get("text").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default(),
        ),
    };

    text.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
        Error::MalformedResponse(format!("{} response contained no text", provider))
    })
}

fn join_text(parts: Vec<&str>) -> Option<String> {
    (!parts.is_empty()).then(|| parts.concat())
}

/// Map a non-success HTTP status to the error taxonomy.
fn classify_status(provider: Provider, status: u16, body: &str) -> Error {
    let detail = error_message(body);
    let suffix = detail
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default();

    match status {
        401 | 403 => Error::Auth(format!("{} rejected the API key{}", provider, suffix)),
        400 if provider == Provider::Gemini && body.contains("API_KEY_INVALID") => {
            Error::Auth(format!("{} rejected the API key{}", provider, suffix))
        }
        429 => Error::RateLimit(format!("{} rate limit exceeded{}", provider, suffix)),
        408 | 500..=599 => Error::ProviderUnavailable(format!(
            "{} is unavailable (HTTP {}){}",
            provider, status, suffix
        )),
        other => Error::ProviderUnavailable(format!(
            "{} request failed with HTTP {}{}",
            provider, other, suffix
        )),
    }
}

/// `error.message` from the common JSON error envelope.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

fn transport_error(provider: Provider, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(format!("{} request timed out", provider))
    } else {
        Error::ProviderUnavailable(format!("could not reach {}: {}", provider, e.without_url()))
    }
}

/// Keep the key out of anything we log or return.
fn redact(text: &str, api_key: &SecretString) -> String {
    let key = api_key.expose_secret();
    if key.len() < 4 {
        return text.to_string();
    }
    text.replace(key, "***")
}
