//! Claude API client.
//!
//! Non-streaming access to the Anthropic Messages API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::ClaudeConfig;

use super::TextCompletion;
use super::error::{ApiErrorResponse, ClaudeError};
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 512;

/// Claude API client.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    model: String,
    api_url: String,
}

impl ClaudeClient {
    /// Create a new Claude client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key contains invalid header characters or
    /// the HTTP client cannot be built.
    pub fn new(config: &ClaudeConfig) -> Result<Self, ClaudeError> {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key_header = HeaderValue::from_str(api_key)
            .map_err(|_| ClaudeError::Config("API key is not a valid header value".to_string()))?;
        key_header.set_sensitive(true);
        headers.insert("x-api-key", key_header);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                model: config.model.clone(),
                api_url: ANTHROPIC_API_URL.to_string(),
            }),
        })
    }

    /// The model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Send a chat request and get a complete response.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, messages, system), fields(model = %self.inner.model))]
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
    ) -> Result<ChatResponse, ClaudeError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, ClaudeError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ClaudeError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ClaudeError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return ClaudeError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ClaudeError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => parse_error_body(body),
            Err(e) => ClaudeError::Http(e),
        }
    }
}

#[async_trait]
impl TextCompletion for ClaudeClient {
    async fn complete(&self, prompt: &str) -> Result<String, ClaudeError> {
        let response = self.chat(vec![Message::user(prompt)], None).await?;
        tracing::debug!(
            response_id = %response.id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );
        let text = response.text();
        if text.trim().is_empty() {
            return Err(ClaudeError::EmptyCompletion);
        }
        Ok(text)
    }
}

fn parse_error_body(body: String) -> ClaudeError {
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_error) => ClaudeError::Api {
            error_type: api_error.error.error_type,
            message: api_error.error.message,
        },
        Err(_) => ClaudeError::Api {
            error_type: "unknown".to_string(),
            message: body,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config() -> ClaudeConfig {
        ClaudeConfig {
            api_key: SecretString::from("sk-ant-test-9f8e7d6c5b4a"),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }

    #[test]
    fn test_new_client_uses_configured_model() {
        let client = ClaudeClient::new(&config()).unwrap();
        assert_eq!(client.model(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_new_client_rejects_header_breaking_key() {
        let mut config = config();
        config.api_key = SecretString::from("bad\nkey");
        assert!(matches!(
            ClaudeClient::new(&config),
            Err(ClaudeError::Config(_))
        ));
    }

    #[test]
    fn test_parse_error_body_falls_back_to_raw_text() {
        let err = parse_error_body("upstream exploded".to_string());
        assert!(matches!(err, ClaudeError::Api { error_type, .. } if error_type == "unknown"));
    }

    #[test]
    fn test_claude_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ClaudeClient>();
    }
}
