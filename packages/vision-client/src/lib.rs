//! Minimal OpenAI-compatible chat client with image input.
//!
//! No domain logic: callers build prompts, this crate ships them together
//! with an image and returns the completion text.
//!
//! # Example
//!
//! ```rust,ignore
//! use vision_client::{ChatRequest, ImageData, Message, VisionClient};
//!
//! let client = VisionClient::from_env()?;
//! let image = ImageData::new(std::fs::read("board.jpg")?);
//!
//! let response = client.chat_completion(
//!     ChatRequest::new("gpt-4o")
//!         .message(Message::system("You review billboards."))
//!         .message(Message::user_with_image("Critique this design", &image)),
//! ).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, VisionError};
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat client.
#[derive(Clone)]
pub struct VisionClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl VisionClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| VisionError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, local gateways).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Apply a whole-request timeout to every call.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::Config(e.to_string()))?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Returns [`VisionError::EmptyCompletion`] when the API answers with a
    /// missing or blank message.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Vision request failed");
                VisionError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Vision API error");
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| VisionError::Parse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(VisionError::EmptyCompletion)?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            response_len = content.len(),
            "Vision chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}
