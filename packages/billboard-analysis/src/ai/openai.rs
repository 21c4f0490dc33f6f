//! OpenAI vision implementation of the remote analyzer.
//!
//! # Example
//!
//! ```rust,ignore
//! use billboard_analysis::ai::OpenAIVisionAnalyzer;
//!
//! let vision = OpenAIVisionAnalyzer::from_env()?.with_model("gpt-4o");
//! let analyzer = BillboardAnalyzer::new(vision);
//! ```

use async_trait::async_trait;
use tracing::debug;
use vision_client::{
    truncate_to_char_boundary, ChatRequest, ImageData, Message, VisionClient, VisionError,
};

use crate::error::{AnalysisError, Result, TransportError, TransportResult};
use crate::traits::RemoteAnalyzer;
use crate::types::request::ImageUpload;

const DEFAULT_MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 2000;
const LOG_PREVIEW_BYTES: usize = 200;

/// Sends the creative and both prompts to an OpenAI-compatible vision model.
#[derive(Clone)]
pub struct OpenAIVisionAnalyzer {
    client: VisionClient,
    model: String,
}

impl OpenAIVisionAnalyzer {
    pub fn new(client: VisionClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let client = VisionClient::from_env().map_err(|e| AnalysisError::Config(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Set the vision model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl From<VisionError> for TransportError {
    fn from(e: VisionError) -> Self {
        match e {
            VisionError::Api { status, body } => TransportError::Status { status, body },
            VisionError::EmptyCompletion => TransportError::EmptyBody,
            VisionError::Network(msg) => TransportError::Network(msg),
            other => TransportError::Network(other.to_string()),
        }
    }
}

#[async_trait]
impl RemoteAnalyzer for OpenAIVisionAnalyzer {
    async fn analyze(
        &self,
        image: &ImageUpload,
        system_prompt: &str,
        user_prompt: &str,
    ) -> TransportResult<String> {
        let data = ImageData::new(image.bytes.clone());
        debug!(
            model = %self.model,
            file_name = %image.file_name,
            mime = data.mime(),
            image_bytes = data.len(),
            "Sending creative to vision model"
        );

        let request = ChatRequest::new(&self.model)
            .message(Message::system(system_prompt))
            .message(Message::user_with_image(user_prompt, &data))
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS);

        let response = self.client.chat_completion(request).await?;
        debug!(
            total_tokens = response.usage.as_ref().map(|u| u.total_tokens),
            preview = truncate_to_char_boundary(&response.content, LOG_PREVIEW_BYTES),
            "Vision model answered"
        );
        Ok(response.content)
    }
}
