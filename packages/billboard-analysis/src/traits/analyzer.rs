//! Remote vision analyzer trait.
//!
//! Implementations wrap a specific multimodal provider and return the raw
//! completion text. Interpreting that text is the pipeline's job.

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::types::request::ImageUpload;

/// A multimodal model that reads a billboard image.
#[async_trait]
pub trait RemoteAnalyzer: Send + Sync {
    /// Send the image with both prompts and return the raw response text.
    ///
    /// Non-2xx statuses, timeouts and empty bodies are all
    /// [`TransportError`](crate::TransportError)s.
    async fn analyze(
        &self,
        image: &ImageUpload,
        system_prompt: &str,
        user_prompt: &str,
    ) -> TransportResult<String>;
}

#[async_trait]
impl<A: RemoteAnalyzer + ?Sized> RemoteAnalyzer for std::sync::Arc<A> {
    async fn analyze(
        &self,
        image: &ImageUpload,
        system_prompt: &str,
        user_prompt: &str,
    ) -> TransportResult<String> {
        (**self).analyze(image, system_prompt, user_prompt).await
    }
}
