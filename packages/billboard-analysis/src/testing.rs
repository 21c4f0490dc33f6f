//! Testing utilities including a scripted mock analyzer.
//!
//! Useful for exercising the pipeline without network calls.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{TransportError, TransportResult};
use crate::traits::RemoteAnalyzer;
use crate::types::request::ImageUpload;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this raw text
    Text(String),
    /// Fail at the transport level
    Fail(TransportError),
    /// Never answer (for timeout and cancellation tests)
    Hang,
}

impl MockReply {
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    pub fn fail(error: TransportError) -> Self {
        Self::Fail(error)
    }
}

/// Record of a call made to the mock.
#[derive(Debug, Clone)]
pub struct MockAnalyzerCall {
    pub file_name: String,
    pub image_len: usize,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// A mock analyzer that replays scripted replies in order.
///
/// Once the script runs out the default reply is used, which is an
/// [`TransportError::EmptyBody`] unless set.
#[derive(Clone)]
pub struct MockAnalyzer {
    script: Arc<RwLock<VecDeque<MockReply>>>,
    default_reply: MockReply,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAnalyzerCall>>>,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self {
            script: Arc::default(),
            default_reply: MockReply::Fail(TransportError::EmptyBody),
            calls: Arc::default(),
        }
    }
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.script
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Reply used once the queue is empty.
    pub fn with_default_reply(mut self, reply: MockReply) -> Self {
        self.default_reply = reply;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAnalyzerCall> {
        self.calls
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[async_trait]
impl RemoteAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        image: &ImageUpload,
        system_prompt: &str,
        user_prompt: &str,
    ) -> TransportResult<String> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockAnalyzerCall {
                file_name: image.file_name.clone(),
                image_len: image.bytes.len(),
                system_prompt: system_prompt.to_string(),
                user_prompt: user_prompt.to_string(),
            });

        let reply = self
            .script
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Text(raw) => Ok(raw),
            MockReply::Fail(error) => Err(error),
            MockReply::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(TransportError::Timeout { secs: 24 * 60 * 60 })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_script_then_default() {
        let mock = MockAnalyzer::new()
            .with_reply(MockReply::text("first"))
            .with_default_reply(MockReply::text("again"));
        let image = ImageUpload::new("ad.jpg", vec![0xFF, 0xD8]);

        assert_eq!(mock.analyze(&image, "s", "u").await.unwrap(), "first");
        assert_eq!(mock.analyze(&image, "s", "u").await.unwrap(), "again");
        assert_eq!(mock.analyze(&image, "s", "u").await.unwrap(), "again");

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].file_name, "ad.jpg");
        assert_eq!(calls[0].image_len, 2);
    }

    #[test]
    fn test_unscripted_mock_fails() {
        let mock = MockAnalyzer::new();
        let image = ImageUpload::new("ad.jpg", vec![]);
        assert_eq!(
            tokio_test::block_on(mock.analyze(&image, "s", "u")),
            Err(TransportError::EmptyBody)
        );
        mock.clear_calls();
        assert_eq!(mock.call_count(), 0);
    }
}
