//! The public analysis entry point.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::BillboardCatalog;
use crate::error::{FallbackCause, Result};
use crate::pipeline::fallback::{synthesize_fallback, FallbackRequest};
use crate::pipeline::parse::salvage_unstructured;
use crate::pipeline::prompts::build_prompts;
use crate::pipeline::retry::{RetryOrchestrator, RetryOutcome};
use crate::pipeline::scoring::ScoreMapper;
use crate::pipeline::validate::HeuristicValidator;
use crate::traits::{RemoteAnalyzer, ResponseValidator};
use crate::types::config::AnalysisConfig;
use crate::types::context::AnalysisContext;
use crate::types::request::AnalysisRequest;
use crate::types::result::{AnalysisResult, Provenance};

/// Analyzes billboard creatives against their site.
///
/// Cheap to share behind an `Arc`; requests are independent.
///
/// # Example
///
/// ```rust,ignore
/// use billboard_analysis::{AnalysisRequest, BillboardAnalyzer, ImageUpload};
///
/// let analyzer = BillboardAnalyzer::new(vision);
/// let request = AnalysisRequest::new(ImageUpload::new("ad.jpg", bytes), "sq-qurum-01");
/// let result = analyzer.analyze_billboard(&request).await;
/// println!("{}/100", result.overall_score);
/// ```
pub struct BillboardAnalyzer<A, V = HeuristicValidator> {
    analyzer: A,
    validator: V,
    config: AnalysisConfig,
}

impl<A: RemoteAnalyzer> BillboardAnalyzer<A> {
    /// Create an analyzer with the default config and heuristic validator.
    pub fn new(analyzer: A) -> Self {
        let config = AnalysisConfig::default();
        Self {
            analyzer,
            validator: HeuristicValidator::new(config.genericness_band),
            config,
        }
    }

    /// Replace the config. The heuristic validator picks up its band.
    pub fn with_config(self, config: AnalysisConfig) -> Self {
        Self {
            validator: HeuristicValidator::new(config.genericness_band),
            config,
            ..self
        }
    }
}

impl<A: RemoteAnalyzer, V: ResponseValidator> BillboardAnalyzer<A, V> {
    /// Swap the validation strategy.
    pub fn with_validator<W: ResponseValidator>(self, validator: W) -> BillboardAnalyzer<A, W> {
        BillboardAnalyzer {
            analyzer: self.analyzer,
            validator,
            config: self.config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Resolve the site: explicit metadata, then catalog id, then defaults.
    pub fn context_for(&self, request: &AnalysisRequest) -> AnalysisContext {
        if let Some(metadata) = &request.metadata {
            return AnalysisContext::from_location(metadata, request.distance_m);
        }

        match BillboardCatalog::lookup(&request.location) {
            Ok(location) => AnalysisContext::from_location(location, request.distance_m),
            Err(e) => {
                debug!(error = %e, "No catalog entry, using default geometry");
                AnalysisContext::defaults(request.location.clone(), request.distance_m)
            }
        }
    }

    /// Analyze one creative. Always returns a result.
    pub async fn analyze_billboard(&self, request: &AnalysisRequest) -> AnalysisResult {
        let context = self.context_for(request);
        match self.run(request, &context, &CancellationToken::new()).await {
            Ok(result) => result,
            // An uncancelled token cannot cancel; kept total all the same.
            Err(e) => {
                warn!(error = %e, "Analysis aborted, using fallback");
                self.fallback(
                    request,
                    &context,
                    FallbackCause::ExhaustedRetries {
                        attempts: 0,
                        last_failure: None,
                    },
                )
            }
        }
    }

    /// Analyze with cancellation support.
    ///
    /// The only error is [`AnalysisError::Cancelled`](crate::AnalysisError::Cancelled).
    pub async fn analyze_with_cancel(
        &self,
        request: &AnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<AnalysisResult> {
        let context = self.context_for(request);
        self.run(request, &context, &cancel).await
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        context: &AnalysisContext,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let prompts = build_prompts(context, &request.image.file_name);
        let outcome = RetryOrchestrator::new(&self.analyzer, &self.validator, &self.config)
            .run(&request.image, &prompts, cancel)
            .await?;

        let mapper = ScoreMapper::new(context);
        let result = match outcome {
            RetryOutcome::Accepted { candidate, .. } => mapper.map(&candidate, Provenance::Model),
            RetryOutcome::Exhausted {
                responses,
                last_failure,
                attempts,
            } => match salvage_unstructured(&responses) {
                Some(candidate) => {
                    let mut note = format!(
                        "Salvaged from an unstructured response after {} attempts",
                        attempts
                    );
                    if let Some(failure) = &last_failure {
                        note.push_str(&format!(" (last: {})", failure));
                    }
                    note.push_str("; scores are approximate.");
                    mapper
                        .map(&candidate, Provenance::Salvaged)
                        .with_api_note(note)
                }
                None => self.fallback(
                    request,
                    context,
                    FallbackCause::ExhaustedRetries {
                        attempts,
                        last_failure,
                    },
                ),
            },
            RetryOutcome::Escalated { error, .. } => {
                self.fallback(request, context, FallbackCause::Transport(error))
            }
        };

        info!(
            location = %request.location,
            file_name = %request.image.file_name,
            provenance = ?result.provenance,
            overall_score = result.overall_score,
            "Billboard analysis complete"
        );
        Ok(result)
    }

    fn fallback(
        &self,
        request: &AnalysisRequest,
        context: &AnalysisContext,
        cause: FallbackCause,
    ) -> AnalysisResult {
        warn!(cause = %cause, "Synthesizing fallback analysis");
        synthesize_fallback(&FallbackRequest {
            file_name: &request.image.file_name,
            location: &request.location,
            context,
            cause,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::pipeline::validate::StructuralValidator;
    use crate::testing::{MockAnalyzer, MockReply};
    use crate::types::location::BillboardLocation;
    use crate::types::request::ImageUpload;

    const GOOD: &str = r#"{"text_content": {"headline": "زوروا نزوى", "cta": "Book"},
        "arabic_analysis": {"arabic_detected": true, "arabic_is_primary": true},
        "assessment": {"overall_score": 6.1}}"#;
    const GENERIC: &str = r#"{"text_content": {"headline": "Sale"}, "assessment": {"overall_score": 7.2}}"#;

    fn request(location: &str) -> AnalysisRequest {
        AnalysisRequest::new(ImageUpload::new("ad.jpg", vec![0xFF, 0xD8, 0xFF]), location)
    }

    fn quick() -> AnalysisConfig {
        AnalysisConfig::default().with_backoff_base_ms(1)
    }

    #[tokio::test]
    async fn test_model_path() {
        let mock = MockAnalyzer::new().with_reply(MockReply::text(GOOD));
        let analyzer = BillboardAnalyzer::new(mock.clone()).with_config(quick());

        let result = analyzer.analyze_billboard(&request("sq-qurum-01")).await;
        assert_eq!(result.provenance, Provenance::Model);
        assert_eq!(result.overall_score, 61);
        assert!(result.api_note.is_none());
        assert!(mock.calls()[0].user_prompt.contains("MARKET CONTEXT"));
    }

    #[tokio::test]
    async fn test_unknown_location_uses_defaults() {
        let analyzer = BillboardAnalyzer::new(MockAnalyzer::new());
        let ctx = analyzer.context_for(&request("Somewhere in Sur"));
        assert!(!ctx.from_metadata);
        assert_eq!(ctx.viewing_distance_m, 100.0);
    }

    #[tokio::test]
    async fn test_explicit_distance_wins_over_metadata() {
        let analyzer = BillboardAnalyzer::new(MockAnalyzer::new());
        let ctx = analyzer.context_for(&request("sq-qurum-01").with_distance(140.0));
        assert_eq!(ctx.viewing_distance_m, 140.0);
    }

    #[tokio::test]
    async fn test_exhausted_generic_responses_fall_back() {
        let mock = MockAnalyzer::new().with_default_reply(MockReply::text(GENERIC));
        let analyzer = BillboardAnalyzer::new(mock.clone()).with_config(quick());

        let result = analyzer.analyze_billboard(&request("Sultan Qaboos")).await;
        assert_eq!(mock.call_count(), 3);
        assert_eq!(result.provenance, Provenance::Fallback);
        assert_ne!(result.overall_score, 72);
        let note = result.api_note.unwrap();
        assert!(note.contains("after 3 attempts"));
        assert!(note.contains("looks like a default"));
    }

    #[tokio::test]
    async fn test_free_text_after_rejections_is_salvaged() {
        let mock = MockAnalyzer::new()
            .with_reply(MockReply::text(GENERIC))
            .with_reply(MockReply::text(GENERIC))
            .with_reply(MockReply::text("Overall score: 3/10\n- Too many words"));
        let analyzer = BillboardAnalyzer::new(mock.clone()).with_config(quick());

        let result = analyzer.analyze_billboard(&request("Sultan Qaboos")).await;
        assert_eq!(mock.call_count(), 3);
        assert_eq!(result.provenance, Provenance::Salvaged);
        assert_eq!(result.overall_score, 30);
        assert!(result.api_note.unwrap().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_metadata_location_drives_prompt() {
        let site = BillboardLocation::new("private-7", "Private Board")
            .with_road("Sur Coastal Road", "Sur")
            .with_size(8.0, 3.0)
            .with_distance(60.0);
        let mock = MockAnalyzer::new().with_reply(MockReply::text(GOOD));
        let analyzer = BillboardAnalyzer::new(mock.clone()).with_config(quick());
        let req = request("private-7").with_metadata(site.clone());

        let ctx = analyzer.context_for(&req);
        assert!(ctx.from_metadata);
        assert_eq!(ctx.viewing_distance_m, 60.0);

        analyzer.analyze_billboard(&req).await;
        let prompt = &mock.calls()[0].user_prompt;
        assert!(prompt.contains("Location: Private Board, Sur"));
        assert!(prompt.contains("Board: 8.0 m wide x 3.0 m high, viewed from 60 m"));

        let overridden = analyzer.context_for(
            &request("private-7")
                .with_metadata(site)
                .with_distance(140.0),
        );
        assert_eq!(overridden.viewing_distance_m, 140.0);
        assert_eq!(overridden.geometry.height_m, 3.0);
    }

    #[tokio::test]
    async fn test_structural_validator_accepts_generic_score() {
        let mock = MockAnalyzer::new().with_default_reply(MockReply::text(GENERIC));
        let analyzer = BillboardAnalyzer::new(mock.clone())
            .with_config(quick())
            .with_validator(StructuralValidator);

        let result = analyzer.analyze_billboard(&request("Sultan Qaboos")).await;
        assert_eq!(mock.call_count(), 1);
        assert_eq!(result.provenance, Provenance::Model);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_once() {
        let mock = MockAnalyzer::new()
            .with_default_reply(MockReply::fail(TransportError::Network("dns".into())));
        let analyzer = BillboardAnalyzer::new(mock.clone()).with_config(quick());

        let result = analyzer.analyze_billboard(&request("Sultan Qaboos")).await;
        assert_eq!(mock.call_count(), 1);
        assert_eq!(result.provenance, Provenance::Fallback);
        assert_eq!(result.overall_score, 55);
    }

    #[tokio::test]
    async fn test_cancel_returns_error() {
        let mock = MockAnalyzer::new().with_default_reply(MockReply::Hang);
        let analyzer = BillboardAnalyzer::new(mock);
        let cancel = CancellationToken::new();

        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                cancel.cancel();
            })
        };

        let result = analyzer
            .analyze_with_cancel(&request("Sultan Qaboos"), cancel)
            .await;
        handle.await.unwrap();
        assert!(matches!(result, Err(crate::AnalysisError::Cancelled)));
    }
}
