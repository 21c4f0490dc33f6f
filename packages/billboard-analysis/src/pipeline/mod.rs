//! The analysis pipeline: geometry → prompt → call → validate → score.

pub mod analyzer;
pub mod fallback;
pub mod geometry;
pub mod parse;
pub mod prompts;
pub mod retry;
pub mod scoring;
pub mod site_scoring;
pub mod validate;

pub use analyzer::BillboardAnalyzer;
pub use fallback::{identity_hash, synthesize_fallback, FallbackRequest, SeededRng};
pub use geometry::{BoardGeometry, GeometryThresholds};
pub use parse::{parse_candidate, salvage_candidate, salvage_unstructured};
pub use prompts::{build_prompts, format_context_prompt, PromptPair, SYSTEM_PROMPT};
pub use retry::{AttemptPhase, AttemptState, RetryOrchestrator, RetryOutcome};
pub use scoring::ScoreMapper;
pub use site_scoring::{rank_locations, score_location, RankedLocation};
pub use validate::{HeuristicValidator, RejectReason, StructuralValidator};
