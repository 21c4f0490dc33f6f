//! Billboard Creative Readability Analysis
//!
//! Scores a billboard creative for legibility at its actual site: board
//! size, viewing distance and traffic speed set numeric thresholds, a
//! vision model reads the image against them, and the answer is validated,
//! retried, mapped onto a fixed 0–100 schema, or replaced by a deterministic
//! fallback when the model is unreachable.
//!
//! # Design Philosophy
//!
//! - The model is untrusted: every response is parsed leniently, validated,
//!   and clamped
//! - Transport failures never burn validation retries
//! - The public entry point always returns a result; provenance says where
//!   the numbers came from
//! - Site scoring is pure arithmetic and never touches the network
//!
//! # Usage
//!
//! ```rust,ignore
//! use billboard_analysis::{AnalysisRequest, BillboardAnalyzer, ImageUpload};
//! use billboard_analysis::testing::{MockAnalyzer, MockReply};
//!
//! let analyzer = BillboardAnalyzer::new(MockAnalyzer::new());
//! let request = AnalysisRequest::new(ImageUpload::new("ad.jpg", bytes), "sq-qurum-01")
//!     .with_distance(120.0);
//! let result = analyzer.analyze_billboard(&request).await;
//!
//! let site = billboard_analysis::BillboardCatalog::lookup("sq-qurum-01")?;
//! let score = billboard_analysis::score_location(site);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for the remote model and response validation
//! - [`types`] - Locations, wire schema, results, config
//! - [`pipeline`] - Geometry, prompts, retry, scoring, fallback, site scoring
//! - [`catalog`] - The static board catalog
//! - [`testing`] - Mock analyzer for tests

pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use catalog::BillboardCatalog;
pub use error::{
    AnalysisError, AttemptFailure, FallbackCause, Result, TransportError, TransportResult,
};
pub use traits::{RemoteAnalyzer, ResponseValidator, Verdict};
pub use types::{
    candidate::{AnalysisCandidate, Priority, Recommendation},
    config::{AnalysisConfig, GenericnessBand},
    context::AnalysisContext,
    location::{BillboardLocation, BoardFormat, Directionality, Lighting, Ownership, RoadCategory},
    request::{AnalysisRequest, ImageUpload},
    result::{
        AnalysisResult, CategoryScores, DistanceCurve, Issue, IssueLists, IssueOrigin, Provenance,
    },
    score::LocationScore,
};

// Re-export pipeline components
pub use pipeline::{
    build_prompts, identity_hash, rank_locations, salvage_candidate, score_location,
    synthesize_fallback, BillboardAnalyzer, BoardGeometry, FallbackRequest, GeometryThresholds,
    HeuristicValidator, PromptPair, RankedLocation, RejectReason, ScoreMapper, SeededRng,
    StructuralValidator,
};

#[cfg(feature = "openai")]
pub use ai::OpenAIVisionAnalyzer;
