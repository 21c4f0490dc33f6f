//! Response validation seam.
//!
//! The genericness heuristic is brittle by nature, so it sits behind a trait
//! and the retry loop only ever sees a [`Verdict`].

use crate::pipeline::validate::RejectReason;
use crate::types::candidate::AnalysisCandidate;

/// Accept or reject a parsed model response.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Decides whether a parsed response is substantive enough to score.
///
/// Implementations are best-effort filters: accepting a lazy answer is
/// tolerable, the retry budget bounds the cost of rejecting a good one.
pub trait ResponseValidator: Send + Sync {
    /// Inspect the candidate (and the raw text it came from).
    fn validate(&self, candidate: &AnalysisCandidate, raw: &str) -> Verdict;
}

impl<V: ResponseValidator + ?Sized> ResponseValidator for Box<V> {
    fn validate(&self, candidate: &AnalysisCandidate, raw: &str) -> Verdict {
        (**self).validate(candidate, raw)
    }
}

impl<V: ResponseValidator + ?Sized> ResponseValidator for std::sync::Arc<V> {
    fn validate(&self, candidate: &AnalysisCandidate, raw: &str) -> Verdict {
        (**self).validate(candidate, raw)
    }
}
