//! Validation strategies for parsed model responses.

use thiserror::Error;

use crate::traits::validator::{ResponseValidator, Verdict};
use crate::types::candidate::AnalysisCandidate;
use crate::types::config::GenericnessBand;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RejectReason {
    /// Neither `assessment.overall_score` nor a legacy `overall_score`
    #[error("assessment.overall_score is missing")]
    MissingOverallScore,

    /// Neither `text_content` nor legacy free-text fields
    #[error("text_content is missing and no free-text analysis was given")]
    MissingTextContent,

    /// Score sits in the band templated responses cluster in
    #[error("overall_score {score:.1} looks like a default rather than a measured score")]
    GenericScore { score: f64 },

    /// `readability_metrics` present without a required field
    #[error("readability_metrics.{missing} is missing")]
    IncompleteMetrics { missing: &'static str },
}

fn check_structure(candidate: &AnalysisCandidate) -> Option<RejectReason> {
    if candidate.overall_score().is_none() {
        return Some(RejectReason::MissingOverallScore);
    }
    if !candidate.has_text_content() && !candidate.has_legacy_text() {
        return Some(RejectReason::MissingTextContent);
    }
    None
}

fn check_metrics(candidate: &AnalysisCandidate) -> Option<RejectReason> {
    let metrics = candidate.readability_metrics.as_ref()?;
    if metrics.word_count.is_none() {
        return Some(RejectReason::IncompleteMetrics {
            missing: "word_count",
        });
    }
    if metrics.viewing_time_seconds.is_none() {
        return Some(RejectReason::IncompleteMetrics {
            missing: "viewing_time_seconds",
        });
    }
    None
}

/// Default strategy: structure, then genericness band, then metrics.
#[derive(Debug, Clone, Default)]
pub struct HeuristicValidator {
    band: GenericnessBand,
}

impl HeuristicValidator {
    pub fn new(band: GenericnessBand) -> Self {
        Self { band }
    }
}

impl ResponseValidator for HeuristicValidator {
    fn validate(&self, candidate: &AnalysisCandidate, _raw: &str) -> Verdict {
        if let Some(reason) = check_structure(candidate) {
            return Verdict::Reject(reason);
        }

        // check_structure guarantees a score here.
        if let Some(score) = candidate.overall_score() {
            if self.band.contains(score) {
                return Verdict::Reject(RejectReason::GenericScore { score });
            }
        }

        match check_metrics(candidate) {
            Some(reason) => Verdict::Reject(reason),
            None => Verdict::Accept,
        }
    }
}

/// Structure and metrics only; never rejects on score value.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl ResponseValidator for StructuralValidator {
    fn validate(&self, candidate: &AnalysisCandidate, _raw: &str) -> Verdict {
        match check_structure(candidate).or_else(|| check_metrics(candidate)) {
            Some(reason) => Verdict::Reject(reason),
            None => Verdict::Accept,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AnalysisCandidate {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_generic_score_without_text_content_is_rejected() {
        let candidate = parse(r#"{"assessment": {"overall_score": 7.2}}"#);
        let verdict = HeuristicValidator::default().validate(&candidate, "");
        assert!(!verdict.is_accept());
    }

    #[test]
    fn test_generic_band_rejects_otherwise_complete_response() {
        // Band is calibrated, not derived: a genuine 7.2 is a known false positive.
        let candidate = parse(
            r#"{"text_content": {"headline": "Visit Nizwa"}, "assessment": {"overall_score": 7.2}}"#,
        );
        assert_eq!(
            HeuristicValidator::default().validate(&candidate, ""),
            Verdict::Reject(RejectReason::GenericScore { score: 7.2 })
        );
    }

    #[test]
    fn test_missing_score_rejected_first() {
        let candidate = parse(r#"{"text_content": {"headline": "Visit Nizwa"}}"#);
        assert_eq!(
            HeuristicValidator::default().validate(&candidate, ""),
            Verdict::Reject(RejectReason::MissingOverallScore)
        );
    }

    #[test]
    fn test_legacy_text_satisfies_structure() {
        let candidate = parse(r#"{"overall_score": 5.5, "analysis": "Headline is too thin"}"#);
        assert!(HeuristicValidator::default()
            .validate(&candidate, "")
            .is_accept());
    }

    #[test]
    fn test_missing_text_rejected_outside_band() {
        let candidate = parse(r#"{"assessment": {"overall_score": 4.0}}"#);
        assert_eq!(
            HeuristicValidator::default().validate(&candidate, ""),
            Verdict::Reject(RejectReason::MissingTextContent)
        );
    }

    #[test]
    fn test_incomplete_metrics_rejected() {
        let candidate = parse(
            r#"{"text_content": {"headline": "Sale"}, "assessment": {"overall_score": 5},
                "readability_metrics": {"word_count": 4}}"#,
        );
        assert_eq!(
            HeuristicValidator::default().validate(&candidate, ""),
            Verdict::Reject(RejectReason::IncompleteMetrics {
                missing: "viewing_time_seconds"
            })
        );
    }

    #[test]
    fn test_structural_validator_ignores_band() {
        let candidate = parse(
            r#"{"text_content": {"headline": "Visit Nizwa"}, "assessment": {"overall_score": 7.2}}"#,
        );
        assert!(StructuralValidator.validate(&candidate, "").is_accept());
    }

    #[test]
    fn test_custom_band() {
        let validator = HeuristicValidator::new(GenericnessBand { low: 5.0, high: 5.0 });
        let candidate = parse(r#"{"analysis": "ok", "overall_score": 5.0}"#);
        assert!(!validator.validate(&candidate, "").is_accept());
        let candidate = parse(r#"{"analysis": "ok", "overall_score": 7.2}"#);
        assert!(validator.validate(&candidate, "").is_accept());
    }
}
