//! Typed errors for the analysis library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). The public
//! `analyze_billboard` entry point never surfaces these: every failure
//! category ends in a fallback [`AnalysisResult`](crate::AnalysisResult).

use thiserror::Error;

use crate::pipeline::validate::RejectReason;

/// Errors surfaced by library operations that can fail.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Catalog lookup missed
    #[error("billboard location not found: {id}")]
    LocationNotFound { id: String },

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),
}

/// Failures of the remote vision call.
///
/// All variants are treated identically by the pipeline: escalate straight
/// to fallback synthesis without consuming a validation retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Non-2xx HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The call exceeded its deadline
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The model answered with nothing
    #[error("empty response body")]
    EmptyBody,

    /// Connection-level failure
    #[error("network failure: {0}")]
    Network(String),
}

/// Why a response attempt was not accepted.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AttemptFailure {
    /// No JSON object could be read from the raw text
    #[error("unparseable response ({0})")]
    Parse(String),

    /// JSON parsed but the validator rejected it
    #[error("rejected response ({0})")]
    Rejected(RejectReason),
}

/// Why the fallback synthesizer was invoked. Rendered into `api_note`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FallbackCause {
    /// The remote analyzer failed at the transport level
    #[error("vision model unavailable ({0})")]
    Transport(TransportError),

    /// Every attempt was rejected and the salvage parser found no score
    #[error(
        "no usable model response after {attempts} attempts{}",
        last_failure_suffix(.last_failure)
    )]
    ExhaustedRetries {
        attempts: u32,
        last_failure: Option<AttemptFailure>,
    },
}

fn last_failure_suffix(last_failure: &Option<AttemptFailure>) -> String {
    last_failure
        .as_ref()
        .map(|failure| format!(", last: {}", failure))
        .unwrap_or_default()
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Result type alias for remote analyzer calls.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_cause_names_transport_failure() {
        let cause = FallbackCause::Transport(TransportError::Timeout { secs: 60 });
        assert_eq!(
            cause.to_string(),
            "vision model unavailable (timed out after 60s)"
        );
    }

    #[test]
    fn test_fallback_cause_names_last_failure() {
        let cause = FallbackCause::ExhaustedRetries {
            attempts: 3,
            last_failure: Some(AttemptFailure::Parse("no JSON object".into())),
        };
        assert!(cause.to_string().contains("after 3 attempts"));
        assert!(cause.to_string().contains("no JSON object"));
    }

    #[test]
    fn test_fallback_cause_without_last_failure() {
        let cause = FallbackCause::ExhaustedRetries {
            attempts: 0,
            last_failure: None,
        };
        assert_eq!(cause.to_string(), "no usable model response after 0 attempts");
    }
}
