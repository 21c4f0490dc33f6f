//! Bounded validation retry around the remote analyzer.
//!
//! Attempt bookkeeping lives in [`AttemptState`], advanced by the pure
//! [`AttemptState::advance`]. The async driver only performs the side
//! effects: calling the model, sleeping, and watching for cancellation.

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, AttemptFailure, Result, TransportError};
use crate::pipeline::parse::parse_candidate;
use crate::pipeline::prompts::{format_retry_note, PromptPair};
use crate::traits::{RemoteAnalyzer, ResponseValidator, Verdict};
use crate::types::candidate::AnalysisCandidate;
use crate::types::config::AnalysisConfig;
use crate::types::request::ImageUpload;

/// Where an attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Calling,
    Parsing,
    Validating,
    Accepted,
    Rejected,
}

/// Inputs that move an attempt forward.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptEvent {
    /// The model answered with non-empty text
    Responded(String),
    Parsed,
    ParseFailed(String),
    Judged(Verdict),
    /// Start the next attempt after a rejection
    Retry,
}

/// Explicit per-request attempt state.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptState {
    /// Zero-based index of the current attempt
    pub attempt: u32,
    pub max_retries: u32,
    pub phase: AttemptPhase,
    pub last_failure: Option<AttemptFailure>,

    /// Every raw response seen so far, oldest first
    pub responses: Vec<String>,
}

impl AttemptState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            attempt: 0,
            max_retries,
            phase: AttemptPhase::Calling,
            last_failure: None,
            responses: Vec::new(),
        }
    }

    /// Apply one event. Events that make no sense in the current phase
    /// leave the state untouched.
    pub fn advance(mut self, event: AttemptEvent) -> Self {
        match (self.phase, event) {
            (AttemptPhase::Calling, AttemptEvent::Responded(raw)) => {
                self.responses.push(raw);
                self.phase = AttemptPhase::Parsing;
            }
            (AttemptPhase::Parsing, AttemptEvent::Parsed) => {
                self.phase = AttemptPhase::Validating;
            }
            (AttemptPhase::Parsing, AttemptEvent::ParseFailed(msg)) => {
                self.last_failure = Some(AttemptFailure::Parse(msg));
                self.phase = AttemptPhase::Rejected;
            }
            (AttemptPhase::Validating, AttemptEvent::Judged(Verdict::Accept)) => {
                self.phase = AttemptPhase::Accepted;
            }
            (AttemptPhase::Validating, AttemptEvent::Judged(Verdict::Reject(reason))) => {
                self.last_failure = Some(AttemptFailure::Rejected(reason));
                self.phase = AttemptPhase::Rejected;
            }
            (AttemptPhase::Rejected, AttemptEvent::Retry) if self.can_retry() => {
                self.attempt += 1;
                self.phase = AttemptPhase::Calling;
            }
            _ => {}
        }
        self
    }

    /// Whether a rejected attempt may be followed by another call.
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_retries
    }

    /// Calls made so far, counting the one in flight.
    pub fn calls_made(&self) -> u32 {
        self.attempt + 1
    }

    pub fn last_raw(&self) -> Option<&str> {
        self.responses.last().map(String::as_str)
    }

    /// User prompt for the current attempt, with a correction note after a
    /// rejection.
    pub fn user_prompt(&self, base: &str) -> String {
        match (&self.last_failure, self.attempt) {
            (Some(failure), attempt) if attempt > 0 => {
                format!("{}{}", base, format_retry_note(&failure.to_string()))
            }
            _ => base.to_string(),
        }
    }
}

/// How the retry loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome {
    /// A response passed validation
    Accepted {
        candidate: AnalysisCandidate,
        attempts: u32,
    },

    /// Every attempt was rejected; responses are kept for salvage
    Exhausted {
        responses: Vec<String>,
        last_failure: Option<AttemptFailure>,
        attempts: u32,
    },

    /// Transport failure; no further calls were made
    Escalated {
        error: TransportError,
        attempts: u32,
    },
}

impl RetryOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Accepted { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::Escalated { attempts, .. } => *attempts,
        }
    }
}

/// Drives calls to the remote analyzer until one validates or the budget
/// runs out.
pub struct RetryOrchestrator<'a, A: ?Sized, V: ?Sized> {
    analyzer: &'a A,
    validator: &'a V,
    config: &'a AnalysisConfig,
}

impl<'a, A, V> RetryOrchestrator<'a, A, V>
where
    A: RemoteAnalyzer + ?Sized,
    V: ResponseValidator + ?Sized,
{
    pub fn new(analyzer: &'a A, validator: &'a V, config: &'a AnalysisConfig) -> Self {
        Self {
            analyzer,
            validator,
            config,
        }
    }

    /// Run the loop. The only error is [`AnalysisError::Cancelled`].
    pub async fn run(
        &self,
        image: &ImageUpload,
        prompts: &PromptPair,
        cancel: &CancellationToken,
    ) -> Result<RetryOutcome> {
        let mut state = AttemptState::new(self.config.max_retries);

        loop {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }

            let user_prompt = state.user_prompt(&prompts.user);
            debug!(
                attempt = state.attempt,
                max_retries = state.max_retries,
                prompt_len = user_prompt.len(),
                "Calling vision model"
            );

            let raw = tokio::select! {
                response = self.call(image, &prompts.system, &user_prompt) => response,
                _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            };

            let raw = match raw {
                Ok(raw) => raw,
                Err(error) => {
                    warn!(
                        attempt = state.attempt,
                        error = %error,
                        "Vision model transport failure, escalating to fallback"
                    );
                    return Ok(RetryOutcome::Escalated {
                        error,
                        attempts: state.calls_made(),
                    });
                }
            };

            state = state.advance(AttemptEvent::Responded(raw.clone()));
            let candidate = match parse_candidate(&raw) {
                Ok(candidate) => {
                    state = state.advance(AttemptEvent::Parsed);
                    Some(candidate)
                }
                Err(msg) => {
                    state = state.advance(AttemptEvent::ParseFailed(msg));
                    None
                }
            };

            if let Some(candidate) = candidate {
                let verdict = self.validator.validate(&candidate, &raw);
                state = state.advance(AttemptEvent::Judged(verdict));
                if state.phase == AttemptPhase::Accepted {
                    info!(attempts = state.calls_made(), "Vision model response accepted");
                    return Ok(RetryOutcome::Accepted {
                        candidate,
                        attempts: state.calls_made(),
                    });
                }
            }

            if let Some(failure) = &state.last_failure {
                warn!(
                    attempt = state.attempt,
                    max_retries = state.max_retries,
                    failure = %failure,
                    "Vision model response rejected"
                );
            }

            if !state.can_retry() {
                let attempts = state.calls_made();
                return Ok(RetryOutcome::Exhausted {
                    responses: state.responses,
                    last_failure: state.last_failure,
                    attempts,
                });
            }

            let delay = self.config.backoff_for(state.attempt);
            tokio::select! {
                _ = sleep(delay) => {}
                _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            }
            state = state.advance(AttemptEvent::Retry);
        }
    }

    async fn call(
        &self,
        image: &ImageUpload,
        system_prompt: &str,
        user_prompt: &str,
    ) -> std::result::Result<String, TransportError> {
        let secs = self.config.call_timeout_secs;
        match timeout(
            self.config.call_timeout(),
            self.analyzer.analyze(image, system_prompt, user_prompt),
        )
        .await
        {
            Err(_) => Err(TransportError::Timeout { secs }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(raw)) if raw.trim().is_empty() => Err(TransportError::EmptyBody),
            Ok(Ok(raw)) => Ok(raw),
        }
    }
}
