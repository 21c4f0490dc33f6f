//! Configuration for the analysis pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Score band (0–10 scale) that templated, low-effort responses land in.
///
/// Calibrated from observed model output, not derived. Tune freely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenericnessBand {
    pub low: f64,
    pub high: f64,
}

impl GenericnessBand {
    /// Inclusive on both ends. A zero score is never considered generic.
    pub fn contains(&self, score: f64) -> bool {
        score != 0.0 && score >= self.low && score <= self.high
    }
}

impl Default for GenericnessBand {
    fn default() -> Self {
        Self {
            low: 7.0,
            high: 7.5,
        }
    }
}

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Validation retries after the first call.
    ///
    /// Default: 2 (three calls in total).
    pub max_retries: u32,

    /// Linear backoff step; attempt `n` waits `backoff_base_ms * (n + 1)`.
    ///
    /// Default: 100.
    pub backoff_base_ms: u64,

    /// Deadline for a single remote call. Expiry is a transport failure.
    ///
    /// Default: 60.
    pub call_timeout_secs: u64,

    /// Band rejected by the heuristic validator.
    #[serde(default)]
    pub genericness_band: GenericnessBand,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 100,
            call_timeout_secs: 60,
            genericness_band: GenericnessBand::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of validation retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the linear backoff step.
    pub fn with_backoff_base_ms(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }

    /// Set the per-call timeout.
    pub fn with_call_timeout_secs(mut self, secs: u64) -> Self {
        self.call_timeout_secs = secs;
        self
    }

    /// Set the genericness band.
    pub fn with_genericness_band(mut self, low: f64, high: f64) -> Self {
        self.genericness_band = GenericnessBand { low, high };
        self
    }

    /// Delay before the retry that follows attempt `attempt` (zero-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(attempt as u64 + 1))
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Upper bound on remote calls for one request.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
