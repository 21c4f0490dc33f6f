//! Remote analyzer implementations.
//!
//! Reference implementations of [`RemoteAnalyzer`](crate::RemoteAnalyzer).
//! Callers can use these directly or bring their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAIVisionAnalyzer;
