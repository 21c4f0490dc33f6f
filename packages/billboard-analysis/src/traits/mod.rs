//! Trait seams: the remote model and response validation.

pub mod analyzer;
pub mod validator;

pub use analyzer::RemoteAnalyzer;
pub use validator::{ResponseValidator, Verdict};
