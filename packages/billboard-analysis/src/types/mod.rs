//! Core data types.

pub mod candidate;
pub mod config;
pub mod context;
pub mod location;
pub mod request;
pub mod result;
pub mod score;
