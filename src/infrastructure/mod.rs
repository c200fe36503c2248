//! Infrastructure layer providing external service integrations.
//!
//! This module contains implementations for external concerns: draft
//! persistence, record export, and the submission transport.

pub mod persistence;
pub mod submission;

pub use persistence::*;
pub use submission::*;
