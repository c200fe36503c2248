//! EcoSurvey - Environmental Survey Library
//!
//! A terminal-based multi-step environmental survey form, built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
