//! Application layer managing state and survey workflows.
//!
//! This module coordinates between the domain layer and presentation
//! layer: step navigation, focus, editing, and the submission lifecycle.

pub mod state;

pub use state::*;
