//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the survey steps with ratatui and maps keyboard
//! input onto application state transitions.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
