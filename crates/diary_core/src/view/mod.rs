//! View-facing state kept outside the pure engine.
//!
//! # Responsibility
//! - Model expand/collapse, like and tag-bar toggles as plain values.

pub mod state;
