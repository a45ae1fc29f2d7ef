//! Text annotation engine.
//!
//! # Responsibility
//! - Classify post lines, tokenize inline markup and extract hashtags.
//! - Stay pure: no I/O, no logging, no shared mutable state.
//!
//! # Invariants
//! - Identical input always yields identical output.

pub mod hashtag;
pub mod inline;
pub mod lines;
pub mod render;
