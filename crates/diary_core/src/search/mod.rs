//! Post filter and keyword search.
//!
//! # Responsibility
//! - Combine date, tag and keyword criteria into the visible post list.
//! - Keep query shaping inside core so views stay dumb.

pub mod filter;
