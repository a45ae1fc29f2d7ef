//! Diary domain model.
//!
//! # Responsibility
//! - Define canonical data structures shared by the engine, storage and views.
//! - Keep date-key validation in one place.
//!
//! # Invariants
//! - Every post bucket is addressed by a validated `DateKey`.
//! - A post id is unique within its date bucket, not globally.
//! - An image carries exactly one authoritative payload.

pub mod calendar;
pub mod date_key;
pub mod post;
