//! Item domain model for note/prompt/bookmark projections.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep prompt variables derivable from, and consistent with, prompt bodies.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Kind-inapplicable fields are unrepresentable (`ItemContent` sum type).

pub mod item;
pub mod variables;
