//! Repository layer abstractions and the in-memory implementation.
//!
//! # Responsibility
//! - Define use-case oriented access contracts for the item collection.
//! - Keep collection bookkeeping out of service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Item::validate()` before mutating state.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateId`).

pub mod item_repo;
