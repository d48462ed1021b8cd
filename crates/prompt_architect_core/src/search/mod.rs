//! Item query entry points.
//!
//! # Responsibility
//! - Expose the pure filter/sort/tag engine used by every presentation layer.
//! - Keep result shaping inside core.

pub mod filter;
