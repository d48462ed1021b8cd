//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and generation calls into use-case level APIs.
//! - Keep UI/FFI/CLI layers decoupled from collection details.

pub mod item_service;
