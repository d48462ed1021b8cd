//! Flutter-facing bindings for Prompt Architect core.

pub mod api;
