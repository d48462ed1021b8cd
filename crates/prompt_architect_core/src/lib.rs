//! Core domain logic for Prompt Architect.
//! This crate is the single source of truth for item invariants, query
//! semantics and the generation boundary.

pub mod generation;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod seed;
pub mod service;

pub use generation::{
    provider_from_config, Distillation, GeneratedPrompt, GenerationConfig, GenerationError,
    GenerationProvider, GenerationResult, MockGenerationProvider,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::item::{
    Item, ItemContent, ItemId, ItemKind, ItemSource, ItemValidationError, LabelParseError,
};
pub use model::variables::extract_variables;
pub use repo::item_repo::{ItemRepository, MemoryItemRepository, RepoError, RepoResult};
pub use search::filter::{
    all_tags, merge_tags_on_distill, query_items, toggle_tag, ItemQuery, KindFilter, QueryResult,
    SortOrder,
};
pub use seed::{initial_items, REFINEMENT_FRAMEWORKS};
pub use service::item_service::{DistillOutcome, ItemService, ItemServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
