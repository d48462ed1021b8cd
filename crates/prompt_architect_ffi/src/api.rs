//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide item store and generation provider.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The store lock is never held while a generation request is in flight.
//! - Ids cross the boundary as hyphenated UUID strings.

use log::{error, warn};
use prompt_architect_core::{
    core_version as core_version_inner, extract_variables, init_logging as init_logging_inner,
    initial_items, ping as ping_inner, provider_from_config, toggle_tag, GenerationConfig,
    GenerationProvider, Item, ItemId, ItemQuery, ItemService, ItemServiceError, KindFilter,
    MemoryItemRepository, SortOrder, REFINEMENT_FRAMEWORKS,
};
use std::collections::BTreeSet;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

type Store = ItemService<MemoryItemRepository>;

static STORE: OnceLock<Mutex<Store>> = OnceLock::new();
static PROVIDER: OnceLock<Result<Box<dyn GenerationProvider>, String>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Flat item projection for UI rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: String,
    /// `note|prompt|bookmark`.
    pub kind: String,
    pub title: String,
    /// Note body, prompt body or bookmark summary.
    pub body: Option<String>,
    /// Sorted ascending.
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Prompt variables; empty for other kinds.
    pub variables: Vec<String>,
    pub model: Option<String>,
    pub url: Option<String>,
    pub favicon: Option<String>,
    /// Provenance `type` (`composer|bookmark-distill`) when present.
    pub source_type: Option<String>,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id().to_string(),
            kind: item.kind().as_str().to_string(),
            title: item.title().to_string(),
            body: item.body().map(str::to_string),
            tags: item.tags().iter().cloned().collect(),
            created_at: item.created_at(),
            updated_at: item.updated_at(),
            variables: item.variables().to_vec(),
            model: item.model().map(str::to_string),
            url: item.url().map(str::to_string),
            favicon: item.favicon().map(str::to_string),
            source_type: item
                .source()
                .and_then(|source| source.get("type"))
                .cloned(),
        }
    }
}

/// Query response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsQueryResponse {
    pub ok: bool,
    pub items: Vec<ItemView>,
    /// Number of matching items.
    pub count: u32,
    pub message: String,
}

/// Single-item action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemActionResponse {
    pub ok: bool,
    pub item: Option<ItemView>,
    pub message: String,
}

impl ItemActionResponse {
    fn success(message: impl Into<String>, item: &Item) -> Self {
        Self {
            ok: true,
            item: Some(ItemView::from(item)),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item: None,
            message: message.into(),
        }
    }
}

/// Composition envelope; `items` are the newly prepended prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeResponse {
    pub ok: bool,
    pub items: Vec<ItemView>,
    pub message: String,
}

/// Distillation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistillResponse {
    pub ok: bool,
    pub bookmark: Option<ItemView>,
    pub prompts: Vec<ItemView>,
    pub message: String,
}

/// Variable suggestion envelope. An empty list with `ok = true` is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionsResponse {
    pub ok: bool,
    pub suggestions: Vec<String>,
    pub message: String,
}

/// Filters and sorts the live collection.
///
/// Input semantics:
/// - `search_term`: empty string disables the search filter.
/// - `active_tags`: empty list disables the tag filter.
/// - `kind`: `all|note|prompt|bookmark`.
/// - `sort_by`: `recent|alphabetical`.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics; invalid `kind`/`sort_by` return `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn items_query(
    search_term: String,
    active_tags: Vec<String>,
    kind: String,
    sort_by: String,
) -> ItemsQueryResponse {
    let query = match build_query(search_term, active_tags, &kind, &sort_by) {
        Ok(query) => query,
        Err(message) => return query_failure(message),
    };

    match with_store(|service| Ok(service.query(&query))) {
        Ok(result) => ItemsQueryResponse {
            ok: true,
            count: u32::try_from(result.count).unwrap_or(u32::MAX),
            message: format!("Found {} item(s).", result.count),
            items: result.items.iter().map(ItemView::from).collect(),
        },
        Err(message) => query_failure(message),
    }
}

/// Returns the sorted tag universe of the live collection.
///
/// # FFI contract
/// - Sync call. Returns an empty list when the store is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn tags_list() -> Vec<String> {
    with_store(|service| Ok(service.all_tags())).unwrap_or_default()
}

/// Toggles `tag` in a tag filter held by the caller.
#[flutter_rust_bridge::frb(sync)]
pub fn filters_toggle_tag(active_tags: Vec<String>, tag: String) -> Vec<String> {
    let current = active_tags.into_iter().collect::<BTreeSet<_>>();
    toggle_tag(&current, &tag).into_iter().collect()
}

/// Extracts `{{name}}` variables from an unsaved prompt body.
#[flutter_rust_bridge::frb(sync)]
pub fn prompt_variables(body: String) -> Vec<String> {
    extract_variables(&body)
}

/// Lists the named refinement frameworks.
#[flutter_rust_bridge::frb(sync)]
pub fn refinement_frameworks() -> Vec<String> {
    REFINEMENT_FRAMEWORKS
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Reports the active generation mode: `mock`, `remote`, or an error message.
#[flutter_rust_bridge::frb(sync)]
pub fn generation_mode() -> String {
    match provider() {
        Ok(provider) if provider.is_mock() => "mock".to_string(),
        Ok(_) => "remote".to_string(),
        Err(message) => message,
    }
}

/// Replaces an item's body. Prompt variables follow the new body.
#[flutter_rust_bridge::frb(sync)]
pub fn item_update_body(item_id: String, body: String) -> ItemActionResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        with_store(|service| service.update_body(id, body).map_err(|err| err.to_string()))
    });
    match result {
        Ok(item) => ItemActionResponse::success("Item updated.", &item),
        Err(err) => ItemActionResponse::failure(format!("item_update_body failed: {err}")),
    }
}

/// Replaces an item's tag set.
#[flutter_rust_bridge::frb(sync)]
pub fn item_set_tags(item_id: String, tags: Vec<String>) -> ItemActionResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        with_store(|service| service.set_tags(id, tags).map_err(|err| err.to_string()))
    });
    match result {
        Ok(item) => ItemActionResponse::success("Tags updated.", &item),
        Err(err) => ItemActionResponse::failure(format!("item_set_tags failed: {err}")),
    }
}

/// Composes prompts from an idea and prepends them to the collection.
///
/// # FFI contract
/// - Async call; may block on a network request.
/// - Never panics; on failure the collection is unchanged.
pub fn compose_from_idea(idea: String) -> ComposeResponse {
    let result = compose_inner(&idea);
    match result {
        Ok(items) => ComposeResponse {
            ok: true,
            message: format!("Created {} prompt(s).", items.len()),
            items: items.iter().map(ItemView::from).collect(),
        },
        Err(err) => ComposeResponse {
            ok: false,
            items: Vec::new(),
            message: format!("compose_from_idea failed: {err}"),
        },
    }
}

/// Summarizes a bookmark and prepends prompts derived from its page.
///
/// # FFI contract
/// - Async call; may block on a network request.
/// - Never panics; on failure the collection is unchanged.
pub fn distill_bookmark(item_id: String) -> DistillResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        let url = with_store(|service| service.bookmark_url(id).map_err(|err| err.to_string()))?;
        let distillation = provider()?
            .distill_bookmark(&url)
            .map_err(|err| err.to_string())?;
        with_store(|service| {
            service
                .apply_distillation(id, distillation)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(outcome) => DistillResponse {
            ok: true,
            message: format!("Created {} prompt(s).", outcome.prompts.len()),
            bookmark: Some(ItemView::from(&outcome.bookmark)),
            prompts: outcome.prompts.iter().map(ItemView::from).collect(),
        },
        Err(err) => DistillResponse {
            ok: false,
            bookmark: None,
            prompts: Vec::new(),
            message: format!("distill_bookmark failed: {err}"),
        },
    }
}

/// Rewrites a prompt body in place using a named framework.
///
/// # FFI contract
/// - Async call; may block on a network request.
/// - Never panics; on failure the prompt is unchanged.
pub fn refine_prompt(item_id: String, framework: String) -> ItemActionResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        if framework.trim().is_empty() {
            return Err(ItemServiceError::EmptyFramework.to_string());
        }
        let body = with_store(|service| service.prompt_body(id).map_err(|err| err.to_string()))?;
        let refined = provider()?
            .refine_prompt(&body, &framework)
            .map_err(|err| err.to_string())?;
        with_store(|service| {
            service
                .apply_refinement(id, refined)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(item) => ItemActionResponse::success("Prompt refined.", &item),
        Err(err) => ItemActionResponse::failure(format!("refine_prompt failed: {err}")),
    }
}

/// Proposes values for one variable of a stored prompt.
///
/// # FFI contract
/// - Async call; may block on a network request.
/// - Never panics; read-only.
pub fn suggest_variable_values(item_id: String, variable_name: String) -> SuggestionsResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        let body = with_store(|service| {
            service
                .suggestion_body(id, &variable_name)
                .map_err(|err| err.to_string())
        })?;
        provider()?
            .suggest_variable_values(&body, &variable_name)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(suggestions) => SuggestionsResponse {
            ok: true,
            message: format!("Received {} suggestion(s).", suggestions.len()),
            suggestions,
        },
        Err(err) => SuggestionsResponse {
            ok: false,
            suggestions: Vec::new(),
            message: format!("suggest_variable_values failed: {err}"),
        },
    }
}

fn compose_inner(idea: &str) -> Result<Vec<Item>, String> {
    if idea.trim().is_empty() {
        return Err(ItemServiceError::EmptyIdea.to_string());
    }
    let generated = provider()?
        .compose_from_idea(idea)
        .map_err(|err| err.to_string())?;
    with_store(|service| {
        service
            .apply_composition(idea, generated)
            .map_err(|err| err.to_string())
    })
}

fn build_query(
    search_term: String,
    active_tags: Vec<String>,
    kind: &str,
    sort_by: &str,
) -> Result<ItemQuery, String> {
    let kind = kind.parse::<KindFilter>().map_err(|err| err.to_string())?;
    let sort_by = sort_by.parse::<SortOrder>().map_err(|err| err.to_string())?;
    Ok(ItemQuery::new()
        .search(search_term)
        .tags(active_tags)
        .kind(kind)
        .sort_by(sort_by))
}

fn query_failure(message: String) -> ItemsQueryResponse {
    ItemsQueryResponse {
        ok: false,
        items: Vec::new(),
        count: 0,
        message: format!("items_query failed: {message}"),
    }
}

fn parse_item_id(raw: &str) -> Result<ItemId, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid item id `{raw}`: {err}"))
}

fn store() -> &'static Mutex<Store> {
    STORE.get_or_init(|| {
        let mut service = ItemService::new(MemoryItemRepository::new());
        let seeded = initial_items()
            .map_err(ItemServiceError::from)
            .and_then(|items| service.seed(items));
        if let Err(err) = seeded {
            error!("event=store_seed module=ffi status=error error={err}");
        }
        Mutex::new(service)
    })
}

fn with_store<T>(f: impl FnOnce(&mut Store) -> Result<T, String>) -> Result<T, String> {
    let mut guard = store().lock().map_err(|_| {
        warn!("event=store_lock module=ffi status=error reason=poisoned");
        "item store is unavailable".to_string()
    })?;
    f(&mut guard)
}

fn provider() -> Result<&'static dyn GenerationProvider, String> {
    PROVIDER
        .get_or_init(|| {
            provider_from_config(&GenerationConfig::from_env()).map_err(|err| err.to_string())
        })
        .as_ref()
        .map(|provider| &**provider)
        .map_err(Clone::clone)
}
