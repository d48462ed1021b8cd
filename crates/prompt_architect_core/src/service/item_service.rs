//! Item use-case service.
//!
//! # Responsibility
//! - Provide create/update/query APIs over an owned item repository.
//! - Orchestrate generation workflows (compose, distill, refine, suggest)
//!   and apply their results to the collection.
//!
//! # Invariants
//! - Every mutation stamps `updated_at` with the service clock.
//! - A failed generation call leaves the collection unchanged.
//! - Generated prompts are prepended in generation order; a distilled
//!   bookmark is placed directly after the prompts it produced.
//!
//! # See also
//! - `search::filter` for the pure query engine.

use crate::generation::{Distillation, GeneratedPrompt, GenerationError, GenerationProvider};
use crate::model::item::{now_epoch_ms, Item, ItemId, ItemKind, ItemSource, ItemValidationError};
use crate::model::variables::references_variable;
use crate::repo::item_repo::{ItemRepository, RepoError};
use crate::search::filter::{
    all_tags, merge_tags_on_distill, query_items, ItemQuery, QueryResult,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SOURCE_TYPE_KEY: &str = "type";
const SOURCE_COMPOSER: &str = "composer";
const SOURCE_BOOKMARK_DISTILL: &str = "bookmark-distill";

/// Service error for item use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemServiceError {
    /// Idea text for composition is blank.
    EmptyIdea,
    /// Framework name for refinement is blank.
    EmptyFramework,
    /// Tag input contains blank values.
    InvalidTag(String),
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Target item exists but has the wrong kind for this operation.
    WrongKind {
        id: ItemId,
        expected: ItemKind,
        actual: ItemKind,
    },
    /// Prompt body does not reference the requested variable.
    UnknownVariable { id: ItemId, name: String },
    Validation(ItemValidationError),
    Generation(GenerationError),
    Repo(RepoError),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIdea => write!(f, "idea must not be blank"),
            Self::EmptyFramework => write!(f, "refinement framework must not be blank"),
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::WrongKind {
                id,
                expected,
                actual,
            } => write!(f, "item {id} is a {actual}, expected a {expected}"),
            Self::UnknownVariable { id, name } => {
                write!(f, "prompt {id} does not reference variable `{name}`")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Generation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Generation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ItemNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ItemValidationError> for ItemServiceError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GenerationError> for ItemServiceError {
    fn from(value: GenerationError) -> Self {
        Self::Generation(value)
    }
}

pub type ServiceResult<T> = Result<T, ItemServiceError>;

/// Result of applying a bookmark distillation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistillOutcome {
    /// Updated bookmark (summary set, tags merged).
    pub bookmark: Item,
    /// New prompt items, in collection order.
    pub prompts: Vec<Item>,
}

/// Item service facade over a repository implementation.
pub struct ItemService<R: ItemRepository> {
    repo: R,
    clock: fn() -> i64,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, now_epoch_ms)
    }

    /// Creates a service with an injected epoch-ms clock.
    pub fn with_clock(repo: R, clock: fn() -> i64) -> Self {
        Self { repo, clock }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Appends items in order, e.g. the starter collection.
    pub fn seed(&mut self, items: Vec<Item>) -> ServiceResult<usize> {
        let count = items.len();
        for item in items {
            self.repo.insert_item(item)?;
        }
        info!("event=items_seed module=service status=ok count={count}");
        Ok(count)
    }

    /// Creates a note at the front of the collection.
    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        body: Option<String>,
        tags: Vec<String>,
    ) -> ServiceResult<Item> {
        ensure_tags_not_blank(&tags)?;
        let item = Item::note(title, body, self.now())?.with_tags(tags);
        self.prepend_one(item)
    }

    /// Creates a prompt at the front of the collection.
    pub fn create_prompt(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        tags: Vec<String>,
    ) -> ServiceResult<Item> {
        ensure_tags_not_blank(&tags)?;
        let item = Item::prompt(title, body, self.now())?.with_tags(tags);
        self.prepend_one(item)
    }

    /// Creates a bookmark at the front of the collection.
    pub fn create_bookmark(
        &mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        tags: Vec<String>,
    ) -> ServiceResult<Item> {
        ensure_tags_not_blank(&tags)?;
        let item = Item::bookmark(title, url, self.now())?.with_tags(tags);
        self.prepend_one(item)
    }

    pub fn get_item(&self, id: ItemId) -> Option<&Item> {
        self.repo.get_item(id)
    }

    /// Current collection in order.
    pub fn items(&self) -> &[Item] {
        self.repo.items()
    }

    /// Tag universe of the current collection, sorted ascending.
    pub fn all_tags(&self) -> Vec<String> {
        all_tags(self.repo.items())
    }

    /// Filters and sorts the current collection without mutating it.
    pub fn query(&self, query: &ItemQuery) -> QueryResult {
        query_items(self.repo.items(), query)
    }

    pub fn update_title(&mut self, id: ItemId, title: impl Into<String>) -> ServiceResult<Item> {
        let now = self.now();
        self.modify(id, |item| item.set_title(title, now).map_err(Into::into))
    }

    /// Replaces the body; prompt variables follow the new body.
    pub fn update_body(&mut self, id: ItemId, body: impl Into<String>) -> ServiceResult<Item> {
        let now = self.now();
        self.modify(id, |item| {
            item.set_body(body, now);
            Ok(())
        })
    }

    /// Replaces the whole tag set. Blank tags are rejected.
    pub fn set_tags(&mut self, id: ItemId, tags: Vec<String>) -> ServiceResult<Item> {
        ensure_tags_not_blank(&tags)?;
        let now = self.now();
        self.modify(id, |item| {
            item.set_tags(tags, now);
            Ok(())
        })
    }

    pub fn set_model(&mut self, id: ItemId, model: Option<String>) -> ServiceResult<Item> {
        let now = self.now();
        self.modify(id, |item| item.set_model(model, now).map_err(Into::into))
    }

    /// Composes prompts from an idea and prepends them.
    pub fn compose_from_idea(
        &mut self,
        provider: &dyn GenerationProvider,
        idea: &str,
    ) -> ServiceResult<Vec<Item>> {
        if idea.trim().is_empty() {
            return Err(ItemServiceError::EmptyIdea);
        }
        let generated = provider
            .compose_from_idea(idea)
            .map_err(|err| log_generation_failure("compose", err))?;
        self.apply_composition(idea, generated)
    }

    /// Prepends composed prompts with `source = {type: composer, idea}`.
    pub fn apply_composition(
        &mut self,
        idea: &str,
        generated: Vec<GeneratedPrompt>,
    ) -> ServiceResult<Vec<Item>> {
        let now = self.now();
        let source = ItemSource::from([
            (SOURCE_TYPE_KEY.to_string(), SOURCE_COMPOSER.to_string()),
            ("idea".to_string(), idea.to_string()),
        ]);
        let prompts = build_prompts(generated, &source, now)?;
        self.repo.prepend_items(prompts.clone())?;
        info!(
            "event=items_compose module=service status=ok created={}",
            prompts.len()
        );
        Ok(prompts)
    }

    /// Returns the url of a bookmark, for callers that run the remote call
    /// outside the service.
    pub fn bookmark_url(&self, id: ItemId) -> ServiceResult<String> {
        let item = self.expect_kind(id, ItemKind::Bookmark)?;
        Ok(item.url().unwrap_or_default().to_string())
    }

    /// Distills a bookmark and applies the result.
    pub fn distill_bookmark(
        &mut self,
        provider: &dyn GenerationProvider,
        id: ItemId,
    ) -> ServiceResult<DistillOutcome> {
        let url = self.bookmark_url(id)?;
        let distillation = provider
            .distill_bookmark(&url)
            .map_err(|err| log_generation_failure("distill", err))?;
        self.apply_distillation(id, distillation)
    }

    /// Sets the bookmark summary, merges tags and reorders the collection to
    /// `[new prompts..., bookmark, others...]`.
    pub fn apply_distillation(
        &mut self,
        id: ItemId,
        distillation: Distillation,
    ) -> ServiceResult<DistillOutcome> {
        let mut bookmark = self.expect_kind(id, ItemKind::Bookmark)?.clone();
        let now = self.now();
        let url = bookmark.url().unwrap_or_default().to_string();
        let source = ItemSource::from([
            (
                SOURCE_TYPE_KEY.to_string(),
                SOURCE_BOOKMARK_DISTILL.to_string(),
            ),
            ("url".to_string(), url),
        ]);
        let prompts = build_prompts(distillation.prompts, &source, now)?;

        bookmark.set_body(distillation.summary, now);
        let tags = merge_tags_on_distill(bookmark.tags(), distillation.tags);
        bookmark.set_tags(tags, now);

        self.repo.replace_item(bookmark.clone())?;
        self.repo.move_to_front(id)?;
        self.repo.prepend_items(prompts.clone())?;

        info!(
            "event=items_distill module=service status=ok created={}",
            prompts.len()
        );
        Ok(DistillOutcome { bookmark, prompts })
    }

    /// Returns a prompt body, for callers that run the remote call outside
    /// the service.
    pub fn prompt_body(&self, id: ItemId) -> ServiceResult<String> {
        let item = self.expect_kind(id, ItemKind::Prompt)?;
        Ok(item.body().unwrap_or_default().to_string())
    }

    /// Refines a prompt body in place. The prompt keeps its id and position.
    pub fn refine_prompt(
        &mut self,
        provider: &dyn GenerationProvider,
        id: ItemId,
        framework: &str,
    ) -> ServiceResult<Item> {
        if framework.trim().is_empty() {
            return Err(ItemServiceError::EmptyFramework);
        }
        let body = self.prompt_body(id)?;
        let refined = provider
            .refine_prompt(&body, framework)
            .map_err(|err| log_generation_failure("refine", err))?;
        self.apply_refinement(id, refined)
    }

    /// Replaces a prompt body with a refined version.
    pub fn apply_refinement(&mut self, id: ItemId, refined_body: String) -> ServiceResult<Item> {
        self.expect_kind(id, ItemKind::Prompt)?;
        self.update_body(id, refined_body)
    }

    /// Asks the provider for candidate values of one prompt variable.
    pub fn suggest_variable_values(
        &self,
        provider: &dyn GenerationProvider,
        id: ItemId,
        variable_name: &str,
    ) -> ServiceResult<Vec<String>> {
        let body = self.suggestion_body(id, variable_name)?;
        provider
            .suggest_variable_values(&body, variable_name)
            .map_err(|err| log_generation_failure("suggest", err))
    }

    /// Returns the body of a prompt that references `variable_name`.
    pub fn suggestion_body(&self, id: ItemId, variable_name: &str) -> ServiceResult<String> {
        let body = self.prompt_body(id)?;
        if !references_variable(&body, variable_name) {
            return Err(ItemServiceError::UnknownVariable {
                id,
                name: variable_name.to_string(),
            });
        }
        Ok(body)
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    fn prepend_one(&mut self, item: Item) -> ServiceResult<Item> {
        self.repo.prepend_items(vec![item.clone()])?;
        info!(
            "event=item_create module=service status=ok kind={}",
            item.kind()
        );
        Ok(item)
    }

    fn expect_kind(&self, id: ItemId, expected: ItemKind) -> ServiceResult<&Item> {
        let item = self
            .repo
            .get_item(id)
            .ok_or(ItemServiceError::ItemNotFound(id))?;
        if item.kind() != expected {
            return Err(ItemServiceError::WrongKind {
                id,
                expected,
                actual: item.kind(),
            });
        }
        Ok(item)
    }

    fn modify(
        &mut self,
        id: ItemId,
        change: impl FnOnce(&mut Item) -> ServiceResult<()>,
    ) -> ServiceResult<Item> {
        let mut item = self
            .repo
            .get_item(id)
            .cloned()
            .ok_or(ItemServiceError::ItemNotFound(id))?;
        change(&mut item)?;
        self.repo.replace_item(item.clone())?;
        Ok(item)
    }
}

fn build_prompts(
    generated: Vec<GeneratedPrompt>,
    source: &ItemSource,
    now: i64,
) -> ServiceResult<Vec<Item>> {
    generated
        .into_iter()
        .map(|prompt| {
            Item::prompt(prompt.title, prompt.body, now)
                .map(|item| item.with_tags(prompt.tags).with_source(source.clone()))
                .map_err(Into::into)
        })
        .collect()
}

fn ensure_tags_not_blank(tags: &[String]) -> ServiceResult<()> {
    match tags.iter().find(|tag| tag.trim().is_empty()) {
        Some(tag) => Err(ItemServiceError::InvalidTag(tag.clone())),
        None => Ok(()),
    }
}

fn log_generation_failure(operation: &str, err: GenerationError) -> ItemServiceError {
    warn!("event=generation_failed module=service status=error op={operation}");
    ItemServiceError::Generation(err)
}
