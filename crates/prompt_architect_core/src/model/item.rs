//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by note/prompt/bookmark projections.
//! - Own every mutation path so `updated_at` and prompt `variables` cannot
//!   drift from the fields they describe.
//!
//! # Invariants
//! - `id` is stable, non-nil and never reused for another item.
//! - `kind` is fixed at creation and encoded by [`ItemContent`].
//! - `title` is never blank; bookmark `url` is never blank.
//! - `created_at` never changes; `updated_at >= created_at` at all times.
//! - Prompt `variables` always equal `extract_variables(body)`.

use crate::model::variables::extract_variables;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every item in a collection.
pub type ItemId = Uuid;

/// Free-form provenance mapping, e.g. `{"type": "composer", "idea": "..."}`.
pub type ItemSource = BTreeMap<String, String>;

/// Returns current wall-clock time in Unix epoch milliseconds.
///
/// Clock errors (time before epoch) collapse to `0` instead of panicking.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Discriminator for the three item projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Free-form text note.
    Note,
    /// Reusable AI prompt template.
    Prompt,
    /// Saved web link.
    Bookmark,
}

impl ItemKind {
    /// Stable lowercase label used by FFI and CLI callers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Prompt => "prompt",
            Self::Bookmark => "bookmark",
        }
    }
}

impl Display for ItemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = LabelParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "prompt" => Ok(Self::Prompt),
            "bookmark" => Ok(Self::Bookmark),
            other => Err(LabelParseError::Kind(other.to_string())),
        }
    }
}

/// Rejected label for a kind, kind filter or sort order.
///
/// Each variant carries the offending label as received (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelParseError {
    Kind(String),
    KindFilter(String),
    SortOrder(String),
}

impl Display for LabelParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kind(label) => write!(
                f,
                "unsupported item kind `{label}`; expected note|prompt|bookmark"
            ),
            Self::KindFilter(label) => write!(
                f,
                "unsupported kind filter `{label}`; expected all|note|prompt|bookmark"
            ),
            Self::SortOrder(label) => write!(
                f,
                "unsupported sort order `{label}`; expected recent|alphabetical"
            ),
        }
    }
}

impl Error for LabelParseError {}

/// Kind-specific payload of an item.
///
/// Serialized with a `kind` tag so one flat JSON object carries both the
/// shared fields and the projection fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemContent {
    Note {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    Prompt {
        body: String,
        /// Derived from `body`; recomputed on every write and on load.
        #[serde(default)]
        variables: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    Bookmark {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        favicon: Option<String>,
        /// AI-generated summary. Shares the `body` wire name with other kinds.
        #[serde(rename = "body", default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
    },
}

impl ItemContent {
    /// Note payload with optional body.
    pub fn note(body: Option<String>) -> Self {
        Self::Note { body }
    }

    /// Prompt payload; variables are derived immediately.
    pub fn prompt(body: impl Into<String>) -> Self {
        let body = body.into();
        let variables = extract_variables(&body);
        Self::Prompt {
            body,
            variables,
            model: None,
        }
    }

    /// Bookmark payload without favicon or summary.
    pub fn bookmark(url: impl Into<String>) -> Self {
        Self::Bookmark {
            url: url.into(),
            favicon: None,
            summary: None,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Note { .. } => ItemKind::Note,
            Self::Prompt { .. } => ItemKind::Prompt,
            Self::Bookmark { .. } => ItemKind::Bookmark,
        }
    }

    fn resync_variables(&mut self) {
        if let Self::Prompt {
            body, variables, ..
        } = self
        {
            *variables = extract_variables(body);
        }
    }
}

/// Validation errors for item construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    NilId,
    EmptyTitle,
    EmptyUrl,
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
    /// Field does not exist on this kind (e.g. `model` on a note).
    FieldNotApplicable { kind: ItemKind, field: &'static str },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "item id must not be nil"),
            Self::EmptyTitle => write!(f, "item title must not be blank"),
            Self::EmptyUrl => write!(f, "bookmark url must not be blank"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
            Self::FieldNotApplicable { kind, field } => {
                write!(f, "field `{field}` is not applicable to {kind} items")
            }
        }
    }
}

impl Error for ItemValidationError {}

/// Canonical record for note/prompt/bookmark data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord")]
pub struct Item {
    id: ItemId,
    title: String,
    #[serde(default)]
    tags: BTreeSet<String>,
    created_at: i64,
    updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<ItemSource>,
    #[serde(flatten)]
    content: ItemContent,
}

/// Unvalidated wire shape; converted through [`Item::try_from`].
#[derive(Deserialize)]
struct ItemRecord {
    id: ItemId,
    title: String,
    #[serde(default)]
    tags: BTreeSet<String>,
    created_at: i64,
    updated_at: i64,
    #[serde(default)]
    source: Option<ItemSource>,
    #[serde(flatten)]
    content: ItemContent,
}

impl TryFrom<ItemRecord> for Item {
    type Error = ItemValidationError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let mut item = Self {
            id: record.id,
            title: record.title.trim().to_string(),
            tags: normalize_tag_set(record.tags),
            created_at: record.created_at,
            updated_at: record.updated_at,
            source: record.source,
            content: record.content,
        };
        // Cached variables from external data are never trusted.
        item.content.resync_variables();
        item.validate()?;
        Ok(item)
    }
}

impl Item {
    /// Creates a new item with a generated id and `created_at = updated_at = now`.
    pub fn new(
        content: ItemContent,
        title: impl Into<String>,
        now: i64,
    ) -> Result<Self, ItemValidationError> {
        Self::with_id(Uuid::new_v4(), content, title, now)
    }

    /// Creates an item with a caller-provided stable id (seeding/import paths).
    pub fn with_id(
        id: ItemId,
        mut content: ItemContent,
        title: impl Into<String>,
        created_at: i64,
    ) -> Result<Self, ItemValidationError> {
        content.resync_variables();
        let item = Self {
            id,
            title: title.into().trim().to_string(),
            tags: BTreeSet::new(),
            created_at,
            updated_at: created_at,
            source: None,
            content,
        };
        item.validate()?;
        Ok(item)
    }

    /// Convenience constructor for notes.
    pub fn note(
        title: impl Into<String>,
        body: Option<String>,
        now: i64,
    ) -> Result<Self, ItemValidationError> {
        Self::new(ItemContent::note(body), title, now)
    }

    /// Convenience constructor for prompts.
    pub fn prompt(
        title: impl Into<String>,
        body: impl Into<String>,
        now: i64,
    ) -> Result<Self, ItemValidationError> {
        Self::new(ItemContent::prompt(body), title, now)
    }

    /// Convenience constructor for bookmarks.
    pub fn bookmark(
        title: impl Into<String>,
        url: impl Into<String>,
        now: i64,
    ) -> Result<Self, ItemValidationError> {
        Self::new(ItemContent::bookmark(url), title, now)
    }

    /// Replaces the initial tag set. Does not bump `updated_at`.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = normalize_tag_set(tags.into_iter().map(Into::into));
        self
    }

    /// Attaches provenance metadata.
    pub fn with_source(mut self, source: ItemSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the prompt model at creation time.
    pub fn with_model(mut self, model: impl Into<String>) -> Result<Self, ItemValidationError> {
        match &mut self.content {
            ItemContent::Prompt { model: slot, .. } => *slot = Some(model.into()),
            other => {
                return Err(ItemValidationError::FieldNotApplicable {
                    kind: other.kind(),
                    field: "model",
                })
            }
        }
        Ok(self)
    }

    /// Sets the bookmark favicon at creation time.
    pub fn with_favicon(mut self, favicon: impl Into<String>) -> Result<Self, ItemValidationError> {
        match &mut self.content {
            ItemContent::Bookmark { favicon: slot, .. } => *slot = Some(favicon.into()),
            other => {
                return Err(ItemValidationError::FieldNotApplicable {
                    kind: other.kind(),
                    field: "favicon",
                })
            }
        }
        Ok(self)
    }

    /// Overrides `updated_at` for seeded/imported records.
    pub fn with_updated_at(mut self, updated_at: i64) -> Result<Self, ItemValidationError> {
        self.updated_at = updated_at;
        self.validate()?;
        Ok(self)
    }

    /// Checks all record invariants.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::EmptyTitle);
        }
        if let ItemContent::Bookmark { url, .. } = &self.content {
            if url.trim().is_empty() {
                return Err(ItemValidationError::EmptyUrl);
            }
        }
        if self.updated_at < self.created_at {
            return Err(ItemValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Note body, prompt body or bookmark summary.
    pub fn body(&self) -> Option<&str> {
        match &self.content {
            ItemContent::Note { body } => body.as_deref(),
            ItemContent::Prompt { body, .. } => Some(body.as_str()),
            ItemContent::Bookmark { summary, .. } => summary.as_deref(),
        }
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn source(&self) -> Option<&ItemSource> {
        self.source.as_ref()
    }

    pub fn content(&self) -> &ItemContent {
        &self.content
    }

    /// Prompt variables; empty for other kinds.
    pub fn variables(&self) -> &[String] {
        match &self.content {
            ItemContent::Prompt { variables, .. } => variables,
            _ => &[],
        }
    }

    pub fn model(&self) -> Option<&str> {
        match &self.content {
            ItemContent::Prompt { model, .. } => model.as_deref(),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.content {
            ItemContent::Bookmark { url, .. } => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn favicon(&self) -> Option<&str> {
        match &self.content {
            ItemContent::Bookmark { favicon, .. } => favicon.as_deref(),
            _ => None,
        }
    }

    /// Replaces the title and bumps `updated_at`.
    pub fn set_title(
        &mut self,
        title: impl Into<String>,
        now: i64,
    ) -> Result<(), ItemValidationError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ItemValidationError::EmptyTitle);
        }
        self.title = title;
        self.touch(now);
        Ok(())
    }

    /// Replaces the body and bumps `updated_at`.
    ///
    /// For prompts the variable list is re-derived; for bookmarks the body is
    /// the summary.
    pub fn set_body(&mut self, new_body: impl Into<String>, now: i64) {
        let new_body = new_body.into();
        match &mut self.content {
            ItemContent::Note { body } => *body = Some(new_body),
            ItemContent::Prompt {
                body, variables, ..
            } => {
                *variables = extract_variables(&new_body);
                *body = new_body;
            }
            ItemContent::Bookmark { summary, .. } => *summary = Some(new_body),
        }
        self.touch(now);
    }

    /// Replaces the whole tag set and bumps `updated_at`.
    pub fn set_tags<I, S>(&mut self, tags: I, now: i64)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = normalize_tag_set(tags.into_iter().map(Into::into));
        self.touch(now);
    }

    /// Sets or clears the prompt model and bumps `updated_at`.
    pub fn set_model(&mut self, model: Option<String>, now: i64) -> Result<(), ItemValidationError> {
        match &mut self.content {
            ItemContent::Prompt { model: slot, .. } => *slot = model,
            other => {
                return Err(ItemValidationError::FieldNotApplicable {
                    kind: other.kind(),
                    field: "model",
                })
            }
        }
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: i64) {
        self.updated_at = now.max(self.created_at);
    }
}

/// Trims tags, drops blanks and collapses duplicates.
pub fn normalize_tag_set<I>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .filter_map(|tag| {
            let trimmed = tag.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}
