//! In-memory item filtering, sorting and tag-set helpers.
//!
//! # Responsibility
//! - Answer search/tag/kind queries over an item slice.
//! - Derive the tag universe from the current collection.
//!
//! # Invariants
//! - Queries never mutate the input slice; sorting works on a copy.
//! - Search matches `title` for every kind, `body` only for notes and
//!   prompts, and `url` only for bookmarks.
//! - `Recent` ordering is stable: ties keep collection order.
//! - `Alphabetical` ordering collates titles, ignoring case and accents.

use crate::model::item::{Item, ItemContent, ItemKind, LabelParseError};
use icu_collator::{Collator, CollatorOptions, Strength};
use log::warn;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

thread_local! {
    static TITLE_COLLATOR: Option<Collator> = title_collator();
}

/// Kind filter applied after search and tag filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    /// Sentinel: every kind passes.
    #[default]
    All,
    Only(ItemKind),
}

impl KindFilter {
    pub fn matches(self, kind: ItemKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == kind,
        }
    }
}

impl Display for KindFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for KindFilter {
    type Err = LabelParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value
            .parse::<ItemKind>()
            .map(Self::Only)
            .map_err(|_| LabelParseError::KindFilter(value.trim().to_string()))
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recently updated first.
    #[default]
    Recent,
    /// Ascending by title, case-insensitive.
    Alphabetical,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recent => f.write_str("recent"),
            Self::Alphabetical => f.write_str("alphabetical"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = LabelParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "alphabetical" => Ok(Self::Alphabetical),
            other => Err(LabelParseError::SortOrder(other.to_string())),
        }
    }
}

/// Full query state as held by a presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    /// Raw search text. Empty means no search filter; not trimmed.
    pub search_term: String,
    /// Active tag filter. Empty means no tag filter.
    pub active_tags: BTreeSet<String>,
    pub kind: KindFilter,
    pub sort_by: SortOrder,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(mut self, kind: KindFilter) -> Self {
        self.kind = kind;
        self
    }

    pub fn sort_by(mut self, sort_by: SortOrder) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Toggles one tag in the active tag filter.
    pub fn toggle_tag(&mut self, tag: &str) {
        self.active_tags = toggle_tag(&self.active_tags, tag);
    }

    /// Clears the active tag filter; other filters are kept.
    pub fn clear_tags(&mut self) {
        self.active_tags.clear();
    }
}

/// Filtered and sorted query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub items: Vec<Item>,
    /// Equals `items.len()`; kept for count badges.
    pub count: usize,
}

/// Filters and sorts `items` according to `query`.
pub fn query_items(items: &[Item], query: &ItemQuery) -> QueryResult {
    let needle = query.search_term.to_lowercase();
    let mut matched = items
        .iter()
        .filter(|item| matches_search(item, &needle))
        .filter(|item| matches_tags(item, &query.active_tags))
        .filter(|item| query.kind.matches(item.kind()))
        .cloned()
        .collect::<Vec<_>>();

    match query.sort_by {
        SortOrder::Alphabetical => matched.sort_by(|a, b| compare_titles(a.title(), b.title())),
        SortOrder::Recent => matched.sort_by(|a, b| b.updated_at().cmp(&a.updated_at())),
    }

    let count = matched.len();
    QueryResult {
        items: matched,
        count,
    }
}

/// Returns the sorted, deduplicated union of every item's tags.
pub fn all_tags(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.tags().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Removes `tag` when present, otherwise adds it.
pub fn toggle_tag(active_tags: &BTreeSet<String>, tag: &str) -> BTreeSet<String> {
    let mut next = active_tags.clone();
    if !next.remove(tag) {
        next.insert(tag.to_string());
    }
    next
}

/// Set union used when distillation adds tags to a bookmark.
pub fn merge_tags_on_distill<I, S>(existing: &BTreeSet<String>, new_tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut merged = existing.clone();
    merged.extend(new_tags.into_iter().map(Into::into));
    merged
}

/// Locale-aware, case-insensitive title ordering.
///
/// Titles are collated with the root locale at secondary strength, so
/// accented letters sort next to their base letters and case is ignored. On
/// a case-only tie lowercase sorts before uppercase, which keeps the order
/// total and deterministic.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    TITLE_COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        })
        .then_with(|| b.cmp(a))
}

fn title_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!("event=collator_init module=search status=error error={err}");
            None
        }
    }
}

fn matches_search(item: &Item, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if contains_folded(item.title(), needle) {
        return true;
    }
    match item.content() {
        ItemContent::Note { body } => body
            .as_deref()
            .is_some_and(|body| contains_folded(body, needle)),
        ItemContent::Prompt { body, .. } => contains_folded(body, needle),
        ItemContent::Bookmark { url, .. } => contains_folded(url, needle),
    }
}

fn matches_tags(item: &Item, active_tags: &BTreeSet<String>) -> bool {
    active_tags.is_empty() || item.tags().iter().any(|tag| active_tags.contains(tag))
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}
