//! Item repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Own the ordered item collection.
//! - Enforce id uniqueness and `Item::validate()` on every write.
//!
//! # Invariants
//! - No two items share an id.
//! - Collection order is caller-controlled: seeding appends, generated items
//!   are prepended, nothing is reordered implicitly.
//! - Failed writes leave the collection unchanged.

use crate::model::item::{Item, ItemId, ItemValidationError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item collection writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Validation(ItemValidationError),
    DuplicateId(ItemId),
    NotFound(ItemId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "item already exists: {id}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::DuplicateId(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for the ordered item collection.
pub trait ItemRepository {
    /// Appends one item to the end of the collection.
    fn insert_item(&mut self, item: Item) -> RepoResult<ItemId>;
    /// Prepends items, keeping their relative order. All-or-nothing.
    fn prepend_items(&mut self, items: Vec<Item>) -> RepoResult<Vec<ItemId>>;
    /// Replaces the item with the same id in place.
    fn replace_item(&mut self, item: Item) -> RepoResult<()>;
    /// Moves an existing item to the front of the collection.
    fn move_to_front(&mut self, id: ItemId) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> Option<&Item>;
    /// Current collection in order.
    fn items(&self) -> &[Item];

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// `Vec`-backed ordered repository. Items live only in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryItemRepository {
    items: Vec<Item>,
}

impl MemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl ItemRepository for MemoryItemRepository {
    fn insert_item(&mut self, item: Item) -> RepoResult<ItemId> {
        item.validate()?;
        let id = item.id();
        if self.position(id).is_some() {
            return Err(RepoError::DuplicateId(id));
        }
        self.items.push(item);
        Ok(id)
    }

    fn prepend_items(&mut self, items: Vec<Item>) -> RepoResult<Vec<ItemId>> {
        let mut incoming = HashSet::with_capacity(items.len());
        for item in &items {
            item.validate()?;
            let id = item.id();
            if !incoming.insert(id) || self.position(id).is_some() {
                return Err(RepoError::DuplicateId(id));
            }
        }

        let ids = items.iter().map(Item::id).collect::<Vec<_>>();
        self.items.splice(0..0, items);
        Ok(ids)
    }

    fn replace_item(&mut self, item: Item) -> RepoResult<()> {
        item.validate()?;
        let index = self
            .position(item.id())
            .ok_or(RepoError::NotFound(item.id()))?;
        self.items[index] = item;
        Ok(())
    }

    fn move_to_front(&mut self, id: ItemId) -> RepoResult<()> {
        let index = self.position(id).ok_or(RepoError::NotFound(id))?;
        let item = self.items.remove(index);
        self.items.insert(0, item);
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn items(&self) -> &[Item] {
        &self.items
    }
}
