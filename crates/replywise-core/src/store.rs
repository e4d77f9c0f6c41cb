//! In-memory role and goal collections.
//!
//! Nothing here is persisted. Front ends redraw from the collections after
//! every mutation, so each operation simply reports what it changed.

use crate::defaults::{default_goals, default_roles};
use crate::model::{Goal, Role};

/// Something that lives in a [`Collection`]
pub trait Entity: Clone {
    fn id(&self) -> &str;

    /// Name shown in listings, also the secondary sort key
    fn display_name(&self) -> &str;

    fn is_favorite(&self) -> bool;

    fn set_favorite(&mut self, favorite: bool);
}

impl Entity for Role {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }

    fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = Some(favorite);
    }
}

impl Entity for Goal {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.label
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }

    fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = Some(favorite);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Append an entity. Never fails.
    pub fn add(&mut self, entity: T) -> &T {
        tracing::info!(id = entity.id(), "entity added");
        self.items.push(entity);
        &self.items[self.items.len() - 1]
    }

    /// Replace the entity with the same id, keeping its position.
    /// Returns false when no such entity exists.
    pub fn update(&mut self, entity: T) -> bool {
        match self.items.iter_mut().find(|e| e.id() == entity.id()) {
            Some(slot) => {
                tracing::info!(id = entity.id(), "entity updated");
                *slot = entity;
                true
            }
            None => {
                tracing::debug!(id = entity.id(), "update ignored, unknown id");
                false
            }
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<T> {
        let idx = self.items.iter().position(|e| e.id() == id)?;
        tracing::info!(id, "entity deleted");
        Some(self.items.remove(idx))
    }

    /// Flip the favorite flag. Returns the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Option<bool> {
        let entity = self.items.iter_mut().find(|e| e.id() == id)?;
        let favorite = !entity.is_favorite();
        entity.set_favorite(favorite);
        Some(favorite)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Listing order: favorites first, then by name ignoring case.
    /// The sort is stable, so equal names keep insertion order.
    pub fn sorted(&self) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.items.iter().collect();
        sorted.sort_by(|a, b| {
            b.is_favorite()
                .cmp(&a.is_favorite())
                .then_with(|| {
                    a.display_name()
                        .to_lowercase()
                        .cmp(&b.display_name().to_lowercase())
                })
        });
        sorted
    }
}

/// The roles and goals available in one session
#[derive(Debug, Clone)]
pub struct Library {
    pub roles: Collection<Role>,
    pub goals: Collection<Goal>,
}

impl Library {
    /// A library seeded with the built-in roles and goals
    pub fn new() -> Self {
        Self {
            roles: Collection::new(default_roles()),
            goals: Collection::new(default_goals()),
        }
    }

    pub fn empty() -> Self {
        Self {
            roles: Collection::default(),
            goals: Collection::default(),
        }
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}
