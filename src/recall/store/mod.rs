//! # Storage Layer
//!
//! The [`DataStore`] trait is the only way commands touch persisted state, so
//! the same command code runs against files in production and memory in tests.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: file-based storage
//!   - Metadata for every item in `items.json`
//!   - Item bodies in individual files: `items/item-{uuid}{ext}`
//!   - User profiles (repetition flow, subjects) in `users.json`
//!
//! - [`memory::InMemoryStore`]: no persistence, used by unit tests
//!
//! ## Ownership
//!
//! Every item belongs to exactly one [`OwnerId`]. Stores never hand an item to
//! a different owner: lookups by id return [`RecallError::Unauthorized`] when
//! the item exists under someone else and [`RecallError::ItemNotFound`] when it
//! does not exist at all.
//!
//! ## Review commits
//!
//! [`DataStore::commit_review`] is a conditional update keyed by
//! `(id, owner, expected review count)`. Two reviews racing on the same item
//! read the same count; only the first commit matches, the second gets
//! [`RecallError::Conflict`]. This keeps one scheduler result per review.
//!
//! Profile changes go through [`DataStore::update_profile`] for the same
//! reason: two settings changes made at once must both survive.
//!
//! [`RecallError::Unauthorized`]: crate::error::RecallError::Unauthorized
//! [`RecallError::ItemNotFound`]: crate::error::RecallError::ItemNotFound
//! [`RecallError::Conflict`]: crate::error::RecallError::Conflict

use crate::error::{RecallError, Result};
use crate::model::{ContentItem, Metadata, OwnerId, Outcome, UserProfile};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Fields written back onto an item after a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub review_count: u32,
    pub next_review_date: DateTime<Utc>,
    pub difficulty: Outcome,
    pub updated_at: DateTime<Utc>,
}

impl ReviewUpdate {
    pub fn apply(&self, metadata: &mut Metadata) {
        metadata.review_count = self.review_count;
        metadata.next_review_date = self.next_review_date;
        metadata.difficulty = Some(self.difficulty);
        metadata.updated_at = self.updated_at;
    }
}

pub trait DataStore {
    /// Create or replace an item.
    fn save_item(&mut self, item: &ContentItem) -> Result<()>;

    fn get_item(&self, owner: &OwnerId, id: &Uuid) -> Result<ContentItem>;

    /// All items of one owner, active and archived, in no particular order.
    fn list_items(&self, owner: &OwnerId) -> Result<Vec<ContentItem>>;

    /// Delete an item permanently.
    fn delete_item(&mut self, owner: &OwnerId, id: &Uuid) -> Result<()>;

    fn load_profile(&self, owner: &OwnerId) -> Result<Option<UserProfile>>;

    fn save_profile(&mut self, profile: &UserProfile) -> Result<()>;

    /// Load, modify and save one owner's profile as a single step, starting
    /// from a fresh profile if there is none. Nothing is saved when `apply`
    /// fails. Returns the saved profile.
    fn update_profile<F>(&mut self, owner: &OwnerId, apply: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>;

    /// Apply a review result only if the stored review count still equals
    /// `expected_review_count`. Returns the updated item.
    fn commit_review(
        &mut self,
        owner: &OwnerId,
        id: &Uuid,
        expected_review_count: u32,
        update: &ReviewUpdate,
    ) -> Result<ContentItem>;
}

/// Shared ownership check for stores that look items up by id alone.
pub(crate) fn check_owner(metadata: &Metadata, owner: &OwnerId) -> Result<()> {
    if &metadata.owner == owner {
        Ok(())
    } else {
        Err(RecallError::Unauthorized(metadata.id))
    }
}

/// Shared compare step of `commit_review`.
pub(crate) fn check_review_count(metadata: &Metadata, expected: u32) -> Result<()> {
    if metadata.review_count == expected {
        Ok(())
    } else {
        log::warn!(
            "review of {} rejected: expected count {}, stored {}",
            metadata.id,
            expected,
            metadata.review_count
        );
        Err(RecallError::Conflict(metadata.id))
    }
}
