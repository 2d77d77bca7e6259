use super::{check_owner, check_review_count, DataStore, ReviewUpdate};
use crate::error::{RecallError, Result};
use crate::model::{ContentItem, OwnerId, UserProfile};
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    items: HashMap<Uuid, ContentItem>,
    profiles: HashMap<OwnerId, UserProfile>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataStore for InMemoryStore {
    fn save_item(&mut self, item: &ContentItem) -> Result<()> {
        if let Some(existing) = self.items.get(&item.metadata.id) {
            check_owner(&existing.metadata, &item.metadata.owner)?;
        }
        self.items.insert(item.metadata.id, item.clone());
        Ok(())
    }

    fn get_item(&self, owner: &OwnerId, id: &Uuid) -> Result<ContentItem> {
        let item = self.items.get(id).ok_or(RecallError::ItemNotFound(*id))?;
        check_owner(&item.metadata, owner)?;
        Ok(item.clone())
    }

    fn list_items(&self, owner: &OwnerId) -> Result<Vec<ContentItem>> {
        Ok(self
            .items
            .values()
            .filter(|i| i.is_owned_by(owner))
            .cloned()
            .collect())
    }

    fn delete_item(&mut self, owner: &OwnerId, id: &Uuid) -> Result<()> {
        let item = self.items.get(id).ok_or(RecallError::ItemNotFound(*id))?;
        check_owner(&item.metadata, owner)?;
        self.items.remove(id);
        Ok(())
    }

    fn load_profile(&self, owner: &OwnerId) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(owner).cloned())
    }

    fn save_profile(&mut self, profile: &UserProfile) -> Result<()> {
        self.profiles.insert(profile.owner.clone(), profile.clone());
        Ok(())
    }

    fn update_profile<F>(&mut self, owner: &OwnerId, apply: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>,
    {
        let mut profile = self
            .profiles
            .get(owner)
            .cloned()
            .unwrap_or_else(|| UserProfile::new(owner.clone()));
        apply(&mut profile)?;
        self.profiles.insert(owner.clone(), profile.clone());
        Ok(profile)
    }

    fn commit_review(
        &mut self,
        owner: &OwnerId,
        id: &Uuid,
        expected_review_count: u32,
        update: &ReviewUpdate,
    ) -> Result<ContentItem> {
        let item = self.items.get_mut(id).ok_or(RecallError::ItemNotFound(*id))?;
        check_owner(&item.metadata, owner)?;
        check_review_count(&item.metadata, expected_review_count)?;
        update.apply(&mut item.metadata);
        Ok(item.clone())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{Outcome, Subject};
    use crate::scheduler::RepetitionFlow;
    use chrono::{Duration, Utc};

    pub const OWNER: &str = "ana";
    pub const OTHER_OWNER: &str = "ben";

    pub fn owner() -> OwnerId {
        OwnerId::new(OWNER)
    }

    pub fn other_owner() -> OwnerId {
        OwnerId::new(OTHER_OWNER)
    }

    pub struct StoreFixture {
        pub store: InMemoryStore,
        /// Ticks forward so fixtures get distinct, ordered creation times.
        clock: i64,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
                clock: 0,
            }
        }

        fn next_item(&mut self, owner: OwnerId, title: &str, content: &str) -> ContentItem {
            self.clock += 1;
            let created = Utc::now() - Duration::days(30) + Duration::seconds(self.clock);
            ContentItem::new_at(owner, title.to_string(), content.to_string(), created)
        }

        pub fn with_items(mut self, count: usize) -> Self {
            for i in 0..count {
                let title = format!("Test Item {}", i + 1);
                let content = format!("Content for item {}", i + 1);
                let item = self.next_item(owner(), &title, &content);
                self.store.save_item(&item).unwrap();
            }
            self
        }

        pub fn with_item(mut self, title: &str, content: &str) -> Self {
            let item = self.next_item(owner(), title, content);
            self.store.save_item(&item).unwrap();
            self
        }

        pub fn with_archived_item(mut self, title: &str) -> Self {
            let mut item = self.next_item(owner(), title, "Archived content");
            item.metadata.is_active = false;
            item.metadata.archived_at = Some(Utc::now());
            self.store.save_item(&item).unwrap();
            self
        }

        pub fn with_foreign_item(mut self, title: &str) -> Self {
            let item = self.next_item(other_owner(), title, "Someone else's content");
            self.store.save_item(&item).unwrap();
            self
        }

        /// An item of the default owner due `days_from_today` days from now.
        pub fn with_due_item(mut self, title: &str, days_from_today: i64) -> Self {
            let mut item = self.next_item(owner(), title, "Due content");
            item.metadata.next_review_date = Utc::now() + Duration::days(days_from_today);
            self.store.save_item(&item).unwrap();
            self
        }

        pub fn with_reviewed_item(mut self, title: &str, count: u32, outcome: Outcome) -> Self {
            let mut item = self.next_item(owner(), title, "Reviewed content");
            item.metadata.review_count = count;
            item.metadata.difficulty = Some(outcome);
            self.store.save_item(&item).unwrap();
            self
        }

        pub fn with_flow(mut self, days: &[u32]) -> Self {
            let mut profile = self.profile();
            profile.repetition_flow = Some(RepetitionFlow::new(days.to_vec()).unwrap());
            self.store.save_profile(&profile).unwrap();
            self
        }

        pub fn with_subject(mut self, name: &str, color: &str) -> Self {
            let mut profile = self.profile();
            profile.subjects.push(Subject::new(name, color));
            self.store.save_profile(&profile).unwrap();
            self
        }

        fn profile(&self) -> UserProfile {
            self.store
                .load_profile(&owner())
                .unwrap()
                .unwrap_or_else(|| UserProfile::new(owner()))
        }
    }
}
