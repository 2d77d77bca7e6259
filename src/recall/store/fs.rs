use super::{check_owner, check_review_count, DataStore, ReviewUpdate};
use crate::error::{RecallError, Result};
use crate::model::{ContentItem, Metadata, OwnerId, UserProfile};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

const ITEMS_FILE: &str = "items.json";
const USERS_FILE: &str = "users.json";
const CONTENT_DIR: &str = "items";
const LOCK_FILE: &str = ".lock";

const LOCK_ATTEMPTS: u32 = 100;
const LOCK_BACKOFF: Duration = Duration::from_millis(20);

type ItemIndex = BTreeMap<Uuid, Metadata>;
type ProfileIndex = BTreeMap<OwnerId, UserProfile>;

pub struct FileStore {
    root: PathBuf,
    file_ext: String,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            file_ext: ".md".to_string(),
        }
    }

    pub fn with_file_ext(mut self, ext: &str) -> Self {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    fn content_filename(&self, id: &Uuid) -> String {
        format!("item-{}{}", id, self.file_ext)
    }

    /// Finds the body file for an item. Falls back to any extension so
    /// changing `file-ext` does not orphan older items.
    fn find_content_file(&self, id: &Uuid) -> Option<PathBuf> {
        let dir = self.content_dir();
        let path = dir.join(self.content_filename(id));
        if path.exists() {
            return Some(path);
        }

        let prefix = format!("item-{}.", id);
        fs::read_dir(&dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    fn load_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        let path = self.root.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let content = serde_json::to_string_pretty(value)?;
        write_atomic(&self.root, &self.root.join(name), &content)
    }

    fn load_index(&self) -> Result<ItemIndex> {
        self.load_json(ITEMS_FILE)
    }

    fn save_index(&self, index: &ItemIndex) -> Result<()> {
        self.save_json(ITEMS_FILE, index)
    }

    fn read_content(&self, id: &Uuid) -> Result<String> {
        match self.find_content_file(id) {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => {
                log::warn!("content file for {} is missing, treating as empty", id);
                Ok(String::new())
            }
        }
    }

    fn write_content(&self, id: &Uuid, content: &str) -> Result<()> {
        let dir = self.content_dir();
        self.ensure_dir(&dir)?;
        let target = dir.join(self.content_filename(id));
        write_atomic(&dir, &target, content)?;

        // Drop a body left behind under a previous extension.
        if let Some(old) = self.find_other_content_file(id, &target) {
            fs::remove_file(old)?;
        }
        Ok(())
    }

    fn find_other_content_file(&self, id: &Uuid, current: &Path) -> Option<PathBuf> {
        let prefix = format!("item-{}.", id);
        fs::read_dir(self.content_dir())
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|p| {
                p != current
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix) && !n.ends_with(".tmp"))
            })
    }

    fn lock(&self) -> Result<StoreLock> {
        self.ensure_dir(&self.root)?;
        StoreLock::acquire(self.root.join(LOCK_FILE))
    }
}

/// Writes through a temp file in the same directory, then renames over the
/// target.
fn write_atomic(dir: &Path, target: &Path, content: &str) -> Result<()> {
    let tmp = dir.join(format!(".write-{}.tmp", Uuid::new_v4()));
    fs::write(&tmp, content)?;
    if let Err(e) = fs::rename(&tmp, target) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Exclusive lock over a store directory, held for one read-modify-write
/// cycle. Released on drop.
struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(path: PathBuf) -> Result<Self> {
        for attempt in 0..LOCK_ATTEMPTS {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => {
                    if attempt > 0 {
                        log::debug!("acquired store lock after {} retries", attempt);
                    }
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => thread::sleep(LOCK_BACKOFF),
                Err(e) => return Err(e.into()),
            }
        }
        Err(RecallError::Store(format!(
            "store is locked by another process (remove {} if no other recall is running)",
            path.display()
        )))
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("failed to release store lock {}: {}", self.path.display(), e);
        }
    }
}

impl DataStore for FileStore {
    fn save_item(&mut self, item: &ContentItem) -> Result<()> {
        let _lock = self.lock()?;

        let mut index = self.load_index()?;
        if let Some(existing) = index.get(&item.metadata.id) {
            check_owner(existing, &item.metadata.owner)?;
        }

        // Body first, so the index never points at content that was not written.
        self.write_content(&item.metadata.id, &item.content)?;
        index.insert(item.metadata.id, item.metadata.clone());
        self.save_index(&index)
    }

    fn get_item(&self, owner: &OwnerId, id: &Uuid) -> Result<ContentItem> {
        let index = self.load_index()?;
        let metadata = index.get(id).ok_or(RecallError::ItemNotFound(*id))?;
        check_owner(metadata, owner)?;
        Ok(ContentItem {
            metadata: metadata.clone(),
            content: self.read_content(id)?,
        })
    }

    fn list_items(&self, owner: &OwnerId) -> Result<Vec<ContentItem>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let index = self.load_index()?;
        let mut items = Vec::new();
        for (id, metadata) in index {
            if &metadata.owner != owner {
                continue;
            }
            let content = self.read_content(&id)?;
            items.push(ContentItem { metadata, content });
        }
        Ok(items)
    }

    fn delete_item(&mut self, owner: &OwnerId, id: &Uuid) -> Result<()> {
        let _lock = self.lock()?;

        let mut index = self.load_index()?;
        let metadata = index.get(id).ok_or(RecallError::ItemNotFound(*id))?;
        check_owner(metadata, owner)?;
        index.remove(id);
        self.save_index(&index)?;

        if let Some(path) = self.find_content_file(id) {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn load_profile(&self, owner: &OwnerId) -> Result<Option<UserProfile>> {
        let mut profiles: ProfileIndex = self.load_json(USERS_FILE)?;
        Ok(profiles.remove(owner))
    }

    fn save_profile(&mut self, profile: &UserProfile) -> Result<()> {
        let _lock = self.lock()?;
        let mut profiles: ProfileIndex = self.load_json(USERS_FILE)?;
        profiles.insert(profile.owner.clone(), profile.clone());
        self.save_json(USERS_FILE, &profiles)
    }

    fn update_profile<F>(&mut self, owner: &OwnerId, apply: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) -> Result<()>,
    {
        let _lock = self.lock()?;
        let mut profiles: ProfileIndex = self.load_json(USERS_FILE)?;
        let mut profile = profiles
            .get(owner)
            .cloned()
            .unwrap_or_else(|| UserProfile::new(owner.clone()));
        apply(&mut profile)?;
        profiles.insert(owner.clone(), profile.clone());
        self.save_json(USERS_FILE, &profiles)?;
        Ok(profile)
    }

    fn commit_review(
        &mut self,
        owner: &OwnerId,
        id: &Uuid,
        expected_review_count: u32,
        update: &ReviewUpdate,
    ) -> Result<ContentItem> {
        let _lock = self.lock()?;

        let mut index = self.load_index()?;
        let metadata = index.get_mut(id).ok_or(RecallError::ItemNotFound(*id))?;
        check_owner(metadata, owner)?;
        check_review_count(metadata, expected_review_count)?;
        update.apply(metadata);
        let metadata = metadata.clone();
        self.save_index(&index)?;

        Ok(ContentItem {
            content: self.read_content(id)?,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Outcome;
    use chrono::{Duration as ChronoDuration, Utc};
    use tempfile::tempdir;

    fn item(owner: &str, title: &str, content: &str) -> ContentItem {
        ContentItem::new(owner.into(), title.into(), content.into())
    }

    #[test]
    fn save_and_reload_item() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let it = item("ana", "Lifetimes", "'a outlives 'b");
        store.save_item(&it).unwrap();

        assert!(dir.path().join("items.json").exists());
        assert!(dir
            .path()
            .join("items")
            .join(format!("item-{}.md", it.metadata.id))
            .exists());

        let loaded = store.get_item(&"ana".into(), &it.metadata.id).unwrap();
        assert_eq!(loaded.metadata.title, "Lifetimes");
        assert_eq!(loaded.content, "'a outlives 'b");
        assert!(!dir.path().join(".lock").exists());
    }

    #[test]
    fn listing_is_per_owner() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        store.save_item(&item("ana", "A", "a")).unwrap();
        store.save_item(&item("ben", "B", "b")).unwrap();

        let ana = store.list_items(&"ana".into()).unwrap();
        assert_eq!(ana.len(), 1);
        assert_eq!(ana[0].metadata.title, "A");
    }

    #[test]
    fn other_owner_cannot_overwrite_or_delete() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let it = item("ana", "A", "a");
        store.save_item(&it).unwrap();

        let mut hijack = it.clone();
        hijack.metadata.owner = "ben".into();
        assert!(matches!(
            store.save_item(&hijack),
            Err(RecallError::Unauthorized(_))
        ));
        assert!(matches!(
            store.delete_item(&"ben".into(), &it.metadata.id),
            Err(RecallError::Unauthorized(_))
        ));
    }

    #[test]
    fn delete_removes_content_file() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let it = item("ana", "A", "a");
        store.save_item(&it).unwrap();
        store.delete_item(&"ana".into(), &it.metadata.id).unwrap();

        assert!(store.list_items(&"ana".into()).unwrap().is_empty());
        assert_eq!(fs::read_dir(dir.path().join("items")).unwrap().count(), 0);
    }

    #[test]
    fn content_found_after_extension_change() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let it = item("ana", "A", "body");
        store.save_item(&it).unwrap();

        let mut store = FileStore::new(dir.path().to_path_buf()).with_file_ext("txt");
        assert_eq!(
            store.get_item(&"ana".into(), &it.metadata.id).unwrap().content,
            "body"
        );

        store.save_item(&it).unwrap();
        let files: Vec<_> = fs::read_dir(dir.path().join("items"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec![format!("item-{}.txt", it.metadata.id)]);
    }

    #[test]
    fn commit_review_is_conditional() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let it = item("ana", "A", "a");
        store.save_item(&it).unwrap();

        let now = Utc::now();
        let update = ReviewUpdate {
            review_count: 1,
            next_review_date: now + ChronoDuration::days(2),
            difficulty: Outcome::Hard,
            updated_at: now,
        };
        store
            .commit_review(&"ana".into(), &it.metadata.id, 0, &update)
            .unwrap();
        assert!(matches!(
            store.commit_review(&"ana".into(), &it.metadata.id, 0, &update),
            Err(RecallError::Conflict(_))
        ));

        let reloaded = FileStore::new(dir.path().to_path_buf())
            .get_item(&"ana".into(), &it.metadata.id)
            .unwrap();
        assert_eq!(reloaded.metadata.review_count, 1);
        assert_eq!(reloaded.metadata.difficulty, Some(Outcome::Hard));
        assert_eq!(reloaded.metadata.next_review_date, update.next_review_date);
    }

    #[test]
    fn profiles_round_trip_per_owner() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        assert!(store.load_profile(&"ana".into()).unwrap().is_none());

        let mut profile = UserProfile::new("ana".into());
        profile.repetition_flow = Some("1,2,3".parse().unwrap());
        store.save_profile(&profile).unwrap();
        store.save_profile(&UserProfile::new("ben".into())).unwrap();

        let loaded = store.load_profile(&"ana".into()).unwrap().unwrap();
        assert_eq!(loaded.flow().days(), &[1, 2, 3]);
    }

    #[test]
    fn held_lock_times_out() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        fs::write(dir.path().join(".lock"), "").unwrap();

        let err = store.save_item(&item("ana", "A", "a")).unwrap_err();
        assert!(matches!(err, RecallError::Store(_)));
    }

    #[test]
    fn negative_review_count_on_disk_is_rejected() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let it = item("ana", "A", "a");
        store.save_item(&it).unwrap();

        let path = dir.path().join("items.json");
        let raw = fs::read_to_string(&path).unwrap();
        fs::write(&path, raw.replace("\"review_count\": 0", "\"review_count\": -1")).unwrap();

        assert!(matches!(
            store.list_items(&"ana".into()),
            Err(RecallError::Serialization(_))
        ));
    }
}
