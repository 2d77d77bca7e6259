use crate::commands::{CmdMessage, CmdResult};
use crate::error::{RecallError, Result};
use crate::model::{normalize_tags, ContentItem, OwnerId};
use crate::store::DataStore;
use chrono::{DateTime, Utc};

use super::duplicate::find_duplicates;
use super::helpers::load_profile;

/// Input for a new item. An empty title is derived from the content.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub title: String,
    pub content: String,
    pub subject: Option<String>,
    pub tags: Vec<String>,
}

impl NewItem {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }
}

pub fn run<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    new_item: NewItem,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    if new_item.content.trim().is_empty() {
        return Err(RecallError::BadRequest("Content is required".to_string()));
    }

    let subject = match new_item.subject.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            let profile = load_profile(store, owner)?;
            let subject = profile
                .find_subject(key)
                .cloned()
                .ok_or_else(|| RecallError::BadRequest(format!("Unknown subject: {}", key)))?;
            Some(subject)
        }
        _ => None,
    };

    let existing = store.list_items(owner)?;
    let duplicates = find_duplicates(&existing, &new_item.content).len();

    let mut item = ContentItem::new_at(owner.clone(), new_item.title, new_item.content, now);
    item.metadata.subject = subject;
    item.metadata.tags = normalize_tags(&new_item.tags);
    store.save_item(&item)?;
    log::info!("created item {} for {}", item.metadata.id, owner);

    let mut result = CmdResult::default();
    if duplicates > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Similar content already exists in {} item(s).",
            duplicates
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Item created: {} (first review {})",
        item.metadata.title,
        item.metadata.next_review_date.format("%Y-%m-%d")
    )));
    Ok(result.with_affected_items(vec![item]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::*;
    use crate::store::memory::InMemoryStore;
    use chrono::Local;

    #[test]
    fn creates_item_due_tomorrow() {
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        let result = run(&mut store, &owner(), NewItem::new("Title", "Body"), now).unwrap();

        let item = &result.affected_items[0];
        assert_eq!(item.metadata.title, "Title");
        assert_eq!(item.metadata.review_count, 0);
        assert_eq!(
            item.metadata.next_review_date.with_timezone(&Local).date_naive(),
            now.with_timezone(&Local).date_naive().succ_opt().unwrap()
        );
        assert_eq!(store.list_items(&owner()).unwrap().len(), 1);
    }

    #[test]
    fn content_is_required() {
        let mut store = InMemoryStore::new();
        let err = run(&mut store, &owner(), NewItem::new("Title", "  \n"), Utc::now()).unwrap_err();
        assert!(matches!(err, RecallError::BadRequest(_)));
        assert!(store.list_items(&owner()).unwrap().is_empty());
    }

    #[test]
    fn attaches_known_subject_and_tags() {
        let mut fixture = StoreFixture::new().with_subject("Organic Chemistry", "#00ff00");
        let new_item = NewItem {
            subject: Some("organic-chemistry".into()),
            tags: vec!["alkanes".into(), "Alkanes".into(), " ".into()],
            ..NewItem::new("", "Alkanes are saturated hydrocarbons")
        };
        let result = run(&mut fixture.store, &owner(), new_item, Utc::now()).unwrap();
        let item = &result.affected_items[0];
        assert_eq!(item.metadata.title, "Alkanes are saturated hydrocarbons");
        assert_eq!(
            item.metadata.subject.as_ref().map(|s| s.name.as_str()),
            Some("Organic Chemistry")
        );
        assert_eq!(item.metadata.tags, vec!["alkanes".to_string()]);
    }

    #[test]
    fn unknown_subject_is_rejected() {
        let mut store = InMemoryStore::new();
        let new_item = NewItem {
            subject: Some("history".into()),
            ..NewItem::new("T", "Body")
        };
        let err = run(&mut store, &owner(), new_item, Utc::now()).unwrap_err();
        assert!(matches!(err, RecallError::BadRequest(_)));
    }

    #[test]
    fn warns_on_duplicate_content() {
        let body = "A monad is just a monoid in the category of endofunctors, nothing more.";
        let mut fixture = StoreFixture::new().with_item("Monads", body);
        let result = run(&mut fixture.store, &owner(), NewItem::new("Again", body), Utc::now()).unwrap();
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning));
        assert_eq!(fixture.store.list_items(&owner()).unwrap().len(), 2);
    }
}
