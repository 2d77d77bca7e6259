use crate::commands::{CmdMessage, CmdResult, ItemUpdate};
use crate::error::{RecallError, Result};
use crate::model::{derive_title, OwnerId};
use crate::store::DataStore;
use chrono::{DateTime, Utc};

/// Replaces title and body. Scheduling fields are left alone.
pub fn run<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    updates: &[ItemUpdate],
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    for update in updates {
        if update.content.trim().is_empty() {
            return Err(RecallError::BadRequest(format!(
                "Content is required (item {})",
                update.id
            )));
        }

        let mut item = store.get_item(owner, &update.id)?;
        let title = update.title.trim();
        let title = if title.is_empty() {
            derive_title(&update.content)
        } else {
            title.to_string()
        };

        if item.metadata.title == title && item.content == update.content {
            result.add_message(CmdMessage::info(format!("No changes: {}", title)));
            continue;
        }

        item.metadata.title = title;
        item.content = update.content.clone();
        item.metadata.updated_at = now;
        store.save_item(&item)?;

        result.add_message(CmdMessage::success(format!(
            "Item updated: {}",
            item.metadata.title
        )));
        result.affected_items.push(item);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;

    #[test]
    fn updates_content_and_keeps_schedule() {
        let mut fixture =
            StoreFixture::new().with_reviewed_item("Card", 4, crate::model::Outcome::Hard);
        let before = fixture.store.list_items(&owner()).unwrap().remove(0);
        let now = Utc::now();

        let update = ItemUpdate::new(before.metadata.id, "Card v2".into(), "New body".into());
        run(&mut fixture.store, &owner(), &[update], now).unwrap();

        let after = fixture.store.get_item(&owner(), &before.metadata.id).unwrap();
        assert_eq!(after.metadata.title, "Card v2");
        assert_eq!(after.content, "New body");
        assert_eq!(after.metadata.updated_at, now);
        assert_eq!(after.metadata.review_count, 4);
        assert_eq!(after.metadata.next_review_date, before.metadata.next_review_date);
    }

    #[test]
    fn empty_content_is_rejected() {
        let mut fixture = StoreFixture::new().with_item("Card", "body");
        let id = fixture.store.list_items(&owner()).unwrap()[0].metadata.id;
        let update = ItemUpdate::new(id, "Card".into(), "   ".into());
        assert!(matches!(
            run(&mut fixture.store, &owner(), &[update], Utc::now()),
            Err(RecallError::BadRequest(_))
        ));
    }

    #[test]
    fn unchanged_item_is_not_saved() {
        let mut fixture = StoreFixture::new().with_item("Card", "body");
        let item = fixture.store.list_items(&owner()).unwrap().remove(0);
        let update = ItemUpdate::new(item.metadata.id, "Card".into(), "body".into());
        let res = run(&mut fixture.store, &owner(), &[update], Utc::now()).unwrap();
        assert!(res.affected_items.is_empty());
    }
}
