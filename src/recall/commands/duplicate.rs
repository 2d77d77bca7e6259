use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::index_items;
use crate::model::{ContentItem, OwnerId};
use crate::store::DataStore;

/// Content shorter than this is never reported as a duplicate.
pub const MIN_DUPLICATE_LEN: usize = 50;
/// Leading characters compared against existing items.
pub const DUPLICATE_PREFIX_LEN: usize = 100;

/// Active items whose content contains the first
/// [`DUPLICATE_PREFIX_LEN`] characters of `content`, ignoring case.
pub fn find_duplicates<'a>(items: &'a [ContentItem], content: &str) -> Vec<&'a ContentItem> {
    let content = content.trim();
    if content.chars().count() < MIN_DUPLICATE_LEN {
        return Vec::new();
    }

    let needle: String = content
        .chars()
        .take(DUPLICATE_PREFIX_LEN)
        .collect::<String>()
        .to_lowercase();

    items
        .iter()
        .filter(|i| i.metadata.is_active && i.content.to_lowercase().contains(&needle))
        .collect()
}

pub fn run<S: DataStore>(store: &S, owner: &OwnerId, content: &str) -> Result<CmdResult> {
    let items = store.list_items(owner)?;
    let duplicates: Vec<ContentItem> = find_duplicates(&items, content)
        .into_iter()
        .cloned()
        .collect();

    let mut result = CmdResult::default();
    if duplicates.is_empty() {
        result.add_message(CmdMessage::info("No similar items found."));
        return Ok(result);
    }

    let ids: Vec<_> = duplicates.iter().map(|d| d.metadata.id).collect();
    let listed = index_items(items)
        .into_iter()
        .filter(|di| ids.contains(&di.item.metadata.id))
        .collect();
    result.add_message(CmdMessage::warning(format!(
        "{} similar item(s) already exist.",
        duplicates.len()
    )));
    Ok(result.with_listed_items(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;

    const LONG: &str = "The borrow checker enforces that references never outlive the data they point to.";

    #[test]
    fn short_content_is_never_duplicate() {
        let fixture = StoreFixture::new().with_item("Short", "hello");
        let items = fixture.store.list_items(&owner()).unwrap();
        assert!(find_duplicates(&items, "hello").is_empty());
    }

    #[test]
    fn matches_prefix_case_insensitively() {
        let fixture = StoreFixture::new().with_item("Borrowing", &format!("Notes.\n{}", LONG));
        let items = fixture.store.list_items(&owner()).unwrap();
        assert_eq!(find_duplicates(&items, &LONG.to_uppercase()).len(), 1);
    }

    #[test]
    fn ignores_archived_and_foreign_items() {
        let mut fixture = StoreFixture::new().with_foreign_item("Theirs");
        let mut archived = ContentItem::new(owner(), "Old".into(), LONG.into());
        archived.metadata.is_active = false;
        fixture.store.save_item(&archived).unwrap();

        let result = run(&fixture.store, &owner(), LONG).unwrap();
        assert!(result.listed_items.is_empty());
    }

    #[test]
    fn run_lists_duplicates() {
        let fixture = StoreFixture::new().with_item("Borrowing", LONG).with_items(2);
        let result = run(&fixture.store, &owner(), LONG).unwrap();
        assert_eq!(result.listed_items.len(), 1);
        assert_eq!(result.listed_items[0].item.metadata.title, "Borrowing");
    }
}
