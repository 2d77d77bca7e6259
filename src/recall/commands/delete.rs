use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::ItemSelector;
use crate::model::OwnerId;
use crate::store::DataStore;

use super::helpers::items_by_selectors;

/// Permanently removes items. Use `archive` to keep them.
pub fn run<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
) -> Result<CmdResult> {
    let items = items_by_selectors(store, owner, selectors)?;
    let mut result = CmdResult::default();

    for di in items {
        store.delete_item(owner, &di.item.metadata.id)?;
        result.add_message(CmdMessage::success(format!(
            "Item deleted ({}): {}",
            di.index, di.item.metadata.title
        )));
        result.affected_items.push(di.item);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecallError;
    use crate::index::DisplayIndex;
    use crate::store::memory::fixtures::*;

    #[test]
    fn deletes_selected_items() {
        let mut fixture = StoreFixture::new().with_items(3);
        let res = run(
            &mut fixture.store,
            &owner(),
            &[ItemSelector::Index(DisplayIndex::Active(1)), ItemSelector::Index(DisplayIndex::Active(2))],
        )
        .unwrap();
        assert_eq!(res.affected_items.len(), 2);

        let left = fixture.store.list_items(&owner()).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].metadata.title, "Test Item 1");
    }

    #[test]
    fn cannot_delete_foreign_item() {
        let mut fixture = StoreFixture::new().with_foreign_item("Theirs");
        let id = fixture.store.list_items(&other_owner()).unwrap()[0].metadata.id;
        let err = run(&mut fixture.store, &owner(), &[ItemSelector::Id(id)]).unwrap_err();
        assert!(matches!(err, RecallError::Unauthorized(_)));
        assert_eq!(fixture.store.list_items(&other_owner()).unwrap().len(), 1);
    }
}
