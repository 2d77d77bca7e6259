use crate::commands::CmdResult;
use crate::error::Result;
use crate::index::ItemSelector;
use crate::model::OwnerId;
use crate::store::DataStore;

use super::helpers::items_by_selectors;

pub fn run<S: DataStore>(
    store: &S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
) -> Result<CmdResult> {
    let items = items_by_selectors(store, owner, selectors)?;
    Ok(CmdResult::default().with_listed_items(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DisplayIndex;
    use crate::store::memory::fixtures::*;

    #[test]
    fn views_full_content() {
        let fixture = StoreFixture::new().with_item("Card", "Full body text");
        let res = run(
            &fixture.store,
            &owner(),
            &[ItemSelector::Index(DisplayIndex::Active(1))],
        )
        .unwrap();
        assert_eq!(res.listed_items[0].item.content, "Full body text");
    }

    #[test]
    fn views_archived_by_index() {
        let fixture = StoreFixture::new()
            .with_item("Card", "x")
            .with_archived_item("Old");
        let res = run(
            &fixture.store,
            &owner(),
            &[ItemSelector::Index(DisplayIndex::Archived(1))],
        )
        .unwrap();
        assert_eq!(res.listed_items[0].item.metadata.title, "Old");
    }
}
