use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::ItemSelector;
use crate::model::OwnerId;
use crate::store::DataStore;
use chrono::{DateTime, Utc};

use super::helpers::items_by_selectors;

/// Takes items out of the review queue without deleting them.
pub fn archive<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    set_active(store, owner, selectors, false, now)
}

pub fn unarchive<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    set_active(store, owner, selectors, true, now)
}

fn set_active<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
    active: bool,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let items = items_by_selectors(store, owner, selectors)?;
    let mut result = CmdResult::default();

    for di in items {
        let mut item = di.item;
        if item.metadata.is_active == active {
            result.add_message(CmdMessage::info(format!(
                "Already {}: {}",
                if active { "active" } else { "archived" },
                item.metadata.title
            )));
            continue;
        }

        item.metadata.is_active = active;
        item.metadata.archived_at = if active { None } else { Some(now) };
        item.metadata.updated_at = now;
        store.save_item(&item)?;

        result.add_message(CmdMessage::success(format!(
            "Item {} ({}): {}",
            if active { "restored" } else { "archived" },
            di.index,
            item.metadata.title
        )));
        result.affected_items.push(item);
    }

    Ok(result)
}
