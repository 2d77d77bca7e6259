use crate::error::{RecallError, Result};
use crate::index::{index_items, DisplayItem, ItemSelector};
use crate::model::{OwnerId, UserProfile};
use crate::store::DataStore;

pub fn indexed_items<S: DataStore>(store: &S, owner: &OwnerId) -> Result<Vec<DisplayItem>> {
    let items = store.list_items(owner)?;
    Ok(index_items(items))
}

/// The owner's profile, or a fresh one if they never saved settings.
pub fn load_profile<S: DataStore>(store: &S, owner: &OwnerId) -> Result<UserProfile> {
    Ok(store
        .load_profile(owner)?
        .unwrap_or_else(|| UserProfile::new(owner.clone())))
}

/// Resolves selectors to items, in selector order, without duplicates.
///
/// Ids are checked against the store so another owner's item yields
/// `Unauthorized` rather than a silent miss.
pub fn items_by_selectors<S: DataStore>(
    store: &S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
) -> Result<Vec<DisplayItem>> {
    let indexed = indexed_items(store, owner)?;
    let mut resolved: Vec<DisplayItem> = Vec::new();

    for selector in selectors {
        let found = match selector {
            ItemSelector::Index(idx) => vec![indexed
                .iter()
                .find(|di| &di.index == idx)
                .cloned()
                .ok_or_else(|| RecallError::BadRequest(format!("Index {} not found", idx)))?],
            ItemSelector::Id(id) => {
                store.get_item(owner, id)?;
                vec![indexed
                    .iter()
                    .find(|di| &di.item.metadata.id == id)
                    .cloned()
                    .ok_or(RecallError::ItemNotFound(*id))?]
            }
            ItemSelector::Title(term) => vec![find_by_title(&indexed, term)?],
        };

        for di in found {
            if !resolved
                .iter()
                .any(|r| r.item.metadata.id == di.item.metadata.id)
            {
                resolved.push(di);
            }
        }
    }

    Ok(resolved)
}

/// An exact (case-insensitive) title wins; otherwise the term must match
/// exactly one title by substring.
fn find_by_title(indexed: &[DisplayItem], term: &str) -> Result<DisplayItem> {
    let term_lower = term.to_lowercase();

    let exact: Vec<_> = indexed
        .iter()
        .filter(|di| di.item.metadata.title.to_lowercase() == term_lower)
        .collect();
    if exact.len() == 1 {
        return Ok(exact[0].clone());
    }

    let partial: Vec<_> = indexed
        .iter()
        .filter(|di| di.item.metadata.title.to_lowercase().contains(&term_lower))
        .collect();
    match partial.len() {
        0 => Err(RecallError::BadRequest(format!(
            "No item matches \"{}\"",
            term
        ))),
        1 => Ok(partial[0].clone()),
        n => Err(RecallError::BadRequest(format!(
            "\"{}\" matches {} items, use an index instead",
            term, n
        ))),
    }
}
