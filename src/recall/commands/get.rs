use crate::commands::CmdResult;
use crate::error::{RecallError, Result};
use crate::index::{index_items, DisplayIndex, DisplayItem};
use crate::model::{subject_id, OwnerId};
use crate::store::DataStore;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatusFilter {
    All,
    #[default]
    Active,
    Archived,
}

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub status: ItemStatusFilter,
    /// Subject id or name.
    pub subject: Option<String>,
    /// Matches items carrying any of these tags.
    pub tags: Vec<String>,
    pub search_term: Option<String>,
}

/// Requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

pub fn run<S: DataStore>(
    store: &S,
    owner: &OwnerId,
    filter: ItemFilter,
    page: Option<Page>,
) -> Result<CmdResult> {
    let items = store.list_items(owner)?;
    let indexed = index_items(items);

    let subject_key = filter.subject.as_deref().map(subject_id);
    let tags: Vec<String> = filter.tags.iter().map(|t| t.trim().to_lowercase()).collect();

    let mut filtered: Vec<DisplayItem> = indexed
        .into_iter()
        .filter(|di| match filter.status {
            ItemStatusFilter::All => true,
            ItemStatusFilter::Active => matches!(di.index, DisplayIndex::Active(_)),
            ItemStatusFilter::Archived => matches!(di.index, DisplayIndex::Archived(_)),
        })
        .filter(|di| match &subject_key {
            Some(key) => di
                .item
                .metadata
                .subject
                .as_ref()
                .is_some_and(|s| &s.id == key || subject_id(&s.name) == *key),
            None => true,
        })
        .filter(|di| {
            tags.is_empty()
                || di
                    .item
                    .metadata
                    .tags
                    .iter()
                    .any(|t| tags.contains(&t.to_lowercase()))
        })
        .collect();

    if let Some(term) = filter.search_term.as_deref().map(str::trim) {
        if !term.is_empty() {
            filtered = rank_by_search(filtered, term);
        }
    }

    let mut result = CmdResult::default();
    if let Some(page) = page {
        let (slice, pagination) = paginate(filtered, page)?;
        filtered = slice;
        result = result.with_pagination(pagination);
    }

    Ok(result.with_listed_items(filtered))
}

/// Keeps matches only, best first: exact title, title substring, then body
/// or tag. Ties go to the shorter title, then the newer item.
fn rank_by_search(items: Vec<DisplayItem>, term: &str) -> Vec<DisplayItem> {
    let term_lower = term.to_lowercase();
    let mut matches: Vec<(DisplayItem, u8)> = items
        .into_iter()
        .filter_map(|di| {
            let title_lower = di.item.metadata.title.to_lowercase();
            let score = if title_lower == term_lower {
                1
            } else if title_lower.contains(&term_lower) {
                2
            } else if di.item.content.to_lowercase().contains(&term_lower)
                || di
                    .item
                    .metadata
                    .tags
                    .iter()
                    .any(|t| t.to_lowercase().contains(&term_lower))
            {
                3
            } else {
                return None;
            };
            Some((di, score))
        })
        .collect();

    matches.sort_by(|(a, score_a), (b, score_b)| match score_a.cmp(score_b) {
        Ordering::Equal => match a.item.metadata.title.len().cmp(&b.item.metadata.title.len()) {
            Ordering::Equal => b.item.metadata.created_at.cmp(&a.item.metadata.created_at),
            ord => ord,
        },
        ord => ord,
    });

    matches.into_iter().map(|(di, _)| di).collect()
}

fn paginate(items: Vec<DisplayItem>, page: Page) -> Result<(Vec<DisplayItem>, Pagination)> {
    if page.page == 0 || page.limit == 0 {
        return Err(RecallError::BadRequest(
            "Page and limit must be at least 1".to_string(),
        ));
    }

    let total = items.len();
    let pages = total.div_ceil(page.limit);
    let slice = items
        .into_iter()
        .skip((page.page - 1).saturating_mul(page.limit))
        .take(page.limit)
        .collect();

    Ok((
        slice,
        Pagination {
            page: page.page,
            limit: page.limit,
            total,
            pages,
        },
    ))
}
