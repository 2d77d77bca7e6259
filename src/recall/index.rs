use crate::model::ContentItem;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A user-facing index for an item: `1`, `2` for active items, `a1`, `a2`
/// for archived ones. Indexes are assigned newest first and are only stable
/// until items are added or archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayIndex {
    Active(usize),
    Archived(usize),
}

impl fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayIndex::Active(i) => write!(f, "{}", i),
            DisplayIndex::Archived(i) => write!(f, "a{}", i),
        }
    }
}

impl FromStr for DisplayIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('a') {
            if let Ok(n) = rest.parse() {
                return Ok(DisplayIndex::Archived(n));
            }
        }
        if let Ok(n) = s.parse() {
            return Ok(DisplayIndex::Active(n));
        }
        Err(format!("Invalid index format: {}", s))
    }
}

/// A user input to select an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelector {
    Index(DisplayIndex),
    Id(Uuid),
    Title(String),
}

impl fmt::Display for ItemSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemSelector::Index(idx) => write!(f, "{}", idx),
            ItemSelector::Id(id) => write!(f, "{}", id),
            ItemSelector::Title(t) => write!(f, "\"{}\"", t),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub item: ContentItem,
    pub index: DisplayIndex,
}

/// Assigns display indexes to a list of items.
///
/// Active items come first (`1..`), then archived ones (`a1..`), each bucket
/// ordered newest first.
pub fn index_items(mut items: Vec<ContentItem>) -> Vec<DisplayItem> {
    items.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));

    let (active, archived): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|i| i.metadata.is_active);

    let mut results = Vec::with_capacity(active.len() + archived.len());
    results.extend(active.into_iter().enumerate().map(|(i, item)| DisplayItem {
        item,
        index: DisplayIndex::Active(i + 1),
    }));
    results.extend(archived.into_iter().enumerate().map(|(i, item)| DisplayItem {
        item,
        index: DisplayIndex::Archived(i + 1),
    }));
    results
}

/// Parses either a single index or a range.
///
/// - Single index: "3", "a1"
/// - Range: "3-5" (expands to 3, 4, 5), "a1-a3"
///
/// Both endpoints must be the same kind and start must be <= end. Whether
/// the indexes exist is checked later during resolution.
pub fn parse_index_or_range(s: &str) -> Result<Vec<DisplayIndex>, String> {
    if let Some(dash_pos) = s.find('-') {
        if dash_pos > 0 {
            let start = DisplayIndex::from_str(&s[..dash_pos])?;
            let end = DisplayIndex::from_str(&s[dash_pos + 1..])?;
            return expand_range(start, end);
        }
    }

    DisplayIndex::from_str(s).map(|idx| vec![idx])
}

fn expand_range(start: DisplayIndex, end: DisplayIndex) -> Result<Vec<DisplayIndex>, String> {
    match (start, end) {
        (DisplayIndex::Active(s), DisplayIndex::Active(e)) if s <= e => {
            Ok((s..=e).map(DisplayIndex::Active).collect())
        }
        (DisplayIndex::Archived(s), DisplayIndex::Archived(e)) if s <= e => {
            Ok((s..=e).map(DisplayIndex::Archived).collect())
        }
        (DisplayIndex::Active(_), DisplayIndex::Active(_))
        | (DisplayIndex::Archived(_), DisplayIndex::Archived(_)) => Err(format!(
            "Invalid range: start ({}) must be <= end ({})",
            start, end
        )),
        _ => Err(format!(
            "Invalid range: cannot mix index types ({} and {})",
            start, end
        )),
    }
}

/// Turns raw command-line tokens into selectors.
///
/// Each token may be a UUID, an index or an index range. If any token is
/// none of these, all tokens are joined into a single title search instead,
/// so `recall view borrow checker` works without quoting.
pub fn parse_selectors<T: AsRef<str>>(inputs: &[T]) -> Vec<ItemSelector> {
    let mut selectors = Vec::new();
    for input in inputs {
        let token = input.as_ref().trim();
        if let Ok(id) = Uuid::parse_str(token) {
            selectors.push(ItemSelector::Id(id));
            continue;
        }
        match parse_index_or_range(token) {
            Ok(indexes) => selectors.extend(indexes.into_iter().map(ItemSelector::Index)),
            Err(_) => {
                let term = inputs
                    .iter()
                    .map(|s| s.as_ref().trim())
                    .collect::<Vec<_>>()
                    .join(" ");
                return vec![ItemSelector::Title(term)];
            }
        }
    }
    selectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_item(title: &str, minutes_ago: i64, active: bool) -> ContentItem {
        let mut item = ContentItem::new_at(
            "ana".into(),
            title.into(),
            "".into(),
            Utc::now() - Duration::minutes(minutes_ago),
        );
        item.metadata.is_active = active;
        item
    }

    #[test]
    fn test_indexing_buckets() {
        let items = vec![
            make_item("Old", 30, true),
            make_item("Gone", 20, false),
            make_item("New", 10, true),
        ];
        let indexed = index_items(items);

        assert_eq!(indexed.len(), 3);
        assert_eq!(indexed[0].item.metadata.title, "New");
        assert_eq!(indexed[0].index, DisplayIndex::Active(1));
        assert_eq!(indexed[1].item.metadata.title, "Old");
        assert_eq!(indexed[1].index, DisplayIndex::Active(2));
        assert_eq!(indexed[2].item.metadata.title, "Gone");
        assert_eq!(indexed[2].index, DisplayIndex::Archived(1));
    }

    #[test]
    fn test_parsing() {
        assert_eq!(DisplayIndex::from_str("1"), Ok(DisplayIndex::Active(1)));
        assert_eq!(DisplayIndex::from_str("a3"), Ok(DisplayIndex::Archived(3)));
        assert_eq!(DisplayIndex::Archived(3).to_string(), "a3");

        assert!(DisplayIndex::from_str("").is_err());
        assert!(DisplayIndex::from_str("a").is_err());
        assert!(DisplayIndex::from_str("x1").is_err());
        assert!(DisplayIndex::from_str("1a").is_err());
    }

    #[test]
    fn test_parse_ranges() {
        assert_eq!(
            parse_index_or_range("2-4"),
            Ok(vec![
                DisplayIndex::Active(2),
                DisplayIndex::Active(3),
                DisplayIndex::Active(4)
            ])
        );
        assert_eq!(
            parse_index_or_range("a1-a2"),
            Ok(vec![DisplayIndex::Archived(1), DisplayIndex::Archived(2)])
        );
        assert_eq!(parse_index_or_range("3-3"), Ok(vec![DisplayIndex::Active(3)]));

        assert!(parse_index_or_range("4-2").unwrap_err().contains("must be <= end"));
        assert!(parse_index_or_range("1-a2")
            .unwrap_err()
            .contains("cannot mix index types"));
        assert!(parse_index_or_range("-5").is_err());
        assert!(parse_index_or_range("3-").is_err());
    }

    #[test]
    fn test_selectors_indexes_and_ids() {
        let id = Uuid::new_v4();
        let selectors = parse_selectors(&["1-2".to_string(), id.to_string()]);
        assert_eq!(
            selectors,
            vec![
                ItemSelector::Index(DisplayIndex::Active(1)),
                ItemSelector::Index(DisplayIndex::Active(2)),
                ItemSelector::Id(id),
            ]
        );
    }

    #[test]
    fn test_selectors_fall_back_to_title_search() {
        let selectors = parse_selectors(&["borrow", "2"]);
        assert_eq!(selectors, vec![ItemSelector::Title("borrow 2".into())]);
    }
}
