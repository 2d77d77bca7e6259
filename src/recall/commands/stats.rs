use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::{OwnerId, Outcome, ReviewStage};
use crate::store::DataStore;
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::collections::BTreeMap;

use super::due::DueWindow;

/// Days covered by the upcoming-reviews histogram, today included.
pub const UPCOMING_DAYS: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyStats {
    pub active: usize,
    pub archived: usize,
    /// Sum of review counts over all items, archived included.
    pub total_reviews: u64,
    pub due_today: usize,
    pub overdue: usize,
    pub by_stage: Vec<(ReviewStage, usize)>,
    /// Last recorded outcome; `None` counts never-reviewed items.
    pub by_difficulty: Vec<(Option<Outcome>, usize)>,
    /// Subject name (or "No subject") and count, largest first.
    pub by_subject: Vec<(String, usize)>,
    pub upcoming: Vec<(NaiveDate, usize)>,
}

pub fn run<S: DataStore>(store: &S, owner: &OwnerId, now: DateTime<Utc>) -> Result<CmdResult> {
    let items = store.list_items(owner)?;
    let today = now.with_timezone(&Local).date_naive();
    let window = DueWindow::for_day(today);

    let mut stats = StudyStats {
        by_stage: ReviewStage::all().into_iter().map(|s| (s, 0)).collect(),
        by_difficulty: vec![
            (Some(Outcome::Easy), 0),
            (Some(Outcome::Good), 0),
            (Some(Outcome::Hard), 0),
            (None, 0),
        ],
        upcoming: (0..UPCOMING_DAYS)
            .filter_map(|d| today.checked_add_days(chrono::Days::new(d as u64)))
            .map(|day| (day, 0))
            .collect(),
        ..Default::default()
    };
    let mut subjects: BTreeMap<String, usize> = BTreeMap::new();

    for item in &items {
        let meta = &item.metadata;
        stats.total_reviews += u64::from(meta.review_count);

        if !meta.is_active {
            stats.archived += 1;
            continue;
        }
        stats.active += 1;

        if window.contains(meta.next_review_date) {
            stats.due_today += 1;
        } else if meta.next_review_date < window.start {
            stats.overdue += 1;
        }

        bump(&mut stats.by_stage, &meta.stage());
        bump(&mut stats.by_difficulty, &meta.difficulty);

        let subject = meta
            .subject
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "No subject".to_string());
        *subjects.entry(subject).or_insert(0) += 1;

        let due_day = meta.next_review_date.with_timezone(&Local).date_naive();
        bump(&mut stats.upcoming, &due_day);
    }

    let mut by_subject: Vec<_> = subjects.into_iter().collect();
    by_subject.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    stats.by_subject = by_subject;

    Ok(CmdResult::default().with_stats(stats))
}

fn bump<K: PartialEq>(counts: &mut [(K, usize)], key: &K) {
    if let Some((_, n)) = counts.iter_mut().find(|(k, _)| k == key) {
        *n += 1;
    }
}
