use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::{DisplayIndex, DisplayItem};
use crate::model::OwnerId;
use crate::store::DataStore;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use super::helpers::indexed_items;

/// A half-open `[start, end)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DueWindow {
    /// The local calendar day containing `now`.
    pub fn today(now: DateTime<Utc>) -> Self {
        Self::for_day(now.with_timezone(&Local).date_naive())
    }

    pub fn for_day(day: NaiveDate) -> Self {
        Self::for_day_in(day, &Local)
    }

    /// The calendar day `day` as observed in `tz`.
    pub fn for_day_in<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Self {
        let next = day.succ_opt().unwrap_or(day);
        Self {
            start: start_of_day(day, tz),
            end: start_of_day(next, tz),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Midnight in `tz` as UTC. When midnight does not exist locally (a DST jump
/// at 00:00) the first valid instant after it is used.
fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|h| {
            tz.from_local_datetime(&(midnight + chrono::Duration::hours(h)))
                .earliest()
        })
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Active items due today, or due today and earlier with `include_overdue`.
pub fn run<S: DataStore>(
    store: &S,
    owner: &OwnerId,
    now: DateTime<Utc>,
    include_overdue: bool,
) -> Result<CmdResult> {
    let window = DueWindow::today(now);
    let due: Vec<DisplayItem> = indexed_items(store, owner)?
        .into_iter()
        .filter(|di| matches!(di.index, DisplayIndex::Active(_)))
        .filter(|di| {
            let next = di.item.metadata.next_review_date;
            if include_overdue {
                next < window.end
            } else {
                window.contains(next)
            }
        })
        .collect();

    let mut result = CmdResult::default();
    if due.is_empty() {
        result.add_message(CmdMessage::info("Nothing due today."));
    }
    Ok(result.with_listed_items(due))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;
    use chrono::Duration;

    fn titles(result: &CmdResult) -> Vec<&str> {
        result
            .listed_items
            .iter()
            .map(|di| di.item.metadata.title.as_str())
            .collect()
    }

    #[test]
    fn window_covers_one_local_day() {
        let now = Utc::now();
        let window = DueWindow::today(now);
        assert!(window.contains(now));
        assert!(!window.contains(window.end));
        assert!(window.contains(window.start));
        assert!(window.end - window.start >= Duration::hours(23));
        assert!(window.end - window.start <= Duration::hours(25));
    }

    #[test]
    fn review_before_spring_forward_is_due_on_its_day() {
        use crate::scheduler::test_zone::Eastern2026;
        use crate::scheduler::{record_review, SchedulingPolicy};
        use crate::model::Outcome;

        let now = Eastern2026.with_ymd_and_hms(2026, 3, 7, 23, 30, 0).unwrap();
        let s = record_review(0, Outcome::Good, &[2], SchedulingPolicy::FixedCount, now).unwrap();

        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
        assert!(DueWindow::for_day_in(day(9), &Eastern2026).contains(s.next_review_date));
        assert!(!DueWindow::for_day_in(day(10), &Eastern2026).contains(s.next_review_date));

        let short = DueWindow::for_day_in(day(8), &Eastern2026);
        assert_eq!(short.end - short.start, Duration::hours(23));
    }

    #[test]
    fn lists_only_items_due_today() {
        let fixture = StoreFixture::new()
            .with_due_item("Today", 0)
            .with_due_item("Tomorrow", 2)
            .with_due_item("Last week", -7);

        let res = run(&fixture.store, &owner(), Utc::now(), false).unwrap();
        assert_eq!(titles(&res), vec!["Today"]);
    }

    #[test]
    fn overdue_items_included_on_request() {
        let fixture = StoreFixture::new()
            .with_due_item("Last week", -7)
            .with_due_item("Today", 0)
            .with_due_item("Next week", 7);

        let res = run(&fixture.store, &owner(), Utc::now(), true).unwrap();
        assert_eq!(titles(&res), vec!["Today", "Last week"]);
    }

    #[test]
    fn archived_and_foreign_items_are_never_due() {
        let mut fixture = StoreFixture::new().with_foreign_item("Theirs");
        let mut archived =
            crate::model::ContentItem::new(owner(), "Archived".into(), "body".into());
        archived.metadata.is_active = false;
        archived.metadata.next_review_date = Utc::now();
        fixture.store.save_item(&archived).unwrap();

        let res = run(&fixture.store, &owner(), Utc::now(), true).unwrap();
        assert!(res.listed_items.is_empty());
    }
}
