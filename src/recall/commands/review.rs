//! Review completion: the only path that advances an item's schedule.
//!
//! Each review is read, compute, conditional write:
//!
//! 1. load the item (ownership checked by the store) and the owner's flow
//! 2. [`record_review`] with the configured policy
//! 3. [`DataStore::commit_review`] keyed by the review count read in step 1
//!
//! If another review lands between 1 and 3 the commit fails with
//! `Conflict` and nothing is written, so each review event commits at most
//! one schedule.

use crate::commands::{CmdMessage, CmdResult, ReviewReceipt};
use crate::error::Result;
use crate::model::{OwnerId, Outcome};
use crate::scheduler::{record_review, SchedulingPolicy};
use crate::store::{DataStore, ReviewUpdate};
use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use super::helpers::load_profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewRequest {
    pub item_id: Uuid,
    /// `None` is treated as [`Outcome::Good`].
    pub outcome: Option<Outcome>,
}

impl ReviewRequest {
    pub fn new(item_id: Uuid, outcome: Option<Outcome>) -> Self {
        Self { item_id, outcome }
    }
}

/// Records each review in order. Stops at the first failure; reviews
/// before it stay committed.
pub fn run<S: DataStore>(
    store: &mut S,
    owner: &OwnerId,
    policy: SchedulingPolicy,
    requests: &[ReviewRequest],
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let flow = load_profile(store, owner)?.flow();
    let mut result = CmdResult::default();

    for request in requests {
        let item = store.get_item(owner, &request.item_id)?;
        let outcome = request.outcome.unwrap_or_default();
        let previous_count = item.metadata.review_count;

        let local_now = now.with_timezone(&Local);
        let schedule = record_review(previous_count, outcome, flow.days(), policy, local_now)
            .inspect_err(|e| {
                log::error!("scheduling review of {} failed: {}", item.metadata.id, e)
            })?;

        let update = ReviewUpdate {
            review_count: schedule.review_count,
            next_review_date: schedule.next_review_date,
            difficulty: outcome,
            updated_at: now,
        };
        let updated = store.commit_review(owner, &item.metadata.id, previous_count, &update)?;
        log::info!(
            "reviewed {} ({}): count {} -> {}, next in {} days",
            updated.metadata.id,
            outcome,
            previous_count,
            schedule.review_count,
            schedule.interval_days
        );

        if !updated.metadata.is_active {
            result.add_message(CmdMessage::warning(format!(
                "{} is archived and will not show up as due",
                updated.metadata.title
            )));
        }
        result.add_message(CmdMessage::success(format!(
            "Reviewed {} ({}): next review in {} day{} ({})",
            updated.metadata.title,
            outcome,
            schedule.interval_days,
            if schedule.interval_days == 1 { "" } else { "s" },
            schedule.next_review_date.format("%Y-%m-%d")
        )));
        result.receipts.push(ReviewReceipt {
            item_id: updated.metadata.id,
            title: updated.metadata.title.clone(),
            outcome,
            previous_count,
            schedule,
        });
        result.affected_items.push(updated);
    }

    Ok(result)
}
