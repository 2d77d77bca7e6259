//! # Interval Scheduler
//!
//! Decides when an item comes up next. Every review outcome advances the
//! item's review count by one and picks a day offset from the owner's
//! *repetition flow*: an ordered list of day offsets, one per review stage.
//!
//! ```text
//! flow:   [2, 4, 7, 7, 7, 30, 30, 30, 130, 130, 130, 365, 365, 365]
//! stage:   0  1  2  3  4   5   6   7    8    9   10   11   12   13
//! ```
//!
//! The stage index is always clamped to the last entry, so items reviewed
//! more often than the flow is long keep coming back at the longest interval.
//!
//! Two policies pick the stage index. They are alternatives, never combined:
//!
//! - [`SchedulingPolicy::DifficultyAdjusted`] (default): the index starts at the
//!   current review count and moves one stage up for `easy` or one stage
//!   down for `hard` before the lookup.
//! - [`SchedulingPolicy::FixedCount`]: the outcome is ignored and the index is
//!   the number of reviews already performed.
//!
//! Intervals are whole calendar days in the timezone of the `now` passed in:
//! a review at 23:30 with a two-day interval is next due at 23:30 two local
//! days later, whatever DST does in between.
//!
//! Everything here is pure. Loading the flow, persisting the result and
//! guarding against concurrent reviews of the same item are the caller's job
//! (see `commands::review` and `DataStore::commit_review`).

use crate::error::SchedulerError;
use crate::model::Outcome;
use chrono::{DateTime, Days, Duration, LocalResult, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flow applied when a user has not configured one.
pub const DEFAULT_REPETITION_FLOW: [u32; 14] =
    [2, 4, 7, 7, 7, 30, 30, 30, 130, 130, 130, 365, 365, 365];

/// A validated repetition flow: never empty, every offset at least one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct RepetitionFlow(Vec<u32>);

impl RepetitionFlow {
    pub fn new(days: Vec<u32>) -> Result<Self, SchedulerError> {
        validate_flow(&days)?;
        Ok(Self(days))
    }

    pub fn days(&self) -> &[u32] {
        &self.0
    }

}

impl Default for RepetitionFlow {
    fn default() -> Self {
        Self(DEFAULT_REPETITION_FLOW.to_vec())
    }
}

impl TryFrom<Vec<u32>> for RepetitionFlow {
    type Error = SchedulerError;

    fn try_from(days: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<RepetitionFlow> for Vec<u32> {
    fn from(flow: RepetitionFlow) -> Self {
        flow.0
    }
}

impl fmt::Display for RepetitionFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|d| d.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

/// Parses `"2, 4, 7"` style lists.
impl FromStr for RepetitionFlow {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>().map_err(|_| {
                    SchedulerError::InvalidConfiguration(format!(
                        "'{}' is not a whole number of days",
                        part
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(days)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulingPolicy {
    /// Easy skips a stage ahead, hard falls back one stage.
    #[default]
    DifficultyAdjusted,
    /// Stage is the number of reviews already done; outcome ignored.
    FixedCount,
}

impl SchedulingPolicy {
    /// Stage index into a flow of `len` entries, clamped to `[0, len - 1]`.
    /// `None` for an empty flow.
    pub fn stage_index(self, review_count: u32, outcome: Outcome, len: usize) -> Option<usize> {
        let last = len.checked_sub(1)?;
        let current = review_count as usize;
        let idx = match self {
            SchedulingPolicy::DifficultyAdjusted => match outcome {
                Outcome::Easy if current < last => current + 1,
                Outcome::Hard if current > 0 => current - 1,
                _ => current,
            },
            SchedulingPolicy::FixedCount => current,
        };
        Some(idx.min(last))
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingPolicy::DifficultyAdjusted => f.write_str("difficulty-adjusted"),
            SchedulingPolicy::FixedCount => f.write_str("fixed-count"),
        }
    }
}

impl FromStr for SchedulingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "difficulty-adjusted" | "difficulty" | "adjusted" => {
                Ok(SchedulingPolicy::DifficultyAdjusted)
            }
            "fixed-count" | "fixed" | "count" => Ok(SchedulingPolicy::FixedCount),
            other => Err(format!(
                "Invalid policy: {} (expected difficulty-adjusted or fixed-count)",
                other
            )),
        }
    }
}

/// Result of recording one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// Review count after this review.
    pub review_count: u32,
    /// Stage of the flow the interval was taken from.
    pub stage_index: usize,
    pub interval_days: u32,
    pub next_review_date: DateTime<Utc>,
}

/// Records a review and computes the next review date.
///
/// The count always advances by exactly one, whatever the outcome; only the
/// interval lookup is affected by the policy. Calling this twice for the same
/// item is two reviews.
///
/// Fails with [`SchedulerError::InvalidConfiguration`] for an empty flow or a
/// zero-day offset, and with [`SchedulerError::InvalidState`] when the count
/// cannot advance or the next date is out of range.
pub fn record_review<Tz: TimeZone>(
    review_count: u32,
    outcome: Outcome,
    flow: &[u32],
    policy: SchedulingPolicy,
    now: DateTime<Tz>,
) -> Result<Schedule, SchedulerError> {
    validate_flow(flow)?;

    let next_count = review_count.checked_add(1).ok_or_else(|| {
        SchedulerError::InvalidState(format!("review count {} cannot advance", review_count))
    })?;

    let stage_index = policy
        .stage_index(review_count, outcome, flow.len())
        .ok_or_else(|| SchedulerError::InvalidConfiguration("repetition flow is empty".into()))?;
    let interval_days = flow[stage_index];
    let next_review_date = add_calendar_days(&now, interval_days).ok_or_else(|| {
        SchedulerError::InvalidState(format!(
            "{} days after {} is out of range",
            interval_days,
            now.naive_local()
        ))
    })?;

    Ok(Schedule {
        review_count: next_count,
        stage_index,
        interval_days,
        next_review_date,
    })
}

/// `start` plus `days` calendar days in `start`'s timezone, same wall-clock
/// time. An ambiguous local time resolves to the earlier instant; a local
/// time skipped by a DST jump moves forward one hour.
pub fn add_calendar_days<Tz: TimeZone>(start: &DateTime<Tz>, days: u32) -> Option<DateTime<Utc>> {
    let target = start
        .naive_local()
        .checked_add_days(Days::new(u64::from(days)))?;
    let tz = start.timezone();
    let resolved = match tz.from_local_datetime(&target) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(target + Duration::hours(1)))
            .earliest(),
    };
    resolved.map(|t| t.with_timezone(&Utc))
}

fn validate_flow(flow: &[u32]) -> Result<(), SchedulerError> {
    if flow.is_empty() {
        return Err(SchedulerError::InvalidConfiguration(
            "repetition flow is empty".to_string(),
        ));
    }
    if let Some(pos) = flow.iter().position(|&d| d == 0) {
        return Err(SchedulerError::InvalidConfiguration(format!(
            "repetition flow entry {} is zero days",
            pos + 1
        )));
    }
    Ok(())
}
