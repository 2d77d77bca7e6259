use crate::scheduler::{add_calendar_days, RepetitionFlow};
use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest title derived from content when none is given.
pub const MAX_DERIVED_TITLE: usize = 80;

/// Identity of the user who owns items and settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How well an item was recalled during a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Easy,
    #[default]
    #[serde(alias = "medium")]
    Good,
    Hard,
}

impl Outcome {
    pub fn all() -> [Outcome; 3] {
        [Outcome::Easy, Outcome::Good, Outcome::Hard]
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Easy => "easy",
            Outcome::Good => "good",
            Outcome::Hard => "hard",
        };
        f.write_str(s)
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Outcome::Easy),
            "good" | "medium" => Ok(Outcome::Good),
            "hard" => Ok(Outcome::Hard),
            other => Err(format!(
                "Invalid outcome: {} (expected easy, good or hard)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            id: subject_id(name),
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Matches either the slug id or the display name, ignoring case.
    pub fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        self.id == subject_id(key) || self.name.eq_ignore_ascii_case(key)
    }
}

/// Slug used as a subject id: lower-cased, whitespace runs become `-`.
pub fn subject_id(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub id: Uuid,
    pub owner: OwnerId,
    pub title: String,
    #[serde(default)]
    pub subject: Option<Subject>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub next_review_date: DateTime<Utc>,
    pub review_count: u32,
    #[serde(default)]
    pub difficulty: Option<Outcome>,
    pub is_active: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Metadata {
    pub fn new(owner: OwnerId, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            title,
            subject: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            // New items come up for their first review the next local day.
            next_review_date: add_calendar_days(&now.with_timezone(&Local), 1)
                .unwrap_or(now + Duration::days(1)),
            review_count: 0,
            difficulty: None,
            is_active: true,
            archived_at: None,
        }
    }

    pub fn stage(&self) -> ReviewStage {
        ReviewStage::from_review_count(self.review_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub metadata: Metadata,
    pub content: String,
}

impl ContentItem {
    pub fn new(owner: OwnerId, title: String, content: String) -> Self {
        Self::new_at(owner, title, content, Utc::now())
    }

    pub fn new_at(
        owner: OwnerId,
        title: String,
        content: String,
        now: DateTime<Utc>,
    ) -> Self {
        let title = if title.trim().is_empty() {
            derive_title(&content)
        } else {
            title.trim().to_string()
        };
        Self {
            metadata: Metadata::new(owner, title, now),
            content,
        }
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.metadata.owner == owner
    }
}

/// Per-user settings: the repetition flow and the subject catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub owner: OwnerId,
    #[serde(default)]
    pub repetition_flow: Option<RepetitionFlow>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(owner: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            owner,
            repetition_flow: None,
            subjects: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The user's flow, or the default flow when none is configured.
    pub fn flow(&self) -> RepetitionFlow {
        self.repetition_flow.clone().unwrap_or_default()
    }

    pub fn find_subject(&self, key: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.matches(key))
    }
}

/// Coarse study phase shown to users, derived from the review count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStage {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ReviewStage {
    pub fn from_review_count(count: u32) -> Self {
        match count {
            0..=1 => ReviewStage::Daily,
            2..=4 => ReviewStage::Weekly,
            5..=7 => ReviewStage::Monthly,
            _ => ReviewStage::Yearly,
        }
    }

    pub fn all() -> [ReviewStage; 4] {
        [
            ReviewStage::Daily,
            ReviewStage::Weekly,
            ReviewStage::Monthly,
            ReviewStage::Yearly,
        ]
    }
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewStage::Daily => "daily",
            ReviewStage::Weekly => "weekly",
            ReviewStage::Monthly => "monthly",
            ReviewStage::Yearly => "yearly",
        };
        f.write_str(s)
    }
}

/// First non-empty line of the content, trimmed and capped.
pub fn derive_title(content: &str) -> String {
    let line = content
        .lines()
        .map(|l| l.trim().trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
        .unwrap_or("Untitled");

    if line.chars().count() > MAX_DERIVED_TITLE {
        let mut title: String = line.chars().take(MAX_DERIVED_TITLE - 1).collect();
        title.push('…');
        title
    } else {
        line.to_string()
    }
}

/// Trims tags, drops empty ones and removes duplicates (first occurrence wins).
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}
