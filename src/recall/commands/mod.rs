use crate::config::RecallConfig;
use crate::index::DisplayItem;
use crate::model::{ContentItem, Outcome, Subject, UserProfile};
use crate::scheduler::Schedule;
use std::path::PathBuf;
use uuid::Uuid;

pub mod archive;
pub mod config;
pub mod create;
pub mod delete;
pub mod due;
pub mod duplicate;
pub mod export;
pub mod get;
pub mod helpers;
pub mod init;
pub mod review;
pub mod stats;
pub mod subjects;
pub mod update;
pub mod view;

pub use get::Pagination;
pub use stats::StudyStats;

/// Where a store lives on disk. The config file sits next to the data.
#[derive(Debug, Clone)]
pub struct RecallPaths {
    pub root: PathBuf,
}

impl RecallPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// What a review did to one item.
#[derive(Debug, Clone)]
pub struct ReviewReceipt {
    pub item_id: Uuid,
    pub title: String,
    pub outcome: Outcome,
    pub previous_count: u32,
    pub schedule: Schedule,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_items: Vec<ContentItem>,
    pub listed_items: Vec<DisplayItem>,
    pub receipts: Vec<ReviewReceipt>,
    pub config: Option<RecallConfig>,
    pub profile: Option<UserProfile>,
    pub subjects: Vec<Subject>,
    pub stats: Option<StudyStats>,
    pub pagination: Option<Pagination>,
    pub exported: Option<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_items(mut self, items: Vec<ContentItem>) -> Self {
        self.affected_items = items;
        self
    }

    pub fn with_listed_items(mut self, items: Vec<DisplayItem>) -> Self {
        self.listed_items = items;
        self
    }

    pub fn with_config(mut self, config: RecallConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = subjects;
        self
    }

    pub fn with_stats(mut self, stats: StudyStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Appends another result, used when one call runs a command per item.
    pub fn merge(&mut self, other: CmdResult) {
        self.affected_items.extend(other.affected_items);
        self.listed_items.extend(other.listed_items);
        self.receipts.extend(other.receipts);
        self.messages.extend(other.messages);
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }
}

/// Replacement title and body for an item, typically from the editor.
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub id: Uuid,
    pub title: String,
    pub content: String,
}

impl ItemUpdate {
    pub fn new(id: Uuid, title: String, content: String) -> Self {
        Self { id, title, content }
    }
}
