//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! operation, whatever the client.
//!
//! The API:
//! - **Dispatches** to the matching `commands::*` function
//! - **Normalizes inputs** (raw selector tokens become [`ItemSelector`]s,
//!   the current time and configured policy are supplied here)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and holds no business logic.
//!
//! Every method takes the requesting [`OwnerId`]. Establishing who that is
//! belongs to the client; the facade and the stores only guarantee that one
//! owner never sees or changes another owner's items.
//!
//! `RecallApi<S: DataStore>` runs on `FileStore` in production and on
//! `InMemoryStore` in tests.

use crate::commands;
use crate::config::RecallConfig;
use crate::error::Result;
use crate::index::{parse_selectors, ItemSelector};
use crate::model::{OwnerId, Outcome};
use crate::scheduler::SchedulingPolicy;
use crate::store::DataStore;
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

pub struct RecallApi<S: DataStore> {
    store: S,
    paths: commands::RecallPaths,
    config: RecallConfig,
}

impl<S: DataStore> RecallApi<S> {
    pub fn new(store: S, paths: commands::RecallPaths, config: RecallConfig) -> Self {
        Self {
            store,
            paths,
            config,
        }
    }

    pub fn create_item(&mut self, owner: &OwnerId, new_item: NewItem) -> Result<CmdResult> {
        commands::create::run(&mut self.store, owner, new_item, Utc::now())
    }

    pub fn check_duplicates(&self, owner: &OwnerId, content: &str) -> Result<CmdResult> {
        commands::duplicate::run(&self.store, owner, content)
    }

    pub fn get_items(
        &self,
        owner: &OwnerId,
        filter: ItemFilter,
        page: Option<Page>,
    ) -> Result<CmdResult> {
        commands::get::run(&self.store, owner, filter, page)
    }

    pub fn due_items(&self, owner: &OwnerId, include_overdue: bool) -> Result<CmdResult> {
        commands::due::run(&self.store, owner, Utc::now(), include_overdue)
    }

    /// Records a review for one item by id.
    pub fn review_by_id(
        &mut self,
        owner: &OwnerId,
        item_id: Uuid,
        outcome: Option<Outcome>,
    ) -> Result<CmdResult> {
        let request = ReviewRequest::new(item_id, outcome);
        commands::review::run(
            &mut self.store,
            owner,
            self.config.policy,
            &[request],
            Utc::now(),
        )
    }

    /// Records the same outcome for every selected item.
    pub fn review_items<I: AsRef<str>>(
        &mut self,
        owner: &OwnerId,
        inputs: &[I],
        outcome: Option<Outcome>,
    ) -> Result<CmdResult> {
        let selectors = parse_selectors(inputs);
        let items = commands::helpers::items_by_selectors(&self.store, owner, &selectors)?;
        let requests: Vec<ReviewRequest> = items
            .iter()
            .map(|di| ReviewRequest::new(di.item.metadata.id, outcome))
            .collect();
        commands::review::run(
            &mut self.store,
            owner,
            self.config.policy,
            &requests,
            Utc::now(),
        )
    }

    pub fn view_items<I: AsRef<str>>(&self, owner: &OwnerId, inputs: &[I]) -> Result<CmdResult> {
        commands::view::run(&self.store, owner, &parse_selectors(inputs))
    }

    pub fn update_items(&mut self, owner: &OwnerId, updates: &[ItemUpdate]) -> Result<CmdResult> {
        commands::update::run(&mut self.store, owner, updates, Utc::now())
    }

    pub fn archive_items<I: AsRef<str>>(
        &mut self,
        owner: &OwnerId,
        inputs: &[I],
    ) -> Result<CmdResult> {
        commands::archive::archive(&mut self.store, owner, &parse_selectors(inputs), Utc::now())
    }

    pub fn unarchive_items<I: AsRef<str>>(
        &mut self,
        owner: &OwnerId,
        inputs: &[I],
    ) -> Result<CmdResult> {
        commands::archive::unarchive(&mut self.store, owner, &parse_selectors(inputs), Utc::now())
    }

    pub fn delete_items<I: AsRef<str>>(
        &mut self,
        owner: &OwnerId,
        inputs: &[I],
    ) -> Result<CmdResult> {
        commands::delete::run(&mut self.store, owner, &parse_selectors(inputs))
    }

    pub fn subjects(&mut self, owner: &OwnerId, action: SubjectAction) -> Result<CmdResult> {
        commands::subjects::run(&mut self.store, owner, action)
    }

    pub fn stats(&self, owner: &OwnerId) -> Result<CmdResult> {
        commands::stats::run(&self.store, owner, Utc::now())
    }

    pub fn export_items<I: AsRef<str>>(
        &self,
        owner: &OwnerId,
        inputs: &[I],
        out_dir: &Path,
    ) -> Result<CmdResult> {
        let selectors: Vec<ItemSelector> = if inputs.is_empty() {
            Vec::new()
        } else {
            parse_selectors(inputs)
        };
        commands::export::run(&self.store, owner, &selectors, out_dir, Utc::now())
    }

    pub fn config(&mut self, owner: &OwnerId, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.paths, &mut self.store, owner, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn init(&self) -> Result<CmdResult> {
        commands::init::run(&self.paths)
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.config.policy
    }

    pub fn file_ext(&self) -> &str {
        &self.config.file_ext
    }

    pub fn paths(&self) -> &commands::RecallPaths {
        &self.paths
    }
}

pub use commands::config::ConfigAction;
pub use commands::create::NewItem;
pub use commands::get::{ItemFilter, ItemStatusFilter, Page, Pagination};
pub use commands::review::ReviewRequest;
pub use commands::subjects::SubjectAction;
pub use commands::{CmdMessage, CmdResult, ItemUpdate, MessageLevel, RecallPaths, ReviewReceipt};
