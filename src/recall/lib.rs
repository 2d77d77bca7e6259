//! # Recall Architecture
//!
//! Recall is a **UI-agnostic spaced-repetition library**: users add study items,
//! review them, and the library decides when each item comes back. The
//! command-line binary is one client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Normalizes inputs (selectors, clock, policy)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic, one module per operation                 │
//! │  - review.rs drives the scheduler                           │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                           │
//!                  ▼                           ▼
//! ┌───────────────────────────────┐ ┌──────────────────────────┐
//! │  Storage Layer (store/)       │ │  Scheduler (scheduler.rs)│
//! │  - DataStore trait            │ │  - pure, no I/O          │
//! │  - FileStore, InMemoryStore   │ │  - repetition flows      │
//! └───────────────────────────────┘ └──────────────────────────┘
//! ```
//!
//! ## Scheduling
//!
//! Each item carries a review count and a next review date. Recording a
//! review asks [`scheduler::record_review`] for the next interval from the
//! owner's repetition flow, then commits the result with a conditional
//! store update so concurrent reviews cannot both land. See the
//! [`scheduler`] module for the two selectable policies.
//!
//! ## Indexes
//!
//! Users refer to items by short display indexes (`1`, `2`, `a1` for
//! archived), which map to stable UUIDs at the store level. See [`index`].
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns
//! `Result<CmdResult>`. It never writes to stdout/stderr and never exits the
//! process. Diagnostics go through the `log` facade; the binary decides
//! where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`scheduler`]: Review interval computation
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`ContentItem`, `Metadata`, `UserProfile`)
//! - [`index`]: Display indexing and selectors
//! - [`config`]: Configuration management
//! - [`editor`]: External editor integration
//! - [`init`]: Locating the store and the current owner
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod index;
pub mod init;
pub mod model;
pub mod scheduler;
pub mod store;
