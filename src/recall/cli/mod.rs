//! # CLI Layer
//!
//! One client of the recall library. This is the only place that knows about
//! terminal I/O, argument parsing and exit codes.
//!
//! - `setup`: clap definitions and grouped help
//! - `commands`: `run()` and the per-command handlers
//! - `print`: turning a `CmdResult` into terminal output
//!
//! Business logic is not tested here; that belongs to the command layer.

mod commands;
mod print;
mod setup;

pub use commands::run;
