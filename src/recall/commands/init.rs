use crate::commands::{CmdMessage, CmdResult, RecallPaths};
use crate::config::RecallConfig;
use crate::error::Result;
use std::fs;

/// Creates the store directory and a default config. Safe to re-run.
pub fn run(paths: &RecallPaths) -> Result<CmdResult> {
    fs::create_dir_all(&paths.root)?;

    let mut result = CmdResult::default();
    if RecallConfig::exists(&paths.root) {
        result.add_message(CmdMessage::info(format!(
            "Store already initialized at {}",
            paths.root.display()
        )));
        return Ok(result.with_config(RecallConfig::load(&paths.root)?));
    }

    let config = RecallConfig::default();
    config.save(&paths.root)?;
    result.add_message(CmdMessage::success(format!(
        "Initialized recall store at {}",
        paths.root.display()
    )));
    Ok(result.with_config(config))
}
