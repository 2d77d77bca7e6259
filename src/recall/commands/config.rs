use crate::commands::{CmdMessage, CmdResult, RecallPaths};
use crate::config::RecallConfig;
use crate::error::Result;
use crate::model::OwnerId;
use crate::scheduler::RepetitionFlow;
use crate::store::DataStore;
use chrono::Utc;

use super::helpers::load_profile;

/// Per-user key, stored in the owner's profile rather than config.json.
pub const FLOW_KEY: &str = "repetition-flow";

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run<S: DataStore>(
    paths: &RecallPaths,
    store: &mut S,
    owner: &OwnerId,
    action: ConfigAction,
) -> Result<CmdResult> {
    let mut config = RecallConfig::load(&paths.root)?;

    match action {
        ConfigAction::ShowAll => Ok(CmdResult::default()
            .with_config(config)
            .with_profile(load_profile(store, owner)?)),
        ConfigAction::ShowKey(key) => {
            let mut result = CmdResult::default();
            let value = if key == FLOW_KEY {
                Some(load_profile(store, owner)?.flow().to_string())
            } else {
                config.get(&key)
            };
            match value {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) if key == FLOW_KEY => {
            let mut result = CmdResult::default();
            let value = value.trim();
            let flow = if value.eq_ignore_ascii_case("default") {
                None
            } else {
                match value.parse::<RepetitionFlow>() {
                    Ok(flow) => Some(flow),
                    Err(e) => {
                        result.add_message(CmdMessage::error(e.to_string()));
                        return Ok(result);
                    }
                }
            };
            let profile = store.update_profile(owner, |profile| {
                profile.repetition_flow = flow;
                profile.updated_at = Utc::now();
                Ok(())
            })?;
            log::info!("repetition flow for {} set to {}", owner, profile.flow());

            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                FLOW_KEY,
                profile.flow()
            )));
            Ok(result.with_profile(profile))
        }
        ConfigAction::Set(key, value) => {
            if let Err(e) = config.set(&key, &value) {
                let mut res = CmdResult::default();
                res.add_message(CmdMessage::error(e));
                return Ok(res);
            }
            config.save(&paths.root)?;

            let display_val = config.get(&key).unwrap_or(value);
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}
