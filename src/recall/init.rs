use crate::api::{RecallApi, RecallPaths};
use crate::config::RecallConfig;
use crate::error::{RecallError, Result};
use crate::model::OwnerId;
use crate::store::fs::FileStore;
use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

pub const HOME_ENV: &str = "RECALL_HOME";
pub const USER_ENV: &str = "RECALL_USER";
pub const DEFAULT_OWNER: &str = "default";

pub struct RecallContext {
    pub api: RecallApi<FileStore>,
    pub owner: OwnerId,
    pub config: RecallConfig,
}

/// Store root: `$RECALL_HOME` if set, else the platform data directory.
pub fn store_root() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "recall", "recall")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            RecallError::Store(format!(
                "Could not determine a data directory, set {}",
                HOME_ENV
            ))
        })
}

/// Picks the owner: explicit flag, `$RECALL_USER`, config `user`, the login
/// name, then [`DEFAULT_OWNER`].
pub fn resolve_owner(explicit: Option<&str>, config: &RecallConfig) -> OwnerId {
    let from_env = |key: &str| env::var(key).ok();
    let candidates = [
        explicit.map(str::to_string),
        from_env(USER_ENV),
        config.user.clone(),
        from_env("USER"),
        from_env("USERNAME"),
    ];
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .map(OwnerId::new)
        .unwrap_or_else(|| OwnerId::new(DEFAULT_OWNER))
}

pub fn initialize(user: Option<&str>) -> Result<RecallContext> {
    let root = store_root()?;
    let config = RecallConfig::load(&root)?;
    let owner = resolve_owner(user, &config);
    log::debug!("store at {}, owner {}", root.display(), owner);

    let store = FileStore::new(root.clone()).with_file_ext(&config.file_ext);
    let api = RecallApi::new(store, RecallPaths::new(root), config.clone());

    Ok(RecallContext { api, owner, config })
}
