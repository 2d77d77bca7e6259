use crate::error::Result;
use crate::scheduler::SchedulingPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_FILE_EXT: &str = ".md";

/// Configuration for recall, stored in `<store>/config.json`.
///
/// Per-user settings (repetition flow, subjects) live in the user profile,
/// not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecallConfig {
    /// File extension for item bodies (e.g. ".md", ".txt")
    #[serde(default = "default_file_ext")]
    pub file_ext: String,

    /// How review outcomes pick the next interval.
    #[serde(default)]
    pub policy: SchedulingPolicy,

    /// Owner used when neither `--user` nor `RECALL_USER` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

fn default_file_ext() -> String {
    DEFAULT_FILE_EXT.to_string()
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            file_ext: default_file_ext(),
            policy: SchedulingPolicy::default(),
            user: None,
        }
    }
}

impl RecallConfig {
    pub const KEYS: [&'static str; 3] = ["file-ext", "policy", "user"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn exists<P: AsRef<Path>>(config_dir: P) -> bool {
        config_dir.as_ref().join(CONFIG_FILENAME).exists()
    }

    /// Set the file extension (normalizes to start with a dot)
    pub fn set_file_ext(&mut self, ext: &str) {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "file-ext" => Some(self.file_ext.clone()),
            "policy" => Some(self.policy.to_string()),
            "user" => Some(self.user.clone().unwrap_or_default()),
            _ => None,
        }
    }

    /// Validates and applies a value. Nothing changes on error.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        match key {
            "file-ext" => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(format!("Invalid file extension: {}", value));
                }
                self.set_file_ext(ext);
                Ok(())
            }
            "policy" => {
                self.policy = value.parse()?;
                Ok(())
            }
            "user" => {
                self.user = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
                Ok(())
            }
            _ => Err(format!("Unknown config key: {}", key)),
        }
    }

    pub fn list_all(&self) -> Vec<(String, String)> {
        Self::KEYS
            .iter()
            .filter_map(|k| self.get(k).map(|v| (k.to_string(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = RecallConfig::default();
        assert_eq!(config.file_ext, ".md");
        assert_eq!(config.policy, SchedulingPolicy::DifficultyAdjusted);
        assert!(config.user.is_none());
    }

    #[test]
    fn test_set_file_ext() {
        let mut config = RecallConfig::default();
        config.set("file-ext", "txt").unwrap();
        assert_eq!(config.file_ext, ".txt");
        config.set("file-ext", ".org").unwrap();
        assert_eq!(config.file_ext, ".org");
        assert!(config.set("file-ext", "a/b").is_err());
        assert_eq!(config.file_ext, ".org");
    }

    #[test]
    fn test_set_policy() {
        let mut config = RecallConfig::default();
        config.set("policy", "fixed-count").unwrap();
        assert_eq!(config.policy, SchedulingPolicy::FixedCount);
        assert_eq!(config.get("policy").as_deref(), Some("fixed-count"));
        assert!(config.set("policy", "chaos").is_err());
        assert_eq!(config.policy, SchedulingPolicy::FixedCount);
    }

    #[test]
    fn test_unknown_key() {
        let mut config = RecallConfig::default();
        assert!(config.get("colour").is_none());
        assert!(config.set("colour", "red").is_err());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempdir().unwrap();
        let config = RecallConfig::load(dir.path().join("nowhere")).unwrap();
        assert_eq!(config, RecallConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = RecallConfig::default();
        config.set("user", "ana").unwrap();
        config.set("policy", "fixed").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = RecallConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
        assert!(RecallConfig::exists(dir.path()));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: RecallConfig = serde_json::from_str(r#"{"user":"ana"}"#).unwrap();
        assert_eq!(parsed.file_ext, ".md");
        assert_eq!(parsed.policy, SchedulingPolicy::DifficultyAdjusted);
        assert_eq!(parsed.user.as_deref(), Some("ana"));
    }

    #[test]
    fn test_list_all() {
        let keys: Vec<String> = RecallConfig::default()
            .list_all()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["file-ext", "policy", "user"]);
    }
}
