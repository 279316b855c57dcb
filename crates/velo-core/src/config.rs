use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decision_tree::DecisionTree;
use crate::error::ConfigError;
use crate::quick_actions::QuickAction;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
pub const ENDPOINT_ENV: &str = "VELO_ENDPOINT";

fn default_require_consent() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_require_consent")]
    pub require_consent: bool,
    #[serde(default)]
    pub consent_given: bool,
    #[serde(default)]
    pub decision_tree_path: Option<PathBuf>,
    #[serde(default)]
    pub quick_actions: Option<Vec<QuickAction>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            require_consent: true,
            consent_given: false,
            decision_tree_path: None,
            quick_actions: None,
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// `VELO_ENDPOINT` first, then the file, then [`DEFAULT_ENDPOINT`].
    pub fn endpoint(&self) -> String {
        resolve_endpoint(std::env::var(ENDPOINT_ENV).ok(), self.endpoint.as_deref())
    }

    /// The configured tree file, or the built-in questionnaire.
    pub fn decision_tree(&self) -> Result<DecisionTree, ConfigError> {
        match &self.decision_tree_path {
            Some(path) => DecisionTree::load(path),
            None => Ok(DecisionTree::builtin()?),
        }
    }

    pub fn quick_actions(&self) -> Vec<QuickAction> {
        self.quick_actions
            .clone()
            .unwrap_or_else(QuickAction::builtin)
    }

    /// Directory holding the settings file and the log file.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("velo-chat"))
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

fn resolve_endpoint(from_env: Option<String>, from_file: Option<&str>) -> String {
    from_env
        .filter(|value| !value.trim().is_empty())
        .or_else(|| from_file.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert!(config.require_consent);
        assert!(!config.consent_given);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.endpoint = Some("http://shop.local:9000".into());
        config.consent_given = true;
        config.quick_actions = Some(vec![QuickAction::new("Test", "Eine Frage")]);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.quick_actions().len(), 1);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "endpoint": "http://x" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.require_consent);
        assert_eq!(config.quick_actions(), QuickAction::builtin());
    }

    #[test]
    fn test_endpoint_resolution_order() {
        assert_eq!(
            resolve_endpoint(Some("http://env".into()), Some("http://file")),
            "http://env"
        );
        assert_eq!(resolve_endpoint(Some("  ".into()), Some("http://file")), "http://file");
        assert_eq!(resolve_endpoint(None, None), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_decision_tree_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        fs::write(
            &path,
            r#"{ "start": "a", "nodes": [
                { "id": "a", "title": "A?", "options": [ { "value": "x", "label": "X" } ] }
            ]}"#,
        )
        .unwrap();

        let mut config = Config::new();
        config.decision_tree_path = Some(path);
        assert!(matches!(config.decision_tree(), Err(ConfigError::Tree(_))));

        config.decision_tree_path = None;
        assert!(config.decision_tree().is_ok());
    }
}
