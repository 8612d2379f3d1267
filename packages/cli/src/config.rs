use bdoc_common::OffsetType;
use bdoc_editor::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "bdoc.config.json";

/// Bdoc configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Policy for annotation ids that already exist in the target
    pub conflict_policy: ConflictPolicy,

    /// Offset convention of written snapshots ("j" or "p")
    pub offset_type: OffsetType,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conflict_policy: ConflictPolicy::AddWithNewId,
            offset_type: OffsetType::CodeUnit,
            pretty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "conflictPolicy": "update_features",
            "offsetType": "p",
            "pretty": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.conflict_policy, ConflictPolicy::UpdateFeatures);
        assert_eq!(config.offset_type, OffsetType::CodePoint);
        assert!(!config.pretty);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"pretty": false}"#).unwrap();
        assert_eq!(config.conflict_policy, ConflictPolicy::AddWithNewId);
        assert_eq!(config.offset_type, OffsetType::CodeUnit);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.conflict_policy, ConflictPolicy::AddWithNewId);
        assert_eq!(config.offset_type, OffsetType::CodeUnit);
        assert!(config.pretty);
    }

    #[test]
    fn test_load_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        assert_eq!(Config::load(&cwd).unwrap(), Config::default());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{"conflictPolicy": "ignore"}"#,
        )
        .unwrap();
        assert_eq!(Config::load(&cwd).unwrap().conflict_policy, ConflictPolicy::Ignore);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"conflictPolicy": "merge"}"#);
        assert!(result.is_err());
    }
}
