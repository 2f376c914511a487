//! Configuration file loading for vellum.
//!
//! Reads `vellum.config.json` from the project root, or the file passed with
//! `--config`. Every field is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vellum_croquis::AnalyzerOptions;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "vellum.config.json";

/// Top-level vellum configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VellumConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema")]
    pub schema: Option<String>,

    /// Scanner and resolver settings.
    pub analyzer: AnalyzerOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load configuration.
///
/// An explicit path must exist and parse. Without one, `vellum.config.json`
/// in `root` is used when present and defaults otherwise.
pub fn load_config(explicit: Option<&Path>, root: &Path) -> Result<VellumConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = root.join(CONFIG_FILE);
            if !path.exists() {
                return Ok(VellumConfig::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_implicit_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.analyzer, AnalyzerOptions::default());
        assert!(config.schema.is_none());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "analyzer": { "maxChainDepth": 8, "legacyElements": false } }"#,
        )
        .unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.analyzer.max_chain_depth, 8);
        assert!(!config.analyzer.legacy_elements);
        assert!(config.analyzer.behaviors);
        assert_eq!(
            config.analyzer.global_prefixes,
            AnalyzerOptions::default().global_prefixes
        );
    }

    #[test]
    fn test_explicit_config_must_exist_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_config(Some(&missing), dir.path()),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ analyzer: ").unwrap();
        assert!(matches!(
            load_config(Some(&broken), dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
