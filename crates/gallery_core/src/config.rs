//! Runtime configuration for gallery hosts.
//!
//! # Responsibility
//! - Hold the store location and logging settings in one value.
//! - Read overrides from `GALLERY_*` environment variables.
//!
//! # Invariants
//! - `log_level` is always a value accepted by `logging::normalize_level`,
//!   whether it came from defaults, the environment or deserialization.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

pub const DEFAULT_DB_FILE: &str = "Gallery.sqlite";
pub const ENV_DB_PATH: &str = "GALLERY_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "GALLERY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GALLERY_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub db_path: PathBuf,
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl GalleryConfig {
    /// Builds a config from defaults plus `GALLERY_*` overrides.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let mut config = Self::default();
        if let Some(path) = non_blank(lookup(ENV_DB_PATH)) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = normalize_level(&level)?.to_string();
        }
        if let Some(dir) = non_blank(lookup(ENV_LOG_DIR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }
}

fn deserialize_log_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = String::deserialize(deserializer)?;
    normalize_level(&raw)
        .map(str::to_string)
        .map_err(serde::de::Error::custom)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{GalleryConfig, DEFAULT_DB_FILE, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::LoggingError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_gallery_file() {
        let config = GalleryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_are_trimmed_and_normalized() {
        let config = GalleryConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /tmp/g.sqlite "),
            (ENV_LOG_LEVEL, "WARNING"),
            (ENV_LOG_DIR, "/tmp/gallery-logs"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/g.sqlite"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/gallery-logs")));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = GalleryConfig::from_lookup(lookup_from(&[(ENV_LOG_LEVEL, "chatty")]))
            .unwrap_err();
        assert!(matches!(err, LoggingError::UnsupportedLevel(_)));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GalleryConfig =
            serde_json::from_str(r#"{"db_path": "/data/gallery.sqlite"}"#).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/gallery.sqlite"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn json_level_is_normalized() {
        let config: GalleryConfig = serde_json::from_str(r#"{"log_level": "WARNING"}"#).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn json_with_unknown_level_is_rejected() {
        let err = serde_json::from_str::<GalleryConfig>(r#"{"log_level": "chatty"}"#).unwrap_err();
        assert!(err.to_string().contains("chatty"));
    }
}
