//! Configuration loader and validator for the remote document-and-file store.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::storage::StorageIds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub service: Service,
    pub content: Content,
}

/// Remote service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
}

/// Where posts and their featured images live on the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    pub database_id: String,
    pub collection_id: String,
    pub bucket_id: String,
}

impl Config {
    /// The database/collection/bucket triple the storage client addresses.
    pub fn storage_ids(&self) -> StorageIds {
        StorageIds {
            database_id: self.content.database_id.clone(),
            collection_id: self.content.collection_id.clone(),
            bucket_id: self.content.bucket_id.clone(),
        }
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.service.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid("service.endpoint must be non-empty"));
    }
    if reqwest::Url::parse(&cfg.service.endpoint).is_err() {
        return Err(ConfigError::Invalid("service.endpoint must be a valid URL"));
    }
    if cfg.service.project_id.trim().is_empty() {
        return Err(ConfigError::Invalid("service.project_id must be non-empty"));
    }
    if cfg.service.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid("service.api_key must be non-empty"));
    }

    if cfg.content.database_id.trim().is_empty() {
        return Err(ConfigError::Invalid("content.database_id must be non-empty"));
    }
    if cfg.content.collection_id.trim().is_empty() {
        return Err(ConfigError::Invalid("content.collection_id must be non-empty"));
    }
    if cfg.content.bucket_id.trim().is_empty() {
        return Err(ConfigError::Invalid("content.bucket_id must be non-empty"));
    }

    Ok(())
}

/// Example YAML configuration, kept in sync with the schema above.
pub fn example() -> &'static str {
    r#"service:
  endpoint: "https://store.example.com"
  project_id: "YOUR_PROJECT_ID"
  api_key: "YOUR_API_KEY"

content:
  database_id: "POSTS_DATABASE_ID"
  collection_id: "POSTS_COLLECTION_ID"
  bucket_id: "IMAGES_BUCKET_ID"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
    }

    #[test]
    fn invalid_endpoint() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.service.endpoint = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("service.endpoint")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.service.endpoint = "not a url".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("valid URL")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_credentials() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.service.project_id = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("project_id")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.service.api_key = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_content_ids() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.content.database_id = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("database_id")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.content.collection_id = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.content.bucket_id = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn storage_ids_come_from_content_section() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        let ids = cfg.storage_ids();
        assert_eq!(ids.database_id, "POSTS_DATABASE_ID");
        assert_eq!(ids.collection_id, "POSTS_COLLECTION_ID");
        assert_eq!(ids.bucket_id, "IMAGES_BUCKET_ID");
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(example().as_bytes()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.service.project_id, "YOUR_PROJECT_ID");
    }
}
