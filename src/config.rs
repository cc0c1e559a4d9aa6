//! Document store connection configuration
//!
//! The configuration can come from a JSON file (the same shape as a Firebase
//! web app config, so `projectId`/`apiKey` are accepted) or from environment
//! variables, optionally seeded from a `.env` file.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PROJECT_ID: &str = "CDP_FIREBASE_PROJECT_ID";
pub const ENV_API_KEY: &str = "CDP_FIREBASE_API_KEY";
pub const ENV_DATABASE: &str = "CDP_FIREBASE_DATABASE";
pub const ENV_BASE_URL: &str = "CDP_FIREBASE_BASE_URL";

const DEFAULT_DATABASE: &str = "(default)";
const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Connection settings for the Firestore REST API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(alias = "projectId")]
    pub project_id: String,

    /// Web API key; optional for emulators and open databases
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,

    #[serde(default = "default_database")]
    pub database: String,

    /// REST endpoint root, e.g. `http://localhost:8080/v1` for the emulator
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FirebaseConfig {
    /// Creates a configuration for `project_id` with default settings
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            api_key: None,
            database: default_database(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Sets the API key (builder pattern)
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Sets the REST endpoint root (builder pattern)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&contents)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = lookup(ENV_PROJECT_ID)
            .ok_or_else(|| AppError::Config(format!("{} is not set", ENV_PROJECT_ID)))?;

        let mut config = Self::new(&project_id).with_api_key(lookup(ENV_API_KEY));
        if let Some(database) = lookup(ENV_DATABASE) {
            config.database = database;
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&base_url);
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(AppError::Config("project id must not be empty".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(AppError::Config("database must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Resource name of the database's document root
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([(ENV_PROJECT_ID, "cdp-seattle")]);
        let config = FirebaseConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.project_id, "cdp-seattle");
        assert_eq!(config.api_key, None);
        assert_eq!(config.database, "(default)");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            config.documents_root(),
            "projects/cdp-seattle/databases/(default)/documents"
        );
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PROJECT_ID, "demo"),
            (ENV_API_KEY, "key-123"),
            (ENV_BASE_URL, "http://localhost:8080/v1/"),
        ]);
        let config = FirebaseConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_from_lookup_requires_project() {
        let err = FirebaseConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_from_json_file_accepts_web_config_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebase.json");
        std::fs::write(&path, r#"{"projectId": "cdp-king-county", "apiKey": "abc"}"#).unwrap();

        let config = FirebaseConfig::from_json_file(&path).unwrap();
        assert_eq!(config.project_id, "cdp-king-county");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_json_file_trims_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebase.json");
        std::fs::write(
            &path,
            r#"{"projectId": "demo", "base_url": "http://localhost:8080/v1/"}"#,
        )
        .unwrap();

        let config = FirebaseConfig::from_json_file(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_from_json_file_rejects_empty_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebase.json");
        std::fs::write(&path, r#"{"project_id": " "}"#).unwrap();

        assert!(matches!(
            FirebaseConfig::from_json_file(&path),
            Err(AppError::Config(_))
        ));
    }
}
