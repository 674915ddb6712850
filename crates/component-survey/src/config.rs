use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ComponentError;
use crate::session::SUCCESS_ROUTE;
use crate::store::{DEFAULT_COLLECTION, JsonlStore};

/// Environment variable that overrides [`ComponentConfig::store_dir`].
pub const STORE_DIR_ENV: &str = "SURVEY_STORE_DIR";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComponentConfig {
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_success_route")]
    pub success_route: String,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_success_route() -> String {
    SUCCESS_ROUTE.to_string()
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            collection: default_collection(),
            success_route: default_success_route(),
        }
    }
}

impl ComponentConfig {
    /// Parses a JSON config; blank input yields the defaults.
    pub fn from_json(config_json: &str) -> Result<Self, ComponentError> {
        if config_json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }

    /// Reads `path` when given, then applies the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ComponentError> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ComponentError::ConfigRead {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        Ok(config.with_store_override(std::env::var(STORE_DIR_ENV).ok()))
    }

    pub fn with_store_override(mut self, store_dir: Option<String>) -> Self {
        if let Some(dir) = store_dir.filter(|dir| !dir.trim().is_empty()) {
            self.store_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn jsonl_store(&self) -> JsonlStore {
        JsonlStore::new(self.store_dir(), self.collection.clone())
    }
}
