use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

pub const DEFAULT_INDEX: &str = "default";
const DEFAULT_URL: &str = "http://localhost:9200";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("There's no index called `{index}`, the available ones are: {}.", .available.join(", "))]
    UnknownIndex {
        index: String,
        available: Vec<String>,
    },
    #[error("You cannot initialize a queryset without a configuration object.")]
    Missing,
}

/// Where an index lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(alias = "URL")]
    pub url: String,
}

impl Connection {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Connections keyed by index name
    pub connections: BTreeMap<String, Connection>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            connections: BTreeMap::from([(
                DEFAULT_INDEX.to_string(),
                Connection::new(DEFAULT_URL),
            )]),
        }
    }
}

impl SearchConfig {
    pub fn empty() -> Self {
        Self {
            connections: BTreeMap::new(),
        }
    }

    pub fn with_connection(mut self, index: impl Into<String>, url: impl Into<String>) -> Self {
        self.connections.insert(index.into(), Connection::new(url));
        self
    }

    pub fn indexes(&self) -> Vec<&str> {
        self.connections.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Look up the connection serving `index`
    pub fn resolve(&self, index: &str) -> Result<&Connection, ConfigError> {
        self.connections
            .get(index)
            .ok_or_else(|| ConfigError::UnknownIndex {
                index: index.to_string(),
                available: self.connections.keys().cloned().collect(),
            })
    }
}

pub fn load_config(path: Option<&Path>) -> Result<SearchConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<SearchConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<SearchConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static SearchConfig {
    static DEFAULT_CONFIG: LazyLock<SearchConfig> = LazyLock::new(SearchConfig::default);
    &DEFAULT_CONFIG
}
