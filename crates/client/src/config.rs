use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENDPOINT_VAR: &str = "GRAPHQL_ENDPOINT";
pub const API_KEY_VAR: &str = "GRAPHQL_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required setting {0}; set it in the environment or the [graphql] section of the config file")]
    Missing(&'static str),
    #[error("{ENDPOINT_VAR} must be an absolute http(s) URL, got {0:?}")]
    InvalidEndpoint(String),
    #[error("page_size_options must not be empty")]
    NoPageSizes,
    #[error("default_page_size {0} is not one of page_size_options")]
    DefaultPageSizeNotOffered(usize),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub graphql: GraphQlConfig,
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphQlConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_page_size_options() -> Vec<usize> {
    vec![10, 25, 50]
}

fn default_search_debounce_ms() -> u64 {
    300
}

impl GraphQlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ListConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&s).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overlays `GRAPHQL_ENDPOINT` / `GRAPHQL_API_KEY` from the process
    /// environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_VAR).filter(|v| !v.trim().is_empty()) {
            self.graphql.endpoint = endpoint;
        }
        if let Some(api_key) = lookup(API_KEY_VAR).filter(|v| !v.trim().is_empty()) {
            self.graphql.api_key = api_key;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.graphql.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Missing(ENDPOINT_VAR));
        }
        match Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidEndpoint(endpoint.to_string())),
        }
        if self.graphql.api_key.trim().is_empty() {
            return Err(ConfigError::Missing(API_KEY_VAR));
        }
        if self.list.page_size_options.is_empty() {
            return Err(ConfigError::NoPageSizes);
        }
        if !self.list.page_size_options.contains(&self.list.default_page_size) {
            return Err(ConfigError::DefaultPageSizeNotOffered(self.list.default_page_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut cfg = Config::default();
        cfg.graphql.endpoint = "https://api.example.com/graphql".into();
        cfg.graphql.api_key = "da2-key".into();
        cfg
    }

    #[test]
    fn test_defaults_match_list_page() {
        let cfg = Config::default();
        assert_eq!(cfg.list.default_page_size, 10);
        assert_eq!(cfg.list.page_size_options, vec![10, 25, 50]);
        assert_eq!(cfg.list.search_debounce(), Duration::from_millis(300));
        assert_eq!(cfg.graphql.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parses_partial_toml() {
        let cfg: Config = toml::from_str(
            r#"
            [graphql]
            endpoint = "http://localhost:4000/graphql"

            [list]
            search_debounce_ms = 150
            "#,
        )
        .unwrap();
        assert_eq!(cfg.graphql.endpoint, "http://localhost:4000/graphql");
        assert_eq!(cfg.graphql.timeout_secs, 30);
        assert_eq!(cfg.list.search_debounce_ms, 150);
        assert_eq!(cfg.list.default_page_size, 10);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut cfg = valid();
        cfg.apply_env_with(|key| match key {
            ENDPOINT_VAR => Some("http://override/graphql".into()),
            API_KEY_VAR => Some(" ".into()),
            _ => None,
        });
        assert_eq!(cfg.graphql.endpoint, "http://override/graphql");
        assert_eq!(cfg.graphql.api_key, "da2-key");
    }

    #[test]
    fn test_missing_values_name_the_variable() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENDPOINT_VAR)));
        assert!(err.to_string().contains("GRAPHQL_ENDPOINT"));

        let mut cfg = valid();
        cfg.graphql.api_key.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::Missing(API_KEY_VAR))));
    }

    #[test]
    fn test_rejects_bad_endpoint_and_page_sizes() {
        let mut cfg = valid();
        cfg.graphql.endpoint = "ftp://example.com".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidEndpoint(_))));

        let mut cfg = valid();
        cfg.list.default_page_size = 20;
        assert!(matches!(cfg.validate(), Err(ConfigError::DefaultPageSizeNotOffered(20))));

        let mut cfg = valid();
        cfg.list.page_size_options.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::NoPageSizes)));

        assert!(valid().validate().is_ok());
    }
}
