// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration for a runtime state

use crate::error::{NodeError, Result};
use crate::logging::DEFAULT_FILTER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`RuntimeConfig::dirname`]
pub const ENV_DIRNAME: &str = "TETHER_DIRNAME";
/// Environment variable overriding [`RuntimeConfig::entry`]
pub const ENV_ENTRY: &str = "TETHER_ENTRY";
/// Environment variable overriding [`RuntimeConfig::log_filter`]
pub const ENV_LOG: &str = "TETHER_LOG";
/// Environment variable overriding [`RuntimeConfig::preload_bindings`]
/// (comma separated)
pub const ENV_PRELOAD: &str = "TETHER_PRELOAD";

/// Configuration for a runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory for resolving relative specifiers
    pub dirname: Option<PathBuf>,

    /// Entry script; its parent directory is used when `dirname` is unset
    pub entry: Option<PathBuf>,

    /// `tracing` filter directive
    pub log_filter: String,

    /// Bindings to install during bootstrap, besides the eager ones
    pub preload_bindings: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            dirname: None,
            entry: None,
            log_filter: DEFAULT_FILTER.to_string(),
            preload_bindings: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Configuration for running `entry`
    pub fn for_entry(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: Some(entry.into()),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file, then apply the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_json_file(path)?;
        config.load_from_env();
        Ok(config)
    }

    /// Parse configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn load_from_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dirname) = lookup(ENV_DIRNAME).filter(|v| !v.is_empty()) {
            self.dirname = Some(PathBuf::from(dirname));
        }

        if let Some(entry) = lookup(ENV_ENTRY).filter(|v| !v.is_empty()) {
            self.entry = Some(PathBuf::from(entry));
        }

        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_filter = filter;
        }

        if let Some(preload) = lookup(ENV_PRELOAD) {
            self.preload_bindings = preload
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Install the global subscriber with [`RuntimeConfig::log_filter`].
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init_logging(&self) -> bool {
        crate::logging::init(&self.log_filter)
    }

    /// Directory used by the runtime state: `dirname`, else the entry's
    /// parent directory, else `.`.
    pub fn resolve_dirname(&self) -> String {
        if let Some(dirname) = &self.dirname {
            return dirname.to_string_lossy().into_owned();
        }

        self.entry
            .as_deref()
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(|parent| parent.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string())
    }

    fn validate(&self) -> Result<()> {
        if let Some(name) = self.preload_bindings.iter().find(|name| name.trim().is_empty()) {
            return Err(NodeError::Config(format!(
                "empty binding name in preload_bindings: {:?}",
                name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.log_filter, DEFAULT_FILTER);
        assert_eq!(config.resolve_dirname(), ".");
    }

    #[test]
    fn test_dirname_from_entry() {
        let config = RuntimeConfig::for_entry("/app/server.js");
        assert_eq!(config.resolve_dirname(), "/app");

        let bare = RuntimeConfig::for_entry("server.js");
        assert_eq!(bare.resolve_dirname(), ".");
    }

    #[test]
    fn test_explicit_dirname_wins() {
        let mut config = RuntimeConfig::for_entry("/app/server.js");
        config.dirname = Some(PathBuf::from("/srv"));
        assert_eq!(config.resolve_dirname(), "/srv");
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [
            (ENV_ENTRY, "/work/main.js"),
            (ENV_LOG, "tether_node=debug"),
            (ENV_PRELOAD, "fs, os,,"),
        ]
        .into_iter()
        .collect();

        let mut config = RuntimeConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.entry, Some(PathBuf::from("/work/main.js")));
        assert_eq!(config.log_filter, "tether_node=debug");
        assert_eq!(config.preload_bindings, vec!["fs".to_string(), "os".to_string()]);
        assert_eq!(config.resolve_dirname(), "/work");
    }

    #[test]
    fn test_from_json_str_partial() {
        let config = RuntimeConfig::from_json_str(r#"{ "dirname": "/app" }"#).unwrap();
        assert_eq!(config.dirname, Some(PathBuf::from("/app")));
        assert_eq!(config.log_filter, DEFAULT_FILTER);
    }

    #[test]
    fn test_from_json_str_rejects_blank_binding() {
        let err = RuntimeConfig::from_json_str(r#"{ "preload_bindings": ["fs", " "] }"#).unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "entry": "/app/index.js", "preload_bindings": ["crypto"] }}"#).unwrap();

        let config = RuntimeConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.resolve_dirname(), "/app");
        assert_eq!(config.preload_bindings, vec!["crypto".to_string()]);
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuntimeConfig::from_json_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, NodeError::Fs(_)));
    }

    #[test]
    fn test_init_logging_once() {
        let config = RuntimeConfig::from_json_str(r#"{ "log_filter": "tether_node=trace" }"#).unwrap();
        config.init_logging();
        assert!(!config.init_logging());
    }

    #[test]
    fn test_invalid_json() {
        let err = RuntimeConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, NodeError::JsonParse(_)));
    }
}
