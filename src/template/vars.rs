//! Variable mappings supplied at render time
//!
//! A [`VariableMap`] is assembled from up to three sources, later sources
//! overriding earlier ones:
//!
//! 1. a YAML variables file (flat mapping of scalars)
//! 2. environment variables prefixed with [`ENV_PREFIX`]
//! 3. explicit `key=value` pairs, usually from the command line

use super::parser::is_valid_name;
use crate::error::{ComposeKitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Prefix for environment-sourced variables
pub const ENV_PREFIX: &str = "COMPOSEKIT_VAR_";

/// Default variables file name inside the config directory
pub const DEFAULT_VARS_FILE: &str = "vars.yaml";

/// Mapping from placeholder name to substituted value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableMap {
    vars: BTreeMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable, returning the previous value if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Overlay another map on top of this one
    pub fn merge(&mut self, overlay: VariableMap) {
        for (name, value) in overlay.vars {
            if let Some(previous) = self.vars.insert(name.clone(), value) {
                tracing::debug!("Variable '{}' overrides earlier value '{}'", name, previous);
            }
        }
    }

    /// Load a flat YAML mapping of scalar values
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(content)
            .map_err(|e| ComposeKitError::Yaml(format!("Failed to parse variables: {}", e)))?;

        let mut map = Self::new();
        for (name, value) in raw {
            check_name(&name)?;
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(ComposeKitError::InvalidConfig(format!(
                        "Variable '{}' must be a string, number or boolean",
                        name
                    )))
                }
            };
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Load a variables file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ComposeKitError::InvalidConfig(format!(
                "Failed to read variables file {}: {}",
                path.display(),
                e
            ))
        })?;
        let map = Self::from_yaml_str(&content)?;
        tracing::debug!("Loaded {} variables from {}", map.len(), path.display());
        Ok(map)
    }

    /// Collect `COMPOSEKIT_VAR_*` entries, lowercasing the suffix.
    ///
    /// Entries without the prefix are skipped whatever their encoding; a
    /// prefixed entry that is not valid UTF-8 is rejected.
    pub fn from_env_iter<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut map = Self::new();
        for (key, value) in vars {
            let key: OsString = key.into();
            let value: OsString = value.into();
            if !key.to_string_lossy().starts_with(ENV_PREFIX) {
                continue;
            }

            let (key, value) = match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => (key, value),
                (key, _) => {
                    return Err(ComposeKitError::InvalidConfig(format!(
                        "Environment variable {} is not valid UTF-8",
                        key.unwrap_or_else(|k| k.to_string_lossy().into_owned())
                    )))
                }
            };

            let name = key[ENV_PREFIX.len()..].to_lowercase();
            check_name(&name)?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Collect variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_iter(std::env::vars_os())
    }

    /// Parse `key=value` pairs
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut map = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ComposeKitError::InvalidConfig(format!(
                    "Expected key=value, got '{}'",
                    pair
                ))
            })?;
            let key = key.trim();
            check_name(key)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ComposeKitError::InvalidConfig(format!(
            "Invalid variable name '{}'",
            name
        )))
    }
}

/// Default variables file location, `<config_dir>/composekit/vars.yaml`
pub fn default_vars_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("composekit").join(DEFAULT_VARS_FILE))
}

/// Where to look for variables
#[derive(Debug, Clone, Default)]
pub struct VariableSources {
    /// Explicit variables file; the default location is used when unset
    pub vars_file: Option<PathBuf>,
    /// Read `COMPOSEKIT_VAR_*` from the environment
    pub use_env: bool,
    /// `key=value` pairs, highest precedence
    pub pairs: Vec<String>,
}

impl VariableSources {
    /// Build the merged variable map
    pub fn load(&self) -> Result<VariableMap> {
        let mut map = VariableMap::new();

        match &self.vars_file {
            Some(path) => map.merge(VariableMap::from_file(path)?),
            None => {
                if let Some(path) = default_vars_path().filter(|p| p.exists()) {
                    map.merge(VariableMap::from_file(&path)?);
                }
            }
        }

        if self.use_env {
            map.merge(VariableMap::from_env()?);
        }

        map.merge(VariableMap::from_pairs(&self.pairs)?);
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_scalars() {
        let map = VariableMap::from_yaml_str(
            "app_data_base_path: /srv/data\nreplicas: 3\nenabled: true\n",
        )
        .unwrap();
        assert_eq!(map.get("app_data_base_path"), Some("/srv/data"));
        assert_eq!(map.get("replicas"), Some("3"));
        assert_eq!(map.get("enabled"), Some("true"));
    }

    #[test]
    fn test_yaml_rejects_nested() {
        let result = VariableMap::from_yaml_str("paths:\n  - /a\n");
        assert!(matches!(result, Err(ComposeKitError::InvalidConfig(_))));
    }

    #[test]
    fn test_env_prefix_lowercased() {
        let env = vec![
            ("COMPOSEKIT_VAR_APP_DATA_BASE_PATH", "/opt"),
            ("HOME", "/root"),
        ];
        let map = VariableMap::from_env_iter(env).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("app_data_base_path"), Some("/opt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let bad = || OsString::from_vec(vec![0xff, 0xfe]);

        // Unrelated entries are skipped regardless of encoding
        let env = vec![
            (OsString::from("UNRELATED"), bad()),
            (bad(), OsString::from("x")),
            (
                OsString::from("COMPOSEKIT_VAR_APP_DATA_BASE_PATH"),
                OsString::from("/srv"),
            ),
        ];
        let map = VariableMap::from_env_iter(env).unwrap();
        assert_eq!(map.get("app_data_base_path"), Some("/srv"));

        let env = vec![(OsString::from("COMPOSEKIT_VAR_BASE"), bad())];
        assert!(matches!(
            VariableMap::from_env_iter(env),
            Err(ComposeKitError::InvalidConfig(_))
        ));

        let mut key = b"COMPOSEKIT_VAR_".to_vec();
        key.push(0xff);
        let env = vec![(OsString::from_vec(key), OsString::from("x"))];
        assert!(matches!(
            VariableMap::from_env_iter(env),
            Err(ComposeKitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_pairs() {
        let map = VariableMap::from_pairs(&["a=1", "b=x=y", "c="]).unwrap();
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get("b"), Some("x=y"));
        assert_eq!(map.get("c"), Some(""));

        assert!(VariableMap::from_pairs(&["novalue"]).is_err());
        assert!(VariableMap::from_pairs(&["bad-name=1"]).is_err());
    }

    #[test]
    fn test_sources_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "app_data_base_path: /from/file\nother: keep").unwrap();

        let sources = VariableSources {
            vars_file: Some(file.path().to_path_buf()),
            use_env: false,
            pairs: vec!["app_data_base_path=/from/cli".to_string()],
        };
        let map = sources.load().unwrap();
        assert_eq!(map.get("app_data_base_path"), Some("/from/cli"));
        assert_eq!(map.get("other"), Some("keep"));
    }

    #[test]
    fn test_missing_vars_file() {
        let sources = VariableSources {
            vars_file: Some(PathBuf::from("/nonexistent/vars.yaml")),
            ..Default::default()
        };
        assert!(matches!(
            sources.load(),
            Err(ComposeKitError::InvalidConfig(_))
        ));
    }
}
