//! Configuration for amvim.
//!
//! Configuration is loaded from `~/.config/amvim/config.toml` and provides
//! the default mode, logging settings, per-mode key bindings and metadata for
//! host actions named in those bindings.
//!
//! ```toml
//! default_mode = "normal"
//!
//! [[keys.normal]]
//! keys = "{N} j"
//! actions = ["cursor.down"]
//!
//! [[keys.normal]]
//! keys = ["d", "d"]
//! actions = ["delete.line"]
//! args = { register = "a" }
//!
//! [actions."delete.line"]
//! change = true
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use amvim_core::{parse_keys, Args};
use anyhow::Result;
use serde::Deserialize;

use crate::builtin::Builtin;
use crate::keymap::{ActionRegistry, Binding};
use crate::mode::ModeId;

/// Errors raised while loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{mode}: binding `{keys}` uses unknown action `{action}`")]
    UnknownAction {
        mode: ModeId,
        keys: String,
        action: String,
    },
    #[error("{mode}: binding with an empty key sequence")]
    EmptyKeys { mode: ModeId },
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmvimConfig {
    pub default_mode: ModeId,
    pub logging: LoggingConfig,
    /// Bindings per mode, inserted on top of the defaults in order.
    pub keys: BTreeMap<ModeId, Vec<BindingConfig>>,
    /// Metadata of host actions, by name.
    pub actions: BTreeMap<String, ActionConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: Option<PathBuf>,
    pub level: String,
    pub suppressed_patterns: Vec<String>,
}

/// A key sequence, either space-separated (`"g g"`) or as a token list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeySequence {
    Joined(String),
    Tokens(Vec<String>),
}

impl KeySequence {
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Self::Joined(joined) => parse_keys(joined),
            Self::Tokens(tokens) => tokens.clone(),
        }
    }
}

/// One `[[keys.<mode>]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingConfig {
    pub keys: KeySequence,
    pub actions: Vec<String>,
    #[serde(default)]
    pub args: Args,
}

/// One `[actions.<name>]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Whether the action modifies the document.
    pub change: bool,
}

impl Default for AmvimConfig {
    fn default() -> Self {
        Self {
            default_mode: ModeId::Normal,
            logging: LoggingConfig::default(),
            keys: BTreeMap::new(),
            actions: BTreeMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            level: "info".to_string(),
            suppressed_patterns: Vec::new(),
        }
    }
}

impl AmvimConfig {
    /// Load configuration from the default location (`~/.config/amvim/config.toml`).
    ///
    /// Falls back to defaults if the file doesn't exist.
    /// Returns an error only if the file exists but is malformed.
    pub fn load_default() -> Result<Self> {
        match dirs::config_dir().map(|dir| dir.join("amvim").join("config.toml")) {
            Some(path) if path.exists() => Ok(Self::load_from(&path)?),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<AmvimConfig>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn with_default_mode(mut self, id: ModeId) -> Self {
        self.default_mode = id;
        self
    }

    /// Set the log file path.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.logging.log_file = Some(path.into());
        self
    }

    /// Set the log level (e.g., "info", "debug", "warn").
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Append a binding to mode `id`.
    #[must_use]
    pub fn with_binding(mut self, id: ModeId, keys: &str, actions: &[&str]) -> Self {
        self.keys.entry(id).or_default().push(BindingConfig {
            keys: KeySequence::Joined(keys.to_string()),
            actions: actions.iter().map(|action| (*action).to_string()).collect(),
            args: Args::default(),
        });
        self
    }

    /// Declare whether host action `name` modifies the document.
    #[must_use]
    pub fn with_action(mut self, name: impl Into<String>, change: bool) -> Self {
        self.actions.insert(name.into(), ActionConfig { change });
        self
    }

    /// Whether host action `name` is declared as a change.
    #[must_use]
    pub fn is_change(&self, name: &str) -> bool {
        self.actions.get(name).is_some_and(|action| action.change)
    }

    /// Host action names used by bindings or declared under `[actions]`,
    /// excluding builtins.
    #[must_use]
    pub fn host_action_names(&self) -> BTreeSet<&str> {
        self.keys
            .values()
            .flatten()
            .flat_map(|binding| binding.actions.iter().map(String::as_str))
            .chain(self.actions.keys().map(String::as_str))
            .filter(|name| Builtin::from_name(name).is_none())
            .collect()
    }

    /// Turn the binding tables into [`Binding`]s, resolving every action
    /// name against builtins and `registry`.
    pub fn resolve_bindings(
        &self,
        registry: &ActionRegistry,
    ) -> Result<BTreeMap<ModeId, Vec<Binding>>, ConfigError> {
        let mut resolved = BTreeMap::new();

        for (&mode, bindings) in &self.keys {
            let mut out = Vec::with_capacity(bindings.len());
            for binding in bindings {
                let keys = binding.keys.tokens();
                if keys.is_empty() {
                    return Err(ConfigError::EmptyKeys { mode });
                }

                let actions = binding
                    .actions
                    .iter()
                    .map(|name| {
                        registry.resolve(name).ok_or_else(|| ConfigError::UnknownAction {
                            mode,
                            keys: keys.join(" "),
                            action: name.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                out.push(Binding {
                    keys,
                    actions,
                    args: binding.args.clone(),
                });
            }
            resolved.insert(mode, out);
        }

        Ok(resolved)
    }
}
