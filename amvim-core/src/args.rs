//! Argument record handed to actions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arguments of a command map.
///
/// Static arguments come from the binding table; derived arguments (`count`,
/// `character`) are written by special keys while matching, and host extras
/// (`replace_char_count`) are merged in when a key is fed to a mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Args {
    /// Repeat count typed before the command (`23j`).
    pub count: Option<usize>,
    /// Character captured by a `{char}` key (`f x`).
    pub character: Option<String>,
    /// Number of previous characters an input-method composition replaces.
    pub replace_char_count: Option<usize>,
    /// Set while recorded command maps are replayed.
    #[serde(skip)]
    pub is_repeating: bool,
    /// Free-form static arguments from the binding table.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Args {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Overlay `other` onto `self`. Fields set in `other` win.
    pub fn merge(&mut self, other: &Args) {
        if other.count.is_some() {
            self.count = other.count;
        }
        if other.character.is_some() {
            self.character.clone_from(&other.character);
        }
        if other.replace_char_count.is_some() {
            self.replace_char_count = other.replace_char_count;
        }
        self.is_repeating |= other.is_repeating;
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// The repeat count, or `1` when none was typed.
    #[must_use]
    pub fn count_or_one(&self) -> usize {
        self.count.unwrap_or(1)
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
