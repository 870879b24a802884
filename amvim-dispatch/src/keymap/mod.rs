//! Binding tables and how they become per-mode keymaps.
//!
//! A [`Binding`] names its actions through [`ActionRef`]: either a host
//! action or a [`Builtin`]. Builtins are only turned into actions when the
//! dispatcher builds its modes, because they need a handle back to it.
//! Default bindings are inserted first; later bindings win conflicts.

pub mod default;

use std::collections::HashMap;

use amvim_core::{parse_keys, Action, Args, CommandMap, CommandMapper};

use crate::builtin::Builtin;
use crate::dispatcher::DispatcherHandle;
use crate::mode::ModeId;

/// An action named in a binding.
#[derive(Debug, Clone)]
pub enum ActionRef {
    Action(Action),
    Builtin(Builtin),
}

impl ActionRef {
    fn resolve(&self, handle: &DispatcherHandle) -> Action {
        match self {
            Self::Action(action) => action.clone(),
            Self::Builtin(builtin) => builtin.action(handle.clone()),
        }
    }
}

impl From<Action> for ActionRef {
    fn from(action: Action) -> Self {
        Self::Action(action)
    }
}

impl From<Builtin> for ActionRef {
    fn from(builtin: Builtin) -> Self {
        Self::Builtin(builtin)
    }
}

/// One key sequence bound to an ordered list of actions.
#[derive(Debug, Clone)]
pub struct Binding {
    pub keys: Vec<String>,
    pub actions: Vec<ActionRef>,
    pub args: Args,
}

impl Binding {
    /// Bind a space-separated key sequence such as `"d d"`.
    #[must_use]
    pub fn new(keys: &str, actions: Vec<ActionRef>) -> Self {
        Self {
            keys: parse_keys(keys),
            actions,
            args: Args::default(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    fn command_map(&self, handle: &DispatcherHandle) -> CommandMap {
        let actions = self.actions.iter().map(|action| action.resolve(handle)).collect();
        CommandMap::new(actions).with_args(self.args.clone())
    }
}

/// Host actions by name, for resolving binding tables written in config.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Action>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under its own name, replacing any previous one.
    pub fn register(&mut self, action: Action) {
        self.actions.insert(action.name().to_string(), action);
    }

    #[must_use]
    pub fn with(mut self, action: Action) -> Self {
        self.register(action);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Builtins first, then host actions.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ActionRef> {
        Builtin::from_name(name)
            .map(ActionRef::Builtin)
            .or_else(|| self.get(name).cloned().map(ActionRef::Action))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Build the keymap of mode `id`: its defaults, then `bindings` on top.
///
/// Bindings with an empty key sequence are skipped with a warning.
pub(crate) fn build_mapper(id: ModeId, bindings: &[Binding], handle: &DispatcherHandle) -> CommandMapper {
    let mut mapper = CommandMapper::new();

    for binding in default::default_bindings(id).iter().chain(bindings) {
        if let Err(err) = mapper.insert(&binding.keys, binding.command_map(handle)) {
            log::warn!("{id}: skipping binding: {err}");
        }
    }

    mapper
}
