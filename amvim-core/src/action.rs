//! Actions and the command maps that live at trie leaves.
//!
//! An [`Action`] is an opaque, asynchronously completing unit of work. The
//! host supplies the implementation; the engine only needs its name and
//! whether it mutates the document.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::args::Args;
use crate::error::ActionError;

/// Future returned by an action invocation.
pub type ActionFuture = BoxFuture<'static, Result<(), ActionError>>;

type ActionFn = dyn Fn(Args) -> ActionFuture + Send + Sync;

/// A named unit of work plus its change metadata.
#[derive(Clone)]
pub struct Action {
    name: Arc<str>,
    is_change: bool,
    run: Arc<ActionFn>,
}

impl Action {
    /// Create an action that does not modify the document (motions, mode
    /// switches, searches).
    pub fn new<F, Fut>(name: impl Into<Arc<str>>, run: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            is_change: false,
            run: Arc::new(move |args| run(args).boxed()),
        }
    }

    /// Create an action that modifies the document. Command maps containing
    /// one are bracketed by the mode's change hooks.
    pub fn change<F, Fut>(name: impl Into<Arc<str>>, run: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self::new(name, run).with_change(true)
    }

    #[must_use]
    pub fn with_change(mut self, is_change: bool) -> Self {
        self.is_change = is_change;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_change(&self) -> bool {
        self.is_change
    }

    /// Start the action with the given arguments.
    #[must_use]
    pub fn invoke(&self, args: Args) -> ActionFuture {
        (self.run)(args)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("is_change", &self.is_change)
            .finish_non_exhaustive()
    }
}

/// What lives at a trie leaf: the actions to run, in order, and their static
/// arguments.
///
/// Command maps are never mutated once bound. Matching hands out a copy with
/// the derived arguments merged in.
#[derive(Debug, Clone, Default)]
pub struct CommandMap {
    keys: Vec<String>,
    actions: Vec<Action>,
    args: Args,
}

impl CommandMap {
    #[must_use]
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            keys: Vec::new(),
            actions,
            args: Args::default(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    /// Record the key sequence this map is bound under. Set by the trie on
    /// insertion.
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The key sequence joined with spaces, as written in binding tables.
    #[must_use]
    pub fn joined_keys(&self) -> String {
        self.keys.join(" ")
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut Args {
        &mut self.args
    }

    /// Whether any action of this map modifies the document.
    #[must_use]
    pub fn is_any_action_change(&self) -> bool {
        self.actions.iter().any(Action::is_change)
    }

    /// Two maps are the same binding when they run the same action objects
    /// with the same arguments.
    #[must_use]
    pub fn same_binding(&self, other: &CommandMap) -> bool {
        self.args == other.args
            && self.actions.len() == other.actions.len()
            && self
                .actions
                .iter()
                .zip(&other.actions)
                .all(|(a, b)| Arc::ptr_eq(&a.run, &b.run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &'static str) -> Action {
        Action::new(name, |_args| async { Ok(()) })
    }

    #[test]
    fn new_action_is_not_a_change() {
        let action = noop("cursor.down");
        assert_eq!(action.name(), "cursor.down");
        assert!(!action.is_change());
    }

    #[test]
    fn change_action_is_flagged() {
        let action = Action::change("delete.line", |_args| async { Ok(()) });
        assert!(action.is_change());
    }

    #[test]
    fn command_map_detects_change_actions() {
        let motion_only = CommandMap::new(vec![noop("cursor.down"), noop("cursor.up")]);
        assert!(!motion_only.is_any_action_change());

        let with_change = CommandMap::new(vec![
            noop("cursor.down"),
            Action::change("delete.line", |_args| async { Ok(()) }),
        ]);
        assert!(with_change.is_any_action_change());
    }

    #[test]
    fn same_binding_compares_action_identity() {
        let down = noop("cursor.down");
        let a = CommandMap::new(vec![down.clone()]);
        let b = CommandMap::new(vec![down]);
        let c = CommandMap::new(vec![noop("cursor.down")]);

        assert!(a.same_binding(&b));
        assert!(!a.same_binding(&c));
    }

    #[tokio::test]
    async fn invoke_passes_arguments() {
        let action = Action::new("expect.count", |args: Args| async move {
            if args.count == Some(3) {
                Ok(())
            } else {
                Err(ActionError::failed("expect.count", "wrong count"))
            }
        });

        assert!(action.invoke(Args::new().with_count(3)).await.is_ok());
        assert!(action.invoke(Args::new()).await.is_err());
    }
}
