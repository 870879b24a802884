//! Error types of the matching engine and of actions.

/// Failure signalled by an action or a change hook.
///
/// Any of these aborts the running command map and drops the rest of the
/// mode's pending queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The action ran and reported a failure.
    #[error("action `{action}` failed: {reason}")]
    Failed { action: String, reason: String },
    /// The action gave up before doing anything (no editor, nothing to do).
    #[error("action `{0}` aborted")]
    Aborted(String),
    /// A change hook refused the command map.
    #[error("change hook rejected `{keys}`")]
    HookRejected { keys: String },
}

impl ActionError {
    #[must_use]
    pub fn failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            action: action.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn aborted(action: impl Into<String>) -> Self {
        Self::Aborted(action.into())
    }
}

/// Errors raised while building a keymap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("cannot bind an empty key sequence")]
    EmptySequence,
}
