//! Actions provided by the dispatcher itself.
//!
//! Builtins are referenced by name from binding tables, just like host
//! actions. They are bound to a [`DispatcherHandle`] when the dispatcher
//! builds its keymaps.

use amvim_core::{Action, ActionError, Args};

use crate::dispatcher::DispatcherHandle;
use crate::mode::ModeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    ToNormal,
    ToVisual,
    ToVisualLine,
    ToInsert,
    /// Replay the current mode's recorded change, `count` times.
    RepeatLastChange,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Self::ToNormal,
        Self::ToVisual,
        Self::ToVisualLine,
        Self::ToInsert,
        Self::RepeatLastChange,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ToNormal => "mode.normal",
            Self::ToVisual => "mode.visual",
            Self::ToVisualLine => "mode.visual-line",
            Self::ToInsert => "mode.insert",
            Self::RepeatLastChange => "repeat.last-change",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Entering Insert starts a change: `.` after `i ... escape` replays the
    /// typed text.
    #[must_use]
    pub fn is_change(self) -> bool {
        matches!(self, Self::ToInsert)
    }

    /// The mode a switch builtin targets.
    #[must_use]
    pub fn target_mode(self) -> Option<ModeId> {
        match self {
            Self::ToNormal => Some(ModeId::Normal),
            Self::ToVisual => Some(ModeId::Visual),
            Self::ToVisualLine => Some(ModeId::VisualLine),
            Self::ToInsert => Some(ModeId::Insert),
            Self::RepeatLastChange => None,
        }
    }

    /// Build the action, driving the dispatcher behind `handle`.
    ///
    /// Replayed builtins are no-ops, so a recording that switched modes
    /// replays its edits in the mode that repeats it.
    #[must_use]
    pub fn action(self, handle: DispatcherHandle) -> Action {
        let name = self.name();
        let target = self.target_mode();

        Action::new(name, move |args: Args| {
            let handle = handle.clone();
            async move {
                if args.is_repeating {
                    return Ok(());
                }

                let alive = match target {
                    Some(mode) => handle.switch_mode(mode),
                    None => handle.repeat_last_change(args.count_or_one()).is_some(),
                };

                if alive {
                    Ok(())
                } else {
                    Err(ActionError::aborted(name))
                }
            }
        })
        .with_change(self.is_change())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("mode.replace"), None);
    }

    #[test]
    fn only_insert_switch_is_a_change() {
        let changes: Vec<_> = Builtin::ALL.into_iter().filter(|b| b.is_change()).collect();
        assert_eq!(changes, vec![Builtin::ToInsert]);
    }

    #[tokio::test]
    async fn detached_handle_aborts() {
        let action = Builtin::ToVisual.action(DispatcherHandle::detached());
        assert_eq!(
            action.invoke(Args::new()).await,
            Err(ActionError::aborted("mode.visual"))
        );

        let replayed = Args {
            is_repeating: true,
            ..Args::default()
        };
        assert_eq!(action.invoke(replayed).await, Ok(()));
    }
}
