//! Interfaces the host editor implements.

use amvim_core::{ActionError, CommandMap};
use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;

use crate::mode::ModeId;

/// Selection state of the active editor, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// No editor is focused.
    NoEditor,
    /// Every selection is empty (plain cursors).
    Empty,
    /// At least one selection spans text.
    NonEmpty,
}

/// The editor side of the dispatcher.
///
/// All calls are synchronous and fire-and-forget.
pub trait Host: Send + Sync {
    /// Show a single-line status such as `-- NORMAL --`.
    fn set_status(&self, text: &str);

    /// Publish the active mode name for context-dependent keybindings.
    fn set_mode_context(&self, mode_name: &str);

    fn selection_state(&self) -> SelectionState;

    /// Replace `count` characters before the cursor with `text`
    /// (input-method composition).
    fn replace_previous_chars(&self, count: usize, text: &str);

    /// Refresh the cached column vertical motions try to keep.
    fn update_preferred_column(&self) {}
}

/// Brackets every command map that contains a change action, e.g. to take an
/// undo snapshot. A rejection aborts the map and drops the mode's queue.
pub trait ChangeHook: Send + Sync {
    fn will_make_changes(
        &self,
        mode: ModeId,
        map: &CommandMap,
    ) -> BoxFuture<'static, Result<(), ActionError>> {
        let _ = (mode, map);
        future::ready(Ok(())).boxed()
    }

    fn did_make_changes(
        &self,
        mode: ModeId,
        map: &CommandMap,
    ) -> BoxFuture<'static, Result<(), ActionError>> {
        let _ = (mode, map);
        future::ready(Ok(())).boxed()
    }
}

/// Change hook that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChangeHook;

impl ChangeHook for NoopChangeHook {}
