//! Test helpers for dispatch tests.
//!
//! Provides a host that records everything the dispatcher tells it, a shared
//! event log, and actions that log, fail or wait on a channel.

use std::sync::Arc;

use amvim_core::{Action, ActionError, CommandMap};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::host::{ChangeHook, Host, SelectionState};
use crate::mode::ModeId;

/// Ordered log shared between actions and hooks.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Action that logs its name.
pub(crate) fn logging(name: &'static str, log: &EventLog) -> Action {
    let log = log.clone();
    Action::new(name, move |_args| {
        log.push(name);
        async { Ok(()) }
    })
}

/// Action that logs its name, then fails.
pub(crate) fn failing(name: &'static str, log: &EventLog) -> Action {
    let log = log.clone();
    Action::new(name, move |_args| {
        log.push(name);
        async move { Err(ActionError::failed(name, "test failure")) }
    })
}

/// Action that logs `<name>:start`, suspends until the returned sender
/// fires, then logs `<name>:end`. Only the first invocation waits.
pub(crate) fn gated(name: &'static str, log: &EventLog) -> (oneshot::Sender<()>, Action) {
    let (tx, rx) = oneshot::channel();
    let rx = Arc::new(Mutex::new(Some(rx)));
    let log = log.clone();

    let action = Action::new(name, move |_args| {
        let rx = rx.lock().take();
        let log = log.clone();
        async move {
            log.push(format!("{name}:start"));
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            log.push(format!("{name}:end"));
            Ok(())
        }
    });

    (tx, action)
}

/// Host that records every call and doubles as a change hook.
#[derive(Debug)]
pub(crate) struct RecordingHost {
    statuses: Mutex<Vec<String>>,
    contexts: Mutex<Vec<String>>,
    replaced: Mutex<Vec<(usize, String)>>,
    selection: Mutex<SelectionState>,
    preferred_column_updates: Mutex<usize>,
    reject_changes: Mutex<bool>,
    events: EventLog,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            statuses: Mutex::default(),
            contexts: Mutex::default(),
            replaced: Mutex::default(),
            selection: Mutex::new(SelectionState::Empty),
            preferred_column_updates: Mutex::default(),
            reject_changes: Mutex::default(),
            events: EventLog::default(),
        }
    }
}

impl RecordingHost {
    pub(crate) fn last_status(&self) -> Option<String> {
        self.statuses.lock().last().cloned()
    }

    pub(crate) fn contexts(&self) -> Vec<String> {
        self.contexts.lock().clone()
    }

    pub(crate) fn replaced(&self) -> Vec<(usize, String)> {
        self.replaced.lock().clone()
    }

    pub(crate) fn set_selection(&self, selection: SelectionState) {
        *self.selection.lock() = selection;
    }

    pub(crate) fn preferred_column_updates(&self) -> usize {
        *self.preferred_column_updates.lock()
    }

    /// Make `will_make_changes` reject every map.
    pub(crate) fn reject_changes(&self, reject: bool) {
        *self.reject_changes.lock() = reject;
    }

    /// Log the change hooks write to, as `will <mode> <keys>` and
    /// `did <mode> <keys>`.
    pub(crate) fn events(&self) -> EventLog {
        self.events.clone()
    }
}

impl Host for RecordingHost {
    fn set_status(&self, text: &str) {
        self.statuses.lock().push(text.to_string());
    }

    fn set_mode_context(&self, mode_name: &str) {
        self.contexts.lock().push(mode_name.to_string());
    }

    fn selection_state(&self) -> SelectionState {
        *self.selection.lock()
    }

    fn replace_previous_chars(&self, count: usize, text: &str) {
        self.replaced.lock().push((count, text.to_string()));
    }

    fn update_preferred_column(&self) {
        *self.preferred_column_updates.lock() += 1;
    }
}

impl ChangeHook for RecordingHost {
    fn will_make_changes(
        &self,
        mode: ModeId,
        map: &CommandMap,
    ) -> BoxFuture<'static, Result<(), ActionError>> {
        let keys = map.joined_keys();
        if *self.reject_changes.lock() {
            return futures_util::future::ready(Err(ActionError::HookRejected { keys })).boxed();
        }
        let events = self.events.clone();
        async move {
            events.push(format!("will {mode} {keys}"));
            Ok(())
        }
        .boxed()
    }

    fn did_make_changes(
        &self,
        mode: ModeId,
        map: &CommandMap,
    ) -> BoxFuture<'static, Result<(), ActionError>> {
        let events = self.events.clone();
        let keys = map.joined_keys();
        async move {
            events.push(format!("did {mode} {keys}"));
            Ok(())
        }
        .boxed()
    }
}
