//! Per-mode execution pipeline.
//!
//! Matched command maps are queued on the mode and drained by a single tokio
//! task at a time. Each map's actions run strictly in order; maps that
//! contain a change action are bracketed by the change hooks. The first
//! failure drops everything still queued.

use std::sync::Arc;

use amvim_core::{ActionError, CommandMap};
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{recording, ModeId, ModeState};
use crate::host::ChangeHook;

#[derive(Clone)]
pub(super) struct Pipeline {
    pub(super) id: ModeId,
    pub(super) state: Arc<Mutex<ModeState>>,
    pub(super) hook: Arc<dyn ChangeHook>,
    pub(super) idle: Arc<Notify>,
}

impl Pipeline {
    /// Start draining the queue unless a run is already in progress.
    ///
    /// Must be called from within a tokio runtime.
    pub(super) fn execute(&self) {
        {
            let mut state = self.state.lock();
            if state.executing {
                return;
            }
            state.executing = true;
        }

        let pipeline = self.clone();
        tokio::spawn(async move { pipeline.run().await });
    }

    async fn run(self) {
        while let Some(map) = self.next() {
            if let Err(err) = self.run_map(&map).await {
                let dropped = {
                    let mut state = self.state.lock();
                    let dropped = state.pending.len();
                    state.pending.clear();
                    state.executing = false;
                    dropped
                };
                log::warn!(
                    "{} `{}`: {err}; dropped {dropped} queued command(s)",
                    self.id,
                    map.joined_keys()
                );
                self.idle.notify_waiters();
                return;
            }
        }
    }

    /// Pop the next map, or mark the pipeline idle when the queue is empty.
    fn next(&self) -> Option<CommandMap> {
        let next = {
            let mut state = self.state.lock();
            let next = state.pending.pop_front();
            if next.is_none() {
                state.executing = false;
            }
            next
        };

        if next.is_none() {
            self.idle.notify_waiters();
        }
        next
    }

    async fn run_map(&self, map: &CommandMap) -> Result<(), ActionError> {
        let makes_changes = map.is_any_action_change();
        log::debug!("{} run `{}`", self.id, map.joined_keys());

        if makes_changes {
            recording::on_will_make_changes(self.id, &mut self.state.lock().recorded, map);
            self.hook.will_make_changes(self.id, map).await?;
        }

        for action in map.actions() {
            log::debug!("{} action {}", self.id, action.name());
            action.invoke(map.args().clone()).await?;
        }

        if makes_changes {
            self.hook.did_make_changes(self.id, map).await?;
        }

        Ok(())
    }
}
