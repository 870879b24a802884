//! Editing modes.
//!
//! A [`Mode`] is the per-mode state machine: it accumulates keys in an input
//! buffer, matches them against its keymap, and hands matched command maps
//! to its execution pipeline. The set of modes is closed ([`ModeId`]); the
//! few behaviours that differ per mode dispatch on the id.

mod pipeline;
mod recording;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use amvim_core::{Args, CommandMap, CommandMapper, MatchKind, MatchResult, ESCAPE};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use self::pipeline::Pipeline;
use crate::host::{ChangeHook, Host};

/// Identity of an editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeId {
    Normal,
    Visual,
    VisualLine,
    Insert,
}

impl ModeId {
    pub const ALL: [ModeId; 4] = [Self::Normal, Self::Visual, Self::VisualLine, Self::Insert];

    /// Display name, as shown in the status line and published to the host.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Visual => "VISUAL",
            Self::VisualLine => "VISUAL LINE",
            Self::Insert => "INSERT",
        }
    }

    /// Identifier used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Visual => "visual",
            Self::VisualLine => "visual-line",
            Self::Insert => "insert",
        }
    }

    #[must_use]
    pub fn is_visual(self) -> bool {
        matches!(self, Self::Visual | Self::VisualLine)
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state shared between a mode and its pipeline task.
#[derive(Debug, Default)]
struct ModeState {
    /// Tokens typed since the last full match or failure.
    inputs: Vec<String>,
    /// Matched maps not yet started.
    pending: VecDeque<CommandMap>,
    /// Whether a pipeline task is draining `pending`.
    executing: bool,
    /// Maps recorded for "repeat last change".
    recorded: Vec<CommandMap>,
}

/// One editing mode. Created once per dispatcher and reused across switches.
pub struct Mode {
    id: ModeId,
    mapper: CommandMapper,
    host: Arc<dyn Host>,
    state: Arc<Mutex<ModeState>>,
    pipeline: Pipeline,
}

impl Mode {
    #[must_use]
    pub fn new(id: ModeId, mapper: CommandMapper, host: Arc<dyn Host>, hook: Arc<dyn ChangeHook>) -> Self {
        let state = Arc::new(Mutex::new(ModeState::default()));
        let pipeline = Pipeline {
            id,
            state: Arc::clone(&state),
            hook,
            idle: Arc::new(Notify::new()),
        };

        Self {
            id,
            mapper,
            host,
            state,
            pipeline,
        }
    }

    #[must_use]
    pub fn id(&self) -> ModeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Called when the mode becomes active.
    pub fn enter(&self) {
        self.update_status(None);
    }

    /// Called when the mode stops being active. Already started actions keep
    /// running; nothing queued behind them will.
    pub fn exit(&self) {
        let mut state = self.state.lock();
        state.inputs.clear();
        state.pending.clear();
    }

    pub fn dispose(&self) {
        self.exit();
    }

    /// Feed one key token.
    ///
    /// `escape` is matched on its own, bypassing and clearing the buffer.
    /// On a full match `extra` is merged into the map's arguments and the map
    /// is queued for execution, which requires a tokio runtime.
    pub fn input(&self, key: &str, extra: &Args) -> MatchKind {
        let (kind, typed) = {
            let mut state = self.state.lock();

            let result = if key == ESCAPE {
                state.inputs.clear();
                self.mapper.match_keys(&[key.to_string()])
            } else {
                state.inputs.push(key.to_string());
                self.mapper.match_keys(&state.inputs)
            };
            let kind = result.kind();

            match result {
                MatchResult::Found { mut map, .. } => {
                    state.inputs.clear();
                    if !extra.is_empty() {
                        map.args_mut().merge(extra);
                    }
                    state.pending.push_back(map);
                }
                MatchResult::Failed => state.inputs.clear(),
                MatchResult::Waiting => {}
            }

            (kind, state.inputs.join(" "))
        };

        match kind {
            MatchKind::Waiting if !typed.is_empty() => {
                self.update_status(Some(&format!("{typed} and...")));
            }
            _ => self.update_status(None),
        }

        if kind == MatchKind::Found {
            self.pipeline.execute();
        }

        kind
    }

    /// Tokens currently waiting for a longer match.
    #[must_use]
    pub fn pending_inputs(&self) -> Vec<String> {
        self.state.lock().inputs.clone()
    }

    /// Number of matched maps waiting behind the running one.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    #[must_use]
    pub fn is_executing(&self) -> bool {
        self.state.lock().executing
    }

    #[must_use]
    pub fn recorded_command_maps(&self) -> Vec<CommandMap> {
        self.state.lock().recorded.clone()
    }

    /// Hand over the recording of the mode that was active before this one.
    pub fn on_did_record_finish(&self, previous: Vec<CommandMap>, previous_id: ModeId) {
        recording::on_did_record_finish(self.id, &mut self.state.lock().recorded, previous, previous_id);
    }

    pub fn on_did_change_text_editor_selection(&self) {
        log::trace!("{} selection changed", self.id);
    }

    /// Queue the recorded maps `count` times, flagged as repeating, and
    /// return one round of them.
    pub fn replay_recorded(&self, count: usize) -> Vec<CommandMap> {
        let replayed: Vec<CommandMap> = {
            let mut state = self.state.lock();
            let replayed: Vec<CommandMap> = state
                .recorded
                .iter()
                .cloned()
                .map(|mut map| {
                    map.args_mut().is_repeating = true;
                    map
                })
                .collect();
            for _ in 0..count.max(1) {
                state.pending.extend(replayed.iter().cloned());
            }
            replayed
        };

        if !replayed.is_empty() {
            log::debug!("{} replaying {} map(s) x{count}", self.id, replayed.len());
            self.pipeline.execute();
        }
        replayed
    }

    /// Resolve once no pipeline task is running for this mode.
    pub async fn wait_idle(&self) {
        loop {
            let mut notified = std::pin::pin!(self.pipeline.idle.notified());
            notified.as_mut().enable();
            if !self.is_executing() {
                return;
            }
            notified.await;
        }
    }

    fn update_status(&self, message: Option<&str>) {
        let status = match message {
            Some(message) => format!("-- {} -- {message}", self.name()),
            None => format!("-- {} --", self.name()),
        };
        self.host.set_status(&status);
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mode")
            .field("id", &self.id)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
