//! Mode switching and key routing.
//!
//! The [`Dispatcher`] owns one [`Mode`] per [`ModeId`] for its whole
//! lifetime and tracks which one is active. Builtin actions reach it through
//! a weak [`DispatcherHandle`], so keymaps can switch modes without keeping
//! the dispatcher alive.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use amvim_core::{Args, CommandMap, MatchKind};
use parking_lot::Mutex;

use crate::config::{AmvimConfig, ConfigError};
use crate::host::{ChangeHook, Host, NoopChangeHook, SelectionState};
use crate::keymap::{self, ActionRegistry, Binding};
use crate::mode::{Mode, ModeId};

/// The fixed set of modes.
struct Modes {
    normal: Mode,
    visual: Mode,
    visual_line: Mode,
    insert: Mode,
}

impl Modes {
    fn get(&self, id: ModeId) -> &Mode {
        match id {
            ModeId::Normal => &self.normal,
            ModeId::Visual => &self.visual,
            ModeId::VisualLine => &self.visual_line,
            ModeId::Insert => &self.insert,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Mode> {
        [&self.normal, &self.visual, &self.visual_line, &self.insert].into_iter()
    }
}

struct Inner {
    host: Arc<dyn Host>,
    modes: Modes,
    current: Mutex<Option<ModeId>>,
    default_mode: ModeId,
}

impl Inner {
    fn current_mode(&self) -> Option<&Mode> {
        let current = *self.current.lock();
        current.map(|id| self.modes.get(id))
    }

    fn switch_mode(&self, id: ModeId) {
        let previous = self.current.lock().replace(id);
        log::debug!("switch mode {previous:?} -> {id}");

        if let Some(previous) = previous {
            self.modes.get(previous).exit();
        }

        let mode = self.modes.get(id);
        mode.enter();
        self.host.set_mode_context(mode.name());

        if let Some(previous) = previous {
            let previous = self.modes.get(previous);
            mode.on_did_record_finish(previous.recorded_command_maps(), previous.id());
        }
    }

    /// Follow the host's selection: a selection made in Normal enters
    /// Visual, clearing it in a visual mode returns to Normal. `current` is
    /// `None` to force a decision regardless of the active mode.
    fn switch_by_selection(&self, current: Option<ModeId>) {
        let target = match (self.host.selection_state(), current) {
            (SelectionState::NoEditor, _) | (_, Some(ModeId::Insert)) => None,
            (SelectionState::Empty, None | Some(ModeId::Visual | ModeId::VisualLine)) => Some(ModeId::Normal),
            (SelectionState::NonEmpty, None | Some(ModeId::Normal)) => Some(ModeId::Visual),
            (SelectionState::Empty, Some(ModeId::Normal))
            | (SelectionState::NonEmpty, Some(ModeId::Visual | ModeId::VisualLine)) => None,
        };

        if let Some(target) = target {
            self.switch_mode(target);
        }
    }

    fn repeat_last_change(&self, count: usize) -> Vec<CommandMap> {
        self.current_mode()
            .map(|mode| mode.replay_recorded(count))
            .unwrap_or_default()
    }
}

/// Builder for [`Dispatcher`].
#[must_use]
pub struct DispatcherBuilder {
    host: Arc<dyn Host>,
    hook: Arc<dyn ChangeHook>,
    default_mode: ModeId,
    bindings: BTreeMap<ModeId, Vec<Binding>>,
}

impl DispatcherBuilder {
    /// Mode activated on build and when focus moves to a new editor.
    pub fn default_mode(mut self, id: ModeId) -> Self {
        self.default_mode = id;
        self
    }

    pub fn change_hook(mut self, hook: Arc<dyn ChangeHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Add bindings to mode `id`, on top of the defaults and earlier ones.
    pub fn bindings(mut self, id: ModeId, bindings: impl IntoIterator<Item = Binding>) -> Self {
        self.bindings.entry(id).or_default().extend(bindings);
        self
    }

    pub fn binding(self, id: ModeId, binding: Binding) -> Self {
        self.bindings(id, [binding])
    }

    /// Take the default mode and bindings from `config`, resolving action
    /// names against builtins and `registry`.
    pub fn config(mut self, config: &AmvimConfig, registry: &ActionRegistry) -> Result<Self, ConfigError> {
        for (id, bindings) in config.resolve_bindings(registry)? {
            self = self.bindings(id, bindings);
        }
        Ok(self.default_mode(config.default_mode))
    }

    /// Build every mode's keymap and activate the default mode.
    pub fn build(self) -> Dispatcher {
        let Self {
            host,
            hook,
            default_mode,
            bindings,
        } = self;

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let handle = DispatcherHandle { inner: weak.clone() };
            let mode = |id: ModeId| {
                let user = bindings.get(&id).map_or(&[][..], Vec::as_slice);
                let mapper = keymap::build_mapper(id, user, &handle);
                Mode::new(id, mapper, Arc::clone(&host), Arc::clone(&hook))
            };

            Inner {
                modes: Modes {
                    normal: mode(ModeId::Normal),
                    visual: mode(ModeId::Visual),
                    visual_line: mode(ModeId::VisualLine),
                    insert: mode(ModeId::Insert),
                },
                host: Arc::clone(&host),
                current: Mutex::new(None),
                default_mode,
            }
        });

        inner.switch_mode(default_mode);
        Dispatcher { inner }
    }
}

/// Routes host key events to the active mode.
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn builder(host: Arc<dyn Host>) -> DispatcherBuilder {
        DispatcherBuilder {
            host,
            hook: Arc::new(NoopChangeHook),
            default_mode: ModeId::Normal,
            bindings: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    #[must_use]
    pub fn current_mode(&self) -> Option<ModeId> {
        *self.inner.current.lock()
    }

    #[must_use]
    pub fn default_mode(&self) -> ModeId {
        self.inner.default_mode
    }

    #[must_use]
    pub fn mode(&self, id: ModeId) -> &Mode {
        self.inner.modes.get(id)
    }

    /// Exit the active mode and enter `id`, handing over its recording.
    /// Switching to the active mode runs the same sequence.
    pub fn switch_mode(&self, id: ModeId) {
        self.inner.switch_mode(id);
    }

    /// Feed one key token to the active mode.
    pub fn input(&self, key: &str) -> MatchKind {
        self.input_with_args(key, &Args::default())
    }

    /// Feed one key token with host-supplied arguments merged into a match.
    pub fn input_with_args(&self, key: &str, args: &Args) -> MatchKind {
        match self.inner.current_mode() {
            Some(mode) => mode.input(key, args),
            None => MatchKind::Failed,
        }
    }

    /// Input-method composition: replace `count` previous characters with
    /// `text`. Bypasses matching.
    pub fn replace_previous_chars(&self, count: usize, text: &str) {
        self.inner.host.replace_previous_chars(count, text);
    }

    /// The host reports a selection change. Runs after already queued work
    /// has had a chance to settle.
    pub async fn on_did_change_text_editor_selection(&self) {
        tokio::task::yield_now().await;

        let current = self.current_mode();
        self.inner.switch_by_selection(current);
        self.inner.host.update_preferred_column();

        if let Some(mode) = self.inner.current_mode() {
            mode.on_did_change_text_editor_selection();
        }
    }

    /// The host reports that another editor got focus.
    pub async fn on_did_change_active_text_editor(&self) {
        tokio::task::yield_now().await;

        if self.default_mode() == ModeId::Insert {
            self.inner.switch_mode(ModeId::Insert);
        } else {
            self.inner.switch_by_selection(None);
        }
        self.inner.host.update_preferred_column();
    }

    #[must_use]
    pub fn recorded_command_maps(&self) -> Vec<CommandMap> {
        self.inner
            .current_mode()
            .map(Mode::recorded_command_maps)
            .unwrap_or_default()
    }

    /// Queue the active mode's recorded change `count` times; returns the
    /// maps of one round.
    pub fn repeat_last_change(&self, count: usize) -> Vec<CommandMap> {
        self.inner.repeat_last_change(count)
    }

    /// Resolve once no mode has a pipeline running.
    pub async fn wait_idle(&self) {
        loop {
            for mode in self.inner.modes.iter() {
                mode.wait_idle().await;
            }
            if self.inner.modes.iter().all(|mode| !mode.is_executing()) {
                return;
            }
        }
    }

    pub fn dispose(&self) {
        for mode in self.inner.modes.iter() {
            mode.dispose();
        }
    }
}

/// Weak reference to a [`Dispatcher`], held by builtin actions.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    inner: Weak<Inner>,
}

impl DispatcherHandle {
    /// A handle not attached to any dispatcher.
    #[must_use]
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Returns `false` if the dispatcher is gone.
    pub fn switch_mode(&self, id: ModeId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        inner.switch_mode(id);
        true
    }

    #[must_use]
    pub fn current_mode(&self) -> Option<ModeId> {
        self.inner.upgrade().and_then(|inner| *inner.current.lock())
    }

    #[must_use]
    pub fn recorded_command_maps(&self) -> Vec<CommandMap> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.current_mode().map(Mode::recorded_command_maps))
            .unwrap_or_default()
    }

    /// `None` if the dispatcher is gone.
    pub fn repeat_last_change(&self, count: usize) -> Option<Vec<CommandMap>> {
        self.inner.upgrade().map(|inner| inner.repeat_last_change(count))
    }
}
