//! amvim dispatch - modal key dispatch on top of the amvim matching engine.
//!
//! A host editor feeds one token per keypress into a [`Dispatcher`]. The
//! dispatcher routes it to the active [`Mode`], which matches its input
//! buffer against the mode's keymap and queues matched command maps on a
//! per-mode execution pipeline.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use amvim_dispatch::{AmvimConfig, ActionRegistry, Dispatcher, Host, SelectionState};
//!
//! struct Headless;
//!
//! impl Host for Headless {
//!     fn set_status(&self, _text: &str) {}
//!     fn set_mode_context(&self, _mode_name: &str) {}
//!     fn selection_state(&self) -> SelectionState {
//!         SelectionState::Empty
//!     }
//!     fn replace_previous_chars(&self, _count: usize, _text: &str) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AmvimConfig::load_default()?;
//!     let dispatcher = Dispatcher::builder(Arc::new(Headless))
//!         .config(&config, &ActionRegistry::new())?
//!         .build();
//!     dispatcher.input("i");
//!     dispatcher.wait_idle().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Modes are created once by the dispatcher and never recreated. Each mode
//! owns its keymap, input buffer, pending queue and recording. Matched maps
//! run on a tokio task, one chain at a time per mode; a failing action drops
//! everything still queued for that mode.
//!
//! Builtin actions (mode switches, repeat) hold a weak [`DispatcherHandle`]
//! so they can drive the dispatcher from inside the pipeline.

pub mod builtin;
pub mod config;
pub mod dispatcher;
pub mod host;
pub mod keymap;
pub mod mode;

#[cfg(test)]
mod test_helpers;

// Convenience re-exports
pub use amvim_core::{Action, ActionError, Args, CommandMap, MatchKind};
pub use builtin::Builtin;
pub use config::{AmvimConfig, ConfigError};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherHandle};
pub use host::{ChangeHook, Host, NoopChangeHook, SelectionState};
pub use keymap::{ActionRef, ActionRegistry, Binding};
pub use mode::{Mode, ModeId};
