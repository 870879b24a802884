//! Default bindings for every mode.
//!
//! Only the bindings the dispatcher can serve on its own: mode switches and
//! repeat. Editing commands come from the host's configuration.

use super::{ActionRef, Binding};
use crate::builtin::Builtin;
use crate::mode::ModeId;

fn builtin(keys: &str, builtin: Builtin) -> Binding {
    Binding::new(keys, vec![ActionRef::Builtin(builtin)])
}

/// Default bindings of mode `id`, in insertion order.
#[must_use]
pub fn default_bindings(id: ModeId) -> Vec<Binding> {
    match id {
        ModeId::Normal => normal_mode_defaults(),
        ModeId::Visual | ModeId::VisualLine => visual_mode_defaults(),
        ModeId::Insert => insert_mode_defaults(),
    }
}

#[must_use]
pub fn normal_mode_defaults() -> Vec<Binding> {
    vec![
        builtin("i", Builtin::ToInsert),
        builtin("v", Builtin::ToVisual),
        builtin("V", Builtin::ToVisualLine),
        builtin("{N} .", Builtin::RepeatLastChange),
        builtin(".", Builtin::RepeatLastChange),
    ]
}

#[must_use]
pub fn visual_mode_defaults() -> Vec<Binding> {
    vec![builtin("escape", Builtin::ToNormal)]
}

#[must_use]
pub fn insert_mode_defaults() -> Vec<Binding> {
    vec![builtin("escape", Builtin::ToNormal)]
}
