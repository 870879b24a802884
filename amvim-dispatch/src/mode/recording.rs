//! What each mode remembers for "repeat last change".
//!
//! Normal and the visual modes keep only the last change; Insert keeps every
//! change made since it was entered. Insert and the visual modes start each
//! session with an empty recording. When one of them is left for Normal,
//! Normal takes over whatever that session recorded.

use amvim_core::CommandMap;

use super::ModeId;

/// Update `recorded` before `map` makes changes in mode `id`.
pub(super) fn on_will_make_changes(id: ModeId, recorded: &mut Vec<CommandMap>, map: &CommandMap) {
    if map.args().is_repeating {
        return;
    }

    match id {
        ModeId::Insert => recorded.push(map.clone()),
        ModeId::Normal | ModeId::Visual | ModeId::VisualLine => {
            recorded.clear();
            recorded.push(map.clone());
        }
    }
}

/// Update `recorded` of mode `id` after switching to it from `previous_id`,
/// whose recording was `previous`.
pub(super) fn on_did_record_finish(
    id: ModeId,
    recorded: &mut Vec<CommandMap>,
    previous: Vec<CommandMap>,
    previous_id: ModeId,
) {
    match id {
        ModeId::Insert | ModeId::Visual | ModeId::VisualLine => recorded.clear(),
        ModeId::Normal if previous.is_empty() => {}
        ModeId::Normal => match previous_id {
            ModeId::Insert => recorded.extend(previous),
            ModeId::Visual | ModeId::VisualLine => *recorded = previous,
            ModeId::Normal => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amvim_core::{Action, Args};

    fn change(keys: &str) -> CommandMap {
        CommandMap::new(vec![Action::change("edit", |_args| async { Ok(()) })])
            .with_keys(amvim_core::parse_keys(keys))
    }

    fn keys(recorded: &[CommandMap]) -> Vec<String> {
        recorded.iter().map(CommandMap::joined_keys).collect()
    }

    #[test]
    fn normal_keeps_only_last_change() {
        let mut recorded = Vec::new();
        on_will_make_changes(ModeId::Normal, &mut recorded, &change("x"));
        on_will_make_changes(ModeId::Normal, &mut recorded, &change("d d"));
        assert_eq!(keys(&recorded), vec!["d d"]);
    }

    #[test]
    fn insert_keeps_every_change() {
        let mut recorded = Vec::new();
        on_will_make_changes(ModeId::Insert, &mut recorded, &change("a"));
        on_will_make_changes(ModeId::Insert, &mut recorded, &change("b"));
        assert_eq!(keys(&recorded), vec!["a", "b"]);
    }

    #[test]
    fn replayed_maps_are_not_recorded() {
        let mut recorded = vec![change("x")];
        let mut replayed = change("d d");
        *replayed.args_mut() = Args {
            is_repeating: true,
            ..Args::default()
        };
        on_will_make_changes(ModeId::Normal, &mut recorded, &replayed);
        assert_eq!(keys(&recorded), vec!["x"]);
    }

    #[test]
    fn normal_appends_insert_recording() {
        let mut recorded = vec![change("c w")];
        on_did_record_finish(
            ModeId::Normal,
            &mut recorded,
            vec![change("f"), change("o")],
            ModeId::Insert,
        );
        assert_eq!(keys(&recorded), vec!["c w", "f", "o"]);
    }

    #[test]
    fn normal_adopts_visual_recording() {
        let mut recorded = vec![change("x")];
        on_did_record_finish(ModeId::Normal, &mut recorded, vec![change("d")], ModeId::VisualLine);
        assert_eq!(keys(&recorded), vec!["d"]);
    }

    #[test]
    fn empty_recording_leaves_normal_untouched() {
        let mut recorded = vec![change("x")];
        on_did_record_finish(ModeId::Normal, &mut recorded, Vec::new(), ModeId::Visual);
        assert_eq!(keys(&recorded), vec!["x"]);
    }

    #[test]
    fn entering_insert_starts_fresh() {
        let mut recorded = vec![change("a")];
        on_did_record_finish(ModeId::Insert, &mut recorded, vec![change("x")], ModeId::Normal);
        assert!(recorded.is_empty());
    }

    #[test]
    fn entering_visual_starts_fresh() {
        for id in [ModeId::Visual, ModeId::VisualLine] {
            let mut recorded = vec![change("d")];
            on_did_record_finish(id, &mut recorded, vec![change("x")], ModeId::Normal);
            assert!(recorded.is_empty(), "{id}");
        }
    }
}
