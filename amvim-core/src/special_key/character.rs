use super::{SpecialKey, SpecialKeyMatch};
use crate::args::Args;
use crate::mapper::MatchKind;
use crate::trie::KeyTrieNode;

/// `{char}`: any single key, e.g. the target of `f` or `r`.
///
/// Named keys that stand for a printable character are converted, so
/// `f space` captures `" "`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialKeyChar;

impl SpecialKeyChar {
    pub const INDICATOR: &'static str = "{char}";

    fn convert(token: &str) -> &str {
        match token {
            "space" => " ",
            other => other,
        }
    }
}

impl SpecialKey for SpecialKeyChar {
    fn indicator(&self) -> &'static str {
        Self::INDICATOR
    }

    // `{char}` accepts every token, so it cannot share a node with anything.
    fn unmap_conflicts(&self, node: &mut KeyTrieNode, key_to_map: &str) {
        if key_to_map == Self::INDICATOR {
            node.retain(|key| key == Self::INDICATOR);
        } else {
            node.remove(Self::INDICATOR);
        }
    }

    fn match_special(
        &self,
        inputs: &[String],
        args: &mut Args,
        _last: Option<&SpecialKeyMatch>,
    ) -> Option<SpecialKeyMatch> {
        let token = inputs.first()?;
        args.character = Some(Self::convert(token).to_string());

        Some(SpecialKeyMatch {
            indicator: Self::INDICATOR,
            kind: MatchKind::Found,
            matched_count: 1,
        })
    }
}
