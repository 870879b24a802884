//! Special keys: pattern slots in the trie.
//!
//! A special key is bound under an indicator token (`{N}`, `{char}`) and
//! claims a class of input tokens. While matching it consumes a run of input
//! and writes derived arguments; while inserting it removes literal siblings
//! that would make a node ambiguous.

mod character;
mod count;

use std::fmt;

pub use self::character::SpecialKeyChar;
pub use self::count::SpecialKeyCount;

use crate::args::Args;
use crate::mapper::MatchKind;
use crate::trie::KeyTrieNode;

/// Outcome of a successful special key match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialKeyMatch {
    /// Indicator of the special key that matched.
    pub indicator: &'static str,
    pub kind: MatchKind,
    /// Number of leading input tokens consumed.
    pub matched_count: usize,
}

/// A pattern key participating in the trie alongside literal tokens.
pub trait SpecialKey: fmt::Debug + Send + Sync {
    /// The token this key is bound under in binding tables.
    fn indicator(&self) -> &'static str;

    /// Called for every node along an insertion path before `key_to_map` is
    /// bound there. Removes whichever side of a conflict loses.
    fn unmap_conflicts(&self, node: &mut KeyTrieNode, key_to_map: &str);

    /// Try to match the head of `inputs`.
    ///
    /// `last` is the previous special key match on the same path, if any.
    fn match_special(
        &self,
        inputs: &[String],
        args: &mut Args,
        last: Option<&SpecialKeyMatch>,
    ) -> Option<SpecialKeyMatch>;
}

/// The special keys every mode registers, in priority order.
#[must_use]
pub fn defaults() -> Vec<std::sync::Arc<dyn SpecialKey>> {
    vec![
        std::sync::Arc::new(SpecialKeyCount),
        std::sync::Arc::new(SpecialKeyChar),
    ]
}
