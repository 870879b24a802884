//! amvim core - the key-sequence command matching engine.
//!
//! This crate knows nothing about modes, hosts or documents. It provides:
//!
//! - [`Args`]: the argument record handed to every action
//! - [`Action`] and [`CommandMap`]: what lives at the leaves of a keymap
//! - [`special_key`]: pattern keys such as `{N}` (repeat count) and `{char}`
//! - [`trie`]: the recursive command map keyed by input tokens
//! - [`CommandMapper`]: a trie plus its special keys, with a three-way match
//!
//! ## Example
//!
//! ```
//! use amvim_core::{Action, CommandMap, CommandMapper, MatchResult};
//!
//! let mut mapper = CommandMapper::new();
//! let down = Action::new("cursor.down", |_args| async { Ok(()) });
//! mapper
//!     .insert_joined("{N} j", CommandMap::new(vec![down]))
//!     .expect("non-empty key sequence");
//!
//! let inputs: Vec<String> = ["2", "3", "j"].iter().map(|s| s.to_string()).collect();
//! match mapper.match_keys(&inputs) {
//!     MatchResult::Found { map, consumed } => {
//!         assert_eq!(map.args().count, Some(23));
//!         assert_eq!(consumed, 3);
//!     }
//!     other => panic!("expected a match, got {other:?}"),
//! }
//! ```

pub mod action;
pub mod args;
pub mod error;
pub mod mapper;
pub mod special_key;
pub mod trie;

pub use action::{Action, ActionFuture, CommandMap};
pub use args::Args;
pub use error::{ActionError, KeymapError};
pub use mapper::{CommandMapper, MatchKind, MatchResult};
pub use special_key::{SpecialKey, SpecialKeyChar, SpecialKeyCount, SpecialKeyMatch};
pub use trie::{KeyTrie, KeyTrieNode};

/// The token every mode treats as "cancel".
pub const ESCAPE: &str = "escape";

/// Separator between tokens in a joined key sequence (`"g g"`).
pub const KEY_SEPARATOR: char = ' ';

/// Split a joined key sequence into tokens.
///
/// Runs of separators are collapsed, so `"g  g"` and `"g g"` are the same.
#[must_use]
pub fn parse_keys(joined: &str) -> Vec<String> {
    joined
        .split(KEY_SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
