//! Command mapper: a key trie plus the special keys it understands.

use std::sync::Arc;

use crate::action::CommandMap;
use crate::error::KeymapError;
use crate::special_key::{self, SpecialKey};
use crate::trie::{KeyTrieNode, TrieSearchResult};

/// Three-way outcome of matching input against a keymap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// A complete binding was matched.
    Found,
    /// The input is a proper prefix of at least one binding.
    Waiting,
    /// No binding can ever match the input.
    Failed,
}

/// Result of [`CommandMapper::match_keys`].
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// The input reached a leaf. `map` is a copy of the bound command map
    /// with derived arguments (count, character) merged in; `consumed` is how
    /// many input tokens the match used.
    Found { map: CommandMap, consumed: usize },
    Waiting,
    Failed,
}

impl MatchResult {
    #[must_use]
    pub fn kind(&self) -> MatchKind {
        match self {
            Self::Found { .. } => MatchKind::Found,
            Self::Waiting => MatchKind::Waiting,
            Self::Failed => MatchKind::Failed,
        }
    }
}

/// Keymap of a single mode.
#[derive(Debug, Clone)]
pub struct CommandMapper {
    root: KeyTrieNode,
    special_keys: Vec<Arc<dyn SpecialKey>>,
}

impl Default for CommandMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandMapper {
    /// An empty mapper with the `{N}` and `{char}` special keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_special_keys(special_key::defaults())
    }

    /// An empty mapper with a custom set of special keys, tried in the given
    /// order.
    #[must_use]
    pub fn with_special_keys(special_keys: Vec<Arc<dyn SpecialKey>>) -> Self {
        Self {
            root: KeyTrieNode::new(),
            special_keys,
        }
    }

    #[must_use]
    pub fn root(&self) -> &KeyTrieNode {
        &self.root
    }

    #[must_use]
    pub fn special_keys(&self) -> &[Arc<dyn SpecialKey>] {
        &self.special_keys
    }

    /// Bind a key sequence. A later binding replaces an earlier one for the
    /// same sequence, and removes bindings it conflicts with.
    pub fn insert(&mut self, keys: &[String], map: CommandMap) -> Result<(), KeymapError> {
        self.root.bind(keys, map, &self.special_keys)
    }

    /// Bind a space-separated key sequence such as `"g g"`.
    pub fn insert_joined(&mut self, joined: &str, map: CommandMap) -> Result<(), KeymapError> {
        self.insert(&crate::parse_keys(joined), map)
    }

    /// Match `inputs` against the bindings.
    ///
    /// Never mutates the mapper: on success the returned map is a copy of the
    /// bound one with the derived arguments overlaid on its static ones.
    #[must_use]
    pub fn match_keys(&self, inputs: &[String]) -> MatchResult {
        let result = match self.root.search(inputs, &self.special_keys) {
            TrieSearchResult::Found {
                map,
                consumed,
                args,
            } => {
                let mut map = map.clone();
                map.args_mut().merge(&args);
                MatchResult::Found {
                    map,
                    consumed: consumed.min(inputs.len()),
                }
            }
            TrieSearchResult::Partial => MatchResult::Waiting,
            TrieSearchResult::NotFound => MatchResult::Failed,
        };

        log::debug!("match {inputs:?} -> {:?}", result.kind());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::args::Args;
    use crate::parse_keys;
    use crate::trie::KeyTrie;

    fn named(name: &'static str) -> CommandMap {
        CommandMap::new(vec![Action::new(name, |_args| async { Ok(()) })])
    }

    fn found(result: MatchResult) -> (CommandMap, usize) {
        match result {
            MatchResult::Found { map, consumed } => (map, consumed),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    fn mapper_with(bindings: &[(&str, &'static str)]) -> CommandMapper {
        let mut mapper = CommandMapper::new();
        for &(keys, name) in bindings {
            mapper.insert_joined(keys, named(name)).expect("bind");
        }
        mapper
    }

    #[test]
    fn every_proper_prefix_is_waiting() {
        let mapper = mapper_with(&[("g g", "top"), ("d i w", "delete.inner-word")]);

        assert_eq!(mapper.match_keys(&parse_keys("g")).kind(), MatchKind::Waiting);
        assert_eq!(mapper.match_keys(&parse_keys("d")).kind(), MatchKind::Waiting);
        assert_eq!(mapper.match_keys(&parse_keys("d i")).kind(), MatchKind::Waiting);
        assert_eq!(mapper.match_keys(&parse_keys("d i w")).kind(), MatchKind::Found);
    }

    #[test]
    fn unknown_input_fails() {
        let mapper = mapper_with(&[("g g", "top")]);
        assert_eq!(mapper.match_keys(&parse_keys("x")).kind(), MatchKind::Failed);
        assert_eq!(mapper.match_keys(&parse_keys("g x")).kind(), MatchKind::Failed);
    }

    #[test]
    fn empty_mapper_fails_on_empty_input() {
        let mapper = CommandMapper::new();
        assert_eq!(mapper.match_keys(&[]).kind(), MatchKind::Failed);
    }

    #[test]
    fn count_is_merged_into_a_copy() {
        let mut mapper = CommandMapper::new();
        let map = named("cursor.down").with_args(Args::new().with_extra("by", "line"));
        mapper.insert_joined("{N} j", map).expect("bind");

        let (map, consumed) = found(mapper.match_keys(&parse_keys("2 3 j")));
        assert_eq!(consumed, 3);
        assert_eq!(map.args().count, Some(23));
        assert_eq!(map.args().extra.get("by"), Some(&serde_json::json!("line")));
        assert_eq!(map.joined_keys(), "{N} j");

        // The bound map is untouched by matching.
        match mapper.root().get("{N}") {
            Some(KeyTrie::Node(node)) => match node.get("j") {
                Some(KeyTrie::Command(bound)) => assert_eq!(bound.args().count, None),
                other => panic!("expected a leaf, got {other:?}"),
            },
            other => panic!("expected a node, got {other:?}"),
        }
    }

    #[test]
    fn count_and_char_combine() {
        let mapper = mapper_with(&[("{N} f {char}", "find.forward")]);
        let (map, consumed) = found(mapper.match_keys(&parse_keys("3 f space")));
        assert_eq!(consumed, 3);
        assert_eq!(map.args().count, Some(3));
        assert_eq!(map.args().character.as_deref(), Some(" "));
    }

    #[test]
    fn leaf_reached_with_input_left_over() {
        let mapper = mapper_with(&[("x", "delete.char")]);
        let (map, consumed) = found(mapper.match_keys(&parse_keys("x y")));
        assert_eq!(consumed, 1);
        assert_eq!(map.joined_keys(), "x");
    }

    #[test]
    fn insert_is_idempotent() {
        let map = named("cursor.down");
        let mut once = CommandMapper::new();
        once.insert_joined("{N} j", map.clone()).expect("bind");
        let mut twice = once.clone();
        twice.insert_joined("{N} j", map).expect("bind");

        for input in ["j", "4 j", "4", "k"] {
            let inputs = parse_keys(input);
            let a = once.match_keys(&inputs);
            let b = twice.match_keys(&inputs);
            assert_eq!(a.kind(), b.kind(), "input {input:?}");
            if let (MatchResult::Found { map: a, .. }, MatchResult::Found { map: b, .. }) = (a, b) {
                assert!(a.same_binding(&b));
            }
        }
    }

    #[test]
    fn binding_a_digit_removes_count_prefix() {
        let mut mapper = mapper_with(&[("{N} j", "cursor.down")]);
        mapper.insert_joined("1", named("one")).expect("bind");

        assert_eq!(mapper.match_keys(&parse_keys("2 j")).kind(), MatchKind::Failed);
        let (map, _) = found(mapper.match_keys(&parse_keys("1")));
        assert_eq!(map.actions()[0].name(), "one");
    }

    #[test]
    fn binding_char_replaces_siblings() {
        let mut mapper = mapper_with(&[("r a", "replace.a")]);
        mapper.insert_joined("r {char}", named("replace")).expect("bind");

        let (map, _) = found(mapper.match_keys(&parse_keys("r a")));
        assert_eq!(map.actions()[0].name(), "replace");
        assert_eq!(map.args().character.as_deref(), Some("a"));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let mut mapper = CommandMapper::new();
        assert_eq!(
            mapper.insert_joined("   ", named("nothing")),
            Err(KeymapError::EmptySequence)
        );
    }
}
