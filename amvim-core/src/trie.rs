//! Key trie data structure for command dispatch.
//!
//! `KeyTrie` is a tree where leaves are [`CommandMap`] values and internal
//! nodes map input tokens (or special key indicators such as `{N}`) to child
//! tries. Special keys take part in both insertion (conflict removal) and
//! search (pattern matching with backtracking).

use std::collections::HashMap;
use std::sync::Arc;

use crate::action::CommandMap;
use crate::args::Args;
use crate::error::KeymapError;
use crate::mapper::MatchKind;
use crate::special_key::{SpecialKey, SpecialKeyMatch};

/// A trie for key dispatch.
#[derive(Debug, Clone)]
pub enum KeyTrie {
    /// A leaf: run this command map.
    Command(CommandMap),
    /// An internal node with children.
    Node(KeyTrieNode),
}

/// An internal trie node.
#[derive(Debug, Clone, Default)]
pub struct KeyTrieNode {
    /// Map of token → child trie.
    map: HashMap<String, KeyTrie>,
    /// Insertion order for display purposes.
    order: Vec<String>,
}

/// Result of searching a trie with an input sequence.
#[derive(Debug)]
pub enum TrieSearchResult<'a> {
    /// Reached a leaf after consuming `consumed` tokens. `args` holds what
    /// special keys derived along the way.
    Found {
        map: &'a CommandMap,
        consumed: usize,
        args: Args,
    },
    /// Ran out of input at a node that has children: more keys needed.
    Partial,
    /// No path accepts the input.
    NotFound,
}

impl KeyTrieNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, trie: KeyTrie) {
        if !self.map.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.map.insert(key, trie);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KeyTrie> {
        self.map.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<KeyTrie> {
        let removed = self.map.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Keep only the children whose key satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.map.retain(|key, _| keep(key));
        self.order.retain(|key| self.map.contains_key(key));
    }

    /// Child keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bind `keys` to `map`, creating nodes along the way.
    ///
    /// Before each token is bound at a node, every special key gets to remove
    /// conflicting siblings there. A leaf lying on the path of a longer
    /// sequence is replaced by a node; the last token always ends up bound to
    /// `map`.
    pub fn bind(
        &mut self,
        keys: &[String],
        map: CommandMap,
        special_keys: &[Arc<dyn SpecialKey>],
    ) -> Result<(), KeymapError> {
        if keys.is_empty() {
            return Err(KeymapError::EmptySequence);
        }
        self.bind_rest(keys, map.with_keys(keys.to_vec()), special_keys);
        Ok(())
    }

    fn bind_rest(&mut self, keys: &[String], map: CommandMap, special_keys: &[Arc<dyn SpecialKey>]) {
        let Some((key, rest)) = keys.split_first() else {
            return;
        };

        for special_key in special_keys {
            special_key.unmap_conflicts(self, key);
        }

        if rest.is_empty() {
            self.insert(key.clone(), KeyTrie::Command(map));
            return;
        }

        if !matches!(self.map.get(key), Some(KeyTrie::Node(_))) {
            self.insert(key.clone(), KeyTrie::Node(KeyTrieNode::new()));
        }
        if let Some(KeyTrie::Node(child)) = self.map.get_mut(key) {
            child.bind_rest(rest, map, special_keys);
        }
    }

    /// Search this node for `inputs`.
    #[must_use]
    pub fn search<'a>(
        &'a self,
        inputs: &[String],
        special_keys: &[Arc<dyn SpecialKey>],
    ) -> TrieSearchResult<'a> {
        self.search_from(inputs, 0, Args::default(), None, special_keys)
    }

    // Literal children are tried before special keys, special keys in
    // registration order. A branch that ends in `NotFound` falls through to
    // the next alternative.
    fn search_from<'a>(
        &'a self,
        inputs: &[String],
        consumed: usize,
        args: Args,
        last: Option<SpecialKeyMatch>,
        special_keys: &[Arc<dyn SpecialKey>],
    ) -> TrieSearchResult<'a> {
        let Some(token) = inputs.first() else {
            return if self.is_empty() {
                TrieSearchResult::NotFound
            } else {
                TrieSearchResult::Partial
            };
        };

        if let Some(child) = self.map.get(token) {
            let rest = inputs.get(1..).unwrap_or_default();
            let result = child.search_from(rest, consumed + 1, args.clone(), last, special_keys);
            if !matches!(result, TrieSearchResult::NotFound) {
                return result;
            }
        }

        for special_key in special_keys {
            let Some(child) = self.map.get(special_key.indicator()) else {
                continue;
            };
            let mut derived = args.clone();
            let Some(matched) = special_key.match_special(inputs, &mut derived, last.as_ref()) else {
                continue;
            };

            match matched.kind {
                MatchKind::Found => {
                    let taken = matched.matched_count.clamp(1, inputs.len());
                    let rest = inputs.get(taken..).unwrap_or_default();
                    let result =
                        child.search_from(rest, consumed + taken, derived, Some(matched), special_keys);
                    if !matches!(result, TrieSearchResult::NotFound) {
                        return result;
                    }
                }
                MatchKind::Waiting => return TrieSearchResult::Partial,
                MatchKind::Failed => {}
            }
        }

        TrieSearchResult::NotFound
    }
}

impl KeyTrie {
    fn search_from<'a>(
        &'a self,
        inputs: &[String],
        consumed: usize,
        args: Args,
        last: Option<SpecialKeyMatch>,
        special_keys: &[Arc<dyn SpecialKey>],
    ) -> TrieSearchResult<'a> {
        match self {
            // Tokens left over after a leaf are not part of this command.
            Self::Command(map) => TrieSearchResult::Found { map, consumed, args },
            Self::Node(node) => node.search_from(inputs, consumed, args, last, special_keys),
        }
    }
}
