use super::{SpecialKey, SpecialKeyChar, SpecialKeyMatch};
use crate::args::Args;
use crate::mapper::MatchKind;
use crate::trie::KeyTrieNode;

/// `{N}`: a repeat count such as the `23` in `23j`.
///
/// A count starts with a digit `1`-`9`; a leading `0` is a literal key (line
/// start in Vim). Every following digit `0`-`9` is consumed greedily.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecialKeyCount;

impl SpecialKeyCount {
    pub const INDICATOR: &'static str = "{N}";

    /// Literal keys that cannot share a node with `{N}`.
    fn conflicts_with(key: &str) -> bool {
        key == SpecialKeyChar::INDICATOR || matches!(single_digit(key), Some(1..=9))
    }
}

/// The value of a token that is exactly one ASCII digit.
fn single_digit(token: &str) -> Option<u32> {
    let mut chars = token.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    ch.to_digit(10)
}

impl SpecialKey for SpecialKeyCount {
    fn indicator(&self) -> &'static str {
        Self::INDICATOR
    }

    fn unmap_conflicts(&self, node: &mut KeyTrieNode, key_to_map: &str) {
        if key_to_map == Self::INDICATOR {
            node.retain(|key| !Self::conflicts_with(key));
        }

        if Self::conflicts_with(key_to_map) {
            node.remove(Self::INDICATOR);
        }
    }

    fn match_special(
        &self,
        inputs: &[String],
        args: &mut Args,
        _last: Option<&SpecialKeyMatch>,
    ) -> Option<SpecialKeyMatch> {
        let first = inputs.first().and_then(|token| single_digit(token))?;
        if first == 0 {
            return None;
        }

        let mut count = first as usize;
        let mut matched_count = 1;
        for digit in inputs.iter().skip(1).map_while(|token| single_digit(token)) {
            count = count.saturating_mul(10).saturating_add(digit as usize);
            matched_count += 1;
        }

        args.count = Some(count);

        Some(SpecialKeyMatch {
            indicator: Self::INDICATOR,
            kind: MatchKind::Found,
            matched_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CommandMap;
    use crate::trie::KeyTrie;

    fn tokens(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| (*key).to_string()).collect()
    }

    fn leaf() -> KeyTrie {
        KeyTrie::Command(CommandMap::default())
    }

    #[test]
    fn matches_multi_digit_count() {
        let mut args = Args::new();
        let result = SpecialKeyCount
            .match_special(&tokens(&["2", "3", "j"]), &mut args, None)
            .expect("should match");

        assert_eq!(result.matched_count, 2);
        assert_eq!(result.kind, MatchKind::Found);
        assert_eq!(result.indicator, "{N}");
        assert_eq!(args.count, Some(23));
    }

    #[test]
    fn zeros_after_first_digit_are_consumed() {
        let mut args = Args::new();
        let result = SpecialKeyCount
            .match_special(&tokens(&["1", "0", "0"]), &mut args, None)
            .expect("should match");
        assert_eq!(result.matched_count, 3);
        assert_eq!(args.count, Some(100));
    }

    #[test]
    fn leading_zero_is_not_a_count() {
        let mut args = Args::new();
        assert!(SpecialKeyCount
            .match_special(&tokens(&["0", "j"]), &mut args, None)
            .is_none());
        assert_eq!(args.count, None);
    }

    #[test]
    fn non_digit_is_not_a_count() {
        let mut args = Args::new();
        assert!(SpecialKeyCount
            .match_special(&tokens(&["j"]), &mut args, None)
            .is_none());
        assert!(SpecialKeyCount
            .match_special(&tokens(&["12"]), &mut args, None)
            .is_none());
        assert!(SpecialKeyCount.match_special(&[], &mut args, None).is_none());
    }

    #[test]
    fn huge_count_saturates() {
        let mut args = Args::new();
        let digits = vec!["9".to_string(); 40];
        let result = SpecialKeyCount
            .match_special(&digits, &mut args, None)
            .expect("should match");
        assert_eq!(result.matched_count, 40);
        assert_eq!(args.count, Some(usize::MAX));
    }

    #[test]
    fn mapping_indicator_removes_digit_and_char_children() {
        let mut node = KeyTrieNode::new();
        node.insert("1".to_string(), leaf());
        node.insert("9".to_string(), leaf());
        node.insert("0".to_string(), leaf());
        node.insert("{char}".to_string(), leaf());
        node.insert("j".to_string(), leaf());

        SpecialKeyCount.unmap_conflicts(&mut node, "{N}");

        assert!(node.get("1").is_none());
        assert!(node.get("9").is_none());
        assert!(node.get("{char}").is_none());
        assert!(node.get("0").is_some());
        assert!(node.get("j").is_some());
    }

    #[test]
    fn mapping_digit_removes_indicator() {
        let mut node = KeyTrieNode::new();
        node.insert("{N}".to_string(), leaf());

        SpecialKeyCount.unmap_conflicts(&mut node, "0");
        assert!(node.get("{N}").is_some());

        SpecialKeyCount.unmap_conflicts(&mut node, "5");
        assert!(node.get("{N}").is_none());
    }
}
