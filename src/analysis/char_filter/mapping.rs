use aho_corasick::{AhoCorasick, MatchKind};

use super::CharFilter;
use crate::error::{MoodlensError, Result};

/// A char filter that replaces literal strings using leftmost-longest
/// matching, so overlapping keys resolve deterministically.
#[derive(Clone, Debug)]
pub struct MappingCharFilter {
    ac: AhoCorasick,
    replacements: Vec<String>,
}

impl MappingCharFilter {
    /// Build the filter from `(from, to)` pairs. Pair order does not affect
    /// the result.
    pub fn new<I, K, V>(mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut keys = Vec::new();
        let mut replacements = Vec::new();

        for (k, v) in mapping {
            keys.push(k.into());
            replacements.push(v.into());
        }

        let ac = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&keys)
            .map_err(|e| MoodlensError::Anyhow(anyhow::Error::from(e)))?;

        Ok(Self { ac, replacements })
    }
}

impl CharFilter for MappingCharFilter {
    fn filter(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut last_match_end = 0;

        for m in self.ac.find_iter(input) {
            output.push_str(&input[last_match_end..m.start()]);
            output.push_str(&self.replacements[m.pattern().as_usize()]);
            last_match_end = m.end();
        }

        output.push_str(&input[last_match_end..]);
        output
    }

    fn name(&self) -> &'static str {
        "mapping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_char_filter() {
        let filter = MappingCharFilter::new([("ph", "f"), ("qu", "k")]).unwrap();
        assert_eq!(filter.filter("phone queue"), "fone keue");
    }

    #[test]
    fn test_mapping_deletion() {
        let filter = MappingCharFilter::new([("foo", "")]).unwrap();
        assert_eq!(filter.filter("afoob"), "ab");
    }

    #[test]
    fn test_leftmost_match_wins() {
        // "n't" starts before "'t" and must be consumed as a whole.
        let filter = MappingCharFilter::new([("'t", " not"), ("n't", " not")]).unwrap();
        assert_eq!(filter.filter("don't"), "do not");
    }

    #[test]
    fn test_mapping_overlap_prefers_longest() {
        let filter = MappingCharFilter::new([("ab", "1"), ("abc", "2")]).unwrap();
        assert_eq!(filter.filter("abc"), "2");
    }

    #[test]
    fn test_mapping_multibyte() {
        let filter = MappingCharFilter::new([("\u{2019}", "'")]).unwrap();
        assert_eq!(filter.filter("it\u{2019}s"), "it's");
    }
}
