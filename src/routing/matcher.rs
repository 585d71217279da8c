//! Path prefix matching.
//!
//! # Responsibilities
//! - Match a request path against a prefix (case-sensitive, plain string prefix)
//! - Hold a rule table ordered so the longest prefix is found first
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex, no segment awareness: `/@` matches `/@foo`
//! - Equal-length prefixes keep declaration order

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` starts with the prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// The part of `path` after the prefix, if it matches.
    pub fn remainder<'p>(&self, path: &'p str) -> Option<&'p str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

/// A table of prefix rules searched longest prefix first.
#[derive(Debug, Clone)]
pub struct PrefixTable<T> {
    entries: Vec<(PathPrefixMatcher, T)>,
}

impl<T> PrefixTable<T> {
    pub fn new(entries: impl IntoIterator<Item = (String, T)>) -> Self {
        let mut entries: Vec<_> = entries
            .into_iter()
            .map(|(prefix, value)| (PathPrefixMatcher::new(prefix), value))
            .collect();
        // Stable sort: ties stay in config order.
        entries.sort_by(|(a, _), (b, _)| b.prefix().len().cmp(&a.prefix().len()));
        Self { entries }
    }

    /// The rule with the longest prefix of `path`, with the unmatched remainder.
    pub fn longest_match<'p>(&self, path: &'p str) -> Option<(&T, &'p str)> {
        self.entries
            .iter()
            .find_map(|(matcher, value)| matcher.remainder(path).map(|rest| (value, rest)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rules in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(m, v)| (m.prefix(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api");

        assert!(matcher.matches("/api/v1"));
        assert!(matcher.matches("/api"));
        assert!(matcher.matches("/apis"));
        assert!(!matcher.matches("/images"));
        assert!(!matcher.matches("/API/v1"));

        assert_eq!(matcher.remainder("/api/v1"), Some("/v1"));
        assert_eq!(matcher.remainder("/api"), Some(""));
        assert_eq!(matcher.remainder("/ap"), None);
    }

    #[test]
    fn test_longest_prefix_wins_regardless_of_order() {
        let table = PrefixTable::new(vec![
            ("/api".to_string(), "short"),
            ("/api/v2".to_string(), "long"),
        ]);
        assert_eq!(table.longest_match("/api/v2/foo"), Some((&"long", "/foo")));
        assert_eq!(table.longest_match("/api/v1/foo"), Some((&"short", "/v1/foo")));
        assert_eq!(table.longest_match("/other"), None);

        let reversed = PrefixTable::new(vec![
            ("/api/v2".to_string(), "long"),
            ("/api".to_string(), "short"),
        ]);
        assert_eq!(reversed.longest_match("/api/v2/foo"), Some((&"long", "/foo")));
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let table = PrefixTable::new(vec![
            ("/a".to_string(), 1),
            ("/b".to_string(), 2),
            ("/a".to_string(), 3),
        ]);
        assert_eq!(table.longest_match("/a/x"), Some((&1, "/x")));
        assert_eq!(table.len(), 3);
        assert_eq!(table.iter().map(|(p, _)| p).collect::<Vec<_>>(), ["/a", "/b", "/a"]);
    }
}
