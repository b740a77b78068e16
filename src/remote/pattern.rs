//! Glob Pattern Module
//!
//! Compiles invalidation patterns such as `customer:*` into an anchored
//! matcher. Only `*` is special; every other character matches itself.

use regex::{Regex, RegexBuilder};

use crate::error::{CacheError, Result};

/// Longest pattern accepted by [`GlobMatcher::compile`].
pub const MAX_PATTERN_LENGTH: usize = 512;

/// Upper bound on the compiled program size.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

// == Glob Matcher ==
/// A compiled `*` wildcard pattern matched against whole cache keys.
///
/// Matching runs in time linear in the key length regardless of how many
/// wildcards the pattern holds.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    regex: Regex,
}

impl GlobMatcher {
    /// Compiles `pattern`, rejecting empty or oversized input.
    pub fn compile(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(CacheError::InvalidPattern(
                "Pattern cannot be empty".to_string(),
            ));
        }
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(CacheError::InvalidPattern(format!(
                "Pattern exceeds maximum length of {} bytes",
                MAX_PATTERN_LENGTH
            )));
        }

        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = RegexBuilder::new(&format!("^{}$", body))
            .dot_matches_new_line(true)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(|e| CacheError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn has_wildcard(&self) -> bool {
        self.pattern.contains('*')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern() {
        let matcher = GlobMatcher::compile("customer:*").unwrap();
        assert!(matcher.is_match("customer:"));
        assert!(matcher.is_match("customer:42:orders"));
        assert!(!matcher.is_match("customers:42"));
        assert!(!matcher.is_match("api:GET:customer:42"));
    }

    #[test]
    fn test_infix_and_suffix_wildcards() {
        let matcher = GlobMatcher::compile("api:*:customers*").unwrap();
        assert!(matcher.is_match("api:GET:customers"));
        assert!(matcher.is_match(r#"api:GET:customers:{"page":1}"#));
        assert!(!matcher.is_match("api:GET:deals"));

        let suffix = GlobMatcher::compile("*:summary").unwrap();
        assert!(suffix.is_match("dashboard:summary"));
        assert!(!suffix.is_match("dashboard:summary:today"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let matcher = GlobMatcher::compile(r#"api:GET:/deals:{"ids":[1,2]}*"#).unwrap();
        assert!(matcher.is_match(r#"api:GET:/deals:{"ids":[1,2]}"#));

        let dot = GlobMatcher::compile("a.b").unwrap();
        assert!(dot.is_match("a.b"));
        assert!(!dot.is_match("axb"));
    }

    #[test]
    fn test_pattern_without_wildcard_is_exact() {
        let matcher = GlobMatcher::compile("stats:today").unwrap();
        assert!(!matcher.has_wildcard());
        assert!(matcher.is_match("stats:today"));
        assert!(!matcher.is_match("stats:today:extra"));
    }

    #[test]
    fn test_lone_star_matches_everything() {
        let matcher = GlobMatcher::compile("*").unwrap();
        assert!(matcher.is_match(""));
        assert!(matcher.is_match("anything\nat all"));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(matches!(
            GlobMatcher::compile(""),
            Err(CacheError::InvalidPattern(_))
        ));
        let long = "*a".repeat(MAX_PATTERN_LENGTH);
        assert!(matches!(
            GlobMatcher::compile(&long),
            Err(CacheError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_many_wildcards_stay_fast() {
        let pattern = "*a".repeat(100);
        let matcher = GlobMatcher::compile(&pattern).unwrap();
        let key = "a".repeat(99) + "b";
        assert!(!matcher.is_match(&key));
    }
}
