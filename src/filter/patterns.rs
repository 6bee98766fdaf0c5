//! Glob pattern normalization and compilation
//!
//! Matching always happens against root-relative paths using `/` as the
//! separator, with `*` and `?` confined to a single path segment and `**`
//! spanning segments. Matching is case-sensitive on every platform.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{ArchiveError, ArchiveResult};

/// Normalize a glob pattern for matching against root-relative paths.
///
/// Rules:
/// - Empty or "*" becomes "**/*" (match all)
/// - Leading slashes are stripped (relative matching)
/// - Patterns without a path separator get a "**/" prefix so "*.log"
///   matches at any depth
pub fn normalize_pattern(raw: &str) -> String {
    let mut pattern = raw.trim().trim_start_matches('/').to_string();

    if pattern.is_empty() || pattern == "*" {
        pattern = "**/*".to_string();
    }

    if !pattern.contains('/') && !pattern.starts_with("**/") && pattern != "**/*" {
        pattern = format!("**/{}", pattern);
    }

    pattern
}

/// Compile a list of raw patterns into a single matcher.
///
/// An empty pattern list compiles to a set that matches nothing; callers
/// decide what an empty set means (exclude lists ignore it, include lists
/// treat it as "no restriction").
pub fn build_set(patterns: &[String]) -> ArchiveResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for raw in patterns {
        let glob = GlobBuilder::new(&normalize_pattern(raw))
            .literal_separator(true)
            .build()
            .map_err(|e| ArchiveError::Pattern(format!("Invalid pattern '{}': {}", raw, e)))?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| ArchiveError::Pattern(format!("Failed to compile patterns: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basics() {
        assert_eq!(normalize_pattern(""), "**/*");
        assert_eq!(normalize_pattern("*"), "**/*");
        assert_eq!(normalize_pattern("app.log"), "**/app.log");
        assert_eq!(normalize_pattern("*.log"), "**/*.log");
        assert_eq!(normalize_pattern("sub/*.log"), "sub/*.log");
        assert_eq!(normalize_pattern("/sub/*.log"), "sub/*.log");
        assert_eq!(normalize_pattern("**/*.log"), "**/*.log");
    }

    #[test]
    fn test_bare_pattern_matches_any_depth() {
        let set = build_set(&["*.log".to_string()]).unwrap();
        assert!(set.is_match("app.log"));
        assert!(set.is_match("nested/deep/app.log"));
        assert!(!set.is_match("app.txt"));
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        let set = build_set(&["sub/*.log".to_string()]).unwrap();
        assert!(set.is_match("sub/app.log"));
        assert!(!set.is_match("sub/deeper/app.log"));
    }

    #[test]
    fn test_double_star_spans_segments() {
        let set = build_set(&["logs/**/*.gz".to_string()]).unwrap();
        assert!(set.is_match("logs/a.gz"));
        assert!(set.is_match("logs/2024/01/a.gz"));
        assert!(!set.is_match("other/a.gz"));
    }

    #[test]
    fn test_question_mark_single_char() {
        let set = build_set(&["app.?og".to_string()]).unwrap();
        assert!(set.is_match("app.log"));
        assert!(!set.is_match("app.loog"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let set = build_set(&["*.log".to_string()]).unwrap();
        assert!(!set.is_match("APP.LOG"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = build_set(&["a[".to_string()]).unwrap_err();
        assert!(matches!(err, ArchiveError::Pattern(_)));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = build_set(&[]).unwrap();
        assert!(!set.is_match("anything.log"));
    }
}
