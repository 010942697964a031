//! Version string comparison and wildcard matching.
//!
//! Versions in the catalog are opaque dotted strings ("6.0.1", "4.0p1",
//! "git"). Ordering is *natural*: digit runs compare numerically, everything
//! else compares lexicographically, case-insensitively. Constraints may end
//! in a single trailing ".*" wildcard; no other wildcard position is
//! supported.

use std::cmp::Ordering;

use crate::error::{Error, Result};

// ─── Natural Ordering ──────────────────────────────────────────────

/// Split a version string into alternating numeric / non-numeric chunks.
fn chunks(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;
    for i in 1..=bytes.len() {
        if i == bytes.len()
            || bytes[i].is_ascii_digit() != bytes[start].is_ascii_digit()
        {
            out.push(&s[start..i]);
            start = i;
        }
    }
    out
}

/// Compare two version strings in natural order.
///
/// Numeric chunks compare as integers ("10" > "9"), non-numeric chunks
/// compare lexicographically ignoring case. Total order; suitable for
/// sorting and minimum-version checks.
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);
    for (x, y) in ca.iter().zip(cb.iter()) {
        let x_num = x.parse::<u64>();
        let y_num = y.parse::<u64>();
        let ord = match (x_num, y_num) {
            (Ok(xn), Ok(yn)) => xn.cmp(&yn),
            _ => x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}

// ─── Wildcard Matching ─────────────────────────────────────────────

/// Test a concrete version against a constraint pattern.
///
/// A pattern either matches exactly, or ends in ".*" and matches the bare
/// prefix, any "prefix." continuation, or a "prefix" + "p" patch token
/// (so "4.0.*" accepts "4.0p1"). Wildcards anywhere else are an error.
pub fn matches_wildcard(pattern: &str, version: &str) -> Result<bool> {
    let (prefix, wild) = match pattern.strip_suffix(".*") {
        Some(p) => (p, true),
        None => (pattern, false),
    };
    if prefix.is_empty() || prefix.contains('*') || prefix.contains('?') {
        return Err(Error::InvalidPattern {
            pattern: pattern.to_string(),
        });
    }
    if !wild {
        return Ok(version == pattern);
    }
    Ok(version == prefix
        || version.starts_with(&format!("{}.", prefix))
        || version.starts_with(&format!("{}p", prefix)))
}

/// True if the pattern carries a trailing ".*" wildcard.
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.ends_with(".*")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<&str>) -> Vec<&str> {
        v.sort_by(|a, b| natural_compare(a, b));
        v
    }

    #[test]
    fn test_natural_compare_numeric_chunks() {
        assert_eq!(
            sorted(vec!["4.2.10", "4.2.2", "4.2.9"]),
            vec!["4.2.2", "4.2.9", "4.2.10"]
        );
    }

    #[test]
    fn test_natural_compare_mixed_chunks() {
        assert_eq!(natural_compare("4.0p1", "4.0p2"), Ordering::Less);
        assert_eq!(natural_compare("4.0", "4.0p1"), Ordering::Less);
        assert_eq!(natural_compare("4.10", "4.9"), Ordering::Greater);
        assert_eq!(natural_compare("6.0", "6.0"), Ordering::Equal);
    }

    #[test]
    fn test_natural_compare_case_insensitive() {
        assert_eq!(natural_compare("GIT", "git"), Ordering::Equal);
    }

    #[test]
    fn test_matches_wildcard() {
        assert!(matches_wildcard("4.2.*", "4.2.3").unwrap());
        assert!(matches_wildcard("4.2.*", "4.2").unwrap());
        assert!(matches_wildcard("4.2.*", "4.2p1").unwrap());
        assert!(!matches_wildcard("4.2.*", "4.3.0").unwrap());
        assert!(!matches_wildcard("4.2.*", "4.20").unwrap());
    }

    #[test]
    fn test_matches_exact() {
        assert!(matches_wildcard("6.0.1", "6.0.1").unwrap());
        assert!(!matches_wildcard("6.0.1", "6.0").unwrap());
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        assert!(matches_wildcard("4.*.2", "4.1.2").is_err());
        assert!(matches_wildcard("*", "4.1").is_err());
        assert!(matches_wildcard("4.?", "4.1").is_err());
        assert!(matches_wildcard(".*", "4.1").is_err());
    }
}
