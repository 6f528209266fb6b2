//! Anchor matching between reference and candidate entries.
//!
//! Two tiers, tried in order:
//! - exact: a window of candidate keys equal to the reference's leading keys
//! - fuzzy: each leading reference key rebuilt by concatenating consecutive
//!   candidate keys (tolerates different line-wrap conventions)

use tracing::debug;

use crate::config::AlignConfig;
use crate::models::{AnchorMatch, LyricEntry, MatchMode};
use crate::normalize::strip_spaces;

/// Find the candidate entry aligned with the start of the reference.
///
/// `k = min(anchor_lines, |reference|)` leading reference entries must be
/// accounted for. Returns None when neither tier finds a window; that means
/// the content is not recognisably the same song.
pub fn find_anchor(
    reference: &[LyricEntry],
    candidate: &[LyricEntry],
    config: &AlignConfig,
) -> Option<AnchorMatch> {
    let required = config.anchor_lines.min(reference.len());

    if let Some(index) = exact_match(reference, candidate, required) {
        debug!(index, required, "Exact anchor match");
        return Some(AnchorMatch {
            index,
            mode: MatchMode::Exact,
        });
    }

    let found = fuzzy_match(reference, candidate, required, config.fuzzy_lookahead);
    match found {
        Some(index) => debug!(index, required, "Fuzzy anchor match"),
        None => debug!(
            required,
            reference = reference.len(),
            candidate = candidate.len(),
            "No anchor match"
        ),
    }
    found.map(|index| AnchorMatch {
        index,
        mode: MatchMode::Fuzzy,
    })
}

/// Lowest window start whose `required` keys equal the reference's, position by position.
pub fn exact_match(
    reference: &[LyricEntry],
    candidate: &[LyricEntry],
    required: usize,
) -> Option<usize> {
    if required == 0 || reference.len() < required || candidate.len() < required {
        return None;
    }
    let head = &reference[..required];

    candidate.windows(required).position(|window| {
        window
            .iter()
            .zip(head)
            .all(|(c, r)| c.normalized == r.normalized)
    })
}

/// Lowest window start from which every leading reference key can be
/// consumed as a concatenation of consecutive candidate keys.
///
/// Each reference key may draw on at most `lookahead` candidate entries,
/// starting right after the entries the previous key consumed.
pub fn fuzzy_match(
    reference: &[LyricEntry],
    candidate: &[LyricEntry],
    required: usize,
    lookahead: usize,
) -> Option<usize> {
    if required == 0 || reference.len() < required || candidate.len() < required {
        return None;
    }

    let needles: Vec<String> = reference[..required]
        .iter()
        .map(|e| strip_spaces(&e.normalized))
        .collect();
    let pieces: Vec<String> = candidate.iter().map(|e| strip_spaces(&e.normalized)).collect();

    (0..=candidate.len() - required)
        .find(|&start| consumes_all(&needles, &pieces, start, lookahead))
}

fn consumes_all(needles: &[String], pieces: &[String], start: usize, lookahead: usize) -> bool {
    let mut cursor = start;

    for needle in needles {
        let mut remaining = needle.as_str();
        let window_end = pieces.len().min(cursor.saturating_add(lookahead));

        for (i, piece) in pieces.iter().enumerate().take(window_end).skip(cursor) {
            match remaining.strip_prefix(piece.as_str()) {
                Some(rest) => {
                    remaining = rest;
                    cursor = i + 1;
                }
                None => break,
            }
            if remaining.is_empty() {
                break;
            }
        }

        if !remaining.is_empty() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(keys: &[&str]) -> Vec<LyricEntry> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| LyricEntry {
                line_index: i,
                normalized: k.to_string(),
                start_ms: Some(i as i64 * 1_000),
            })
            .collect()
    }

    #[test]
    fn test_exact_match_first_window() {
        let reference = entries(&["a", "b", "c", "d"]);
        let candidate = entries(&["x", "a", "b", "c", "a", "b", "c"]);
        assert_eq!(exact_match(&reference, &candidate, 3), Some(1));
    }

    #[test]
    fn test_exact_match_requires_full_window() {
        let reference = entries(&["a", "b", "c"]);
        assert_eq!(exact_match(&reference, &entries(&["a", "b", "x"]), 3), None);
        assert_eq!(exact_match(&reference, &entries(&["a", "b"]), 3), None);
        assert_eq!(exact_match(&reference, &entries(&["a", "b"]), 0), None);
    }

    #[test]
    fn test_fuzzy_match_split_lines() {
        let reference = entries(&["helloworld", "second", "third"]);
        let candidate = entries(&["hello", "world", "second", "third"]);
        assert_eq!(exact_match(&reference, &candidate, 3), None);
        assert_eq!(fuzzy_match(&reference, &candidate, 3, 10), Some(0));
    }

    #[test]
    fn test_fuzzy_match_single_reference_line() {
        let reference = entries(&["helloworld"]);
        let candidate = entries(&["intro", "hello", "world"]);
        assert_eq!(fuzzy_match(&reference, &candidate, 1, 10), Some(1));
    }

    #[test]
    fn test_fuzzy_match_breaks_on_non_prefix() {
        // Candidate line longer than the reference line cannot be consumed
        let reference = entries(&["hello", "world"]);
        let candidate = entries(&["helloworld"]);
        assert_eq!(fuzzy_match(&reference, &candidate, 2, 10), None);

        let reference = entries(&["abc"]);
        let candidate = entries(&["ab", "x", "c"]);
        assert_eq!(fuzzy_match(&reference, &candidate, 1, 10), None);
    }

    #[test]
    fn test_fuzzy_match_respects_lookahead() {
        let reference = entries(&["abcd"]);
        let candidate = entries(&["a", "b", "c", "d"]);
        assert_eq!(fuzzy_match(&reference, &candidate, 1, 4), Some(0));
        assert_eq!(fuzzy_match(&reference, &candidate, 1, 3), None);
    }

    #[test]
    fn test_find_anchor_prefers_exact() {
        let config = AlignConfig::default();
        let reference = entries(&["ab", "c", "d"]);
        // Fuzzy would accept index 0 ("a"+"b"), exact finds index 2
        let candidate = entries(&["a", "b", "ab", "c", "d"]);
        let anchor = find_anchor(&reference, &candidate, &config).unwrap();
        assert_eq!(anchor, AnchorMatch { index: 2, mode: MatchMode::Exact });
    }

    #[test]
    fn test_find_anchor_falls_back_to_fuzzy() {
        let config = AlignConfig::default();
        let reference = entries(&["ab", "c", "d"]);
        let candidate = entries(&["a", "b", "c", "d"]);
        let anchor = find_anchor(&reference, &candidate, &config).unwrap();
        assert_eq!(anchor, AnchorMatch { index: 0, mode: MatchMode::Fuzzy });
    }

    #[test]
    fn test_find_anchor_short_reference() {
        let config = AlignConfig::default();
        let reference = entries(&["only"]);
        let candidate = entries(&["x", "only", "y"]);
        assert_eq!(find_anchor(&reference, &candidate, &config).map(|a| a.index), Some(1));
    }

    #[test]
    fn test_find_anchor_unrelated_content() {
        let config = AlignConfig::default();
        let reference = entries(&["one", "two", "three"]);
        let candidate = entries(&["four", "five", "six"]);
        assert_eq!(find_anchor(&reference, &candidate, &config), None);
    }
}
