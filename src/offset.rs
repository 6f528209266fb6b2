//! Offset computation and transcript re-timing.

use tracing::trace;

use crate::entries::split_lines;
use crate::models::LyricEntry;
use crate::timestamp::{parse_start_ms, shift_tags};

/// Single-glyph speaker markers used in duet transcripts (male / female / both).
pub const CAST_MARKERS: [&str; 3] = ["男", "女", "合"];

pub fn is_cast_marker(normalized: &str) -> bool {
    CAST_MARKERS.contains(&normalized)
}

/// First reference entry that is not a lone cast marker, else the first entry.
pub fn reference_anchor(reference: &[LyricEntry]) -> Option<&LyricEntry> {
    reference
        .iter()
        .find(|e| !is_cast_marker(&e.normalized))
        .or_else(|| reference.first())
}

/// Offsets strictly inside the dead zone collapse to zero.
pub fn apply_dead_zone(offset_ms: i64, dead_zone_ms: i64) -> i64 {
    if offset_ms.saturating_abs() < dead_zone_ms {
        0
    } else {
        offset_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetCalc {
    pub reference_ms: i64,
    pub candidate_ms: i64,
    pub raw_ms: i64,
    pub applied_ms: i64,
}

/// Shift that moves the candidate anchor onto the reference anchor.
/// Absent start times count as 0.
pub fn compute_offset(
    reference_anchor: &LyricEntry,
    candidate_anchor: &LyricEntry,
    dead_zone_ms: i64,
) -> OffsetCalc {
    let reference_ms = reference_anchor.start_ms.unwrap_or(0);
    let candidate_ms = candidate_anchor.start_ms.unwrap_or(0);
    let raw_ms = reference_ms.saturating_sub(candidate_ms);

    OffsetCalc {
        reference_ms,
        candidate_ms,
        raw_ms,
        applied_ms: apply_dead_zone(raw_ms, dead_zone_ms),
    }
}

/// Shift one line by `offset` milliseconds.
///
/// Returns None when the line's own start would go negative: the whole line
/// is dropped rather than clamped, so lines never bunch up at zero. Other
/// tags on a kept line that go negative are removed individually.
pub fn shift_line(line: &str, offset: i64) -> Option<String> {
    if offset == 0 {
        return Some(line.to_string());
    }
    if let Some(start) = parse_start_ms(line) {
        if start.saturating_add(offset) < 0 {
            return None;
        }
    }
    Some(shift_tags(line, offset))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    pub dropped_lines: usize,
}

/// Re-time a whole transcript.
///
/// A zero offset returns the text verbatim. Otherwise surviving lines are
/// joined with the input's own separator (`\r\n` if it has one, else `\n`).
pub fn rewrite_transcript(text: &str, offset: i64) -> Rewritten {
    if offset == 0 {
        return Rewritten {
            text: text.to_string(),
            dropped_lines: 0,
        };
    }

    let separator = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut kept = Vec::new();
    let mut dropped_lines = 0;

    for (i, line) in split_lines(text).enumerate() {
        match shift_line(line, offset) {
            Some(shifted) => kept.push(shifted),
            None => {
                trace!(line = i, offset, "Dropping line that would start before zero");
                dropped_lines += 1;
            }
        }
    }

    Rewritten {
        text: kept.join(separator),
        dropped_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::format_lrc_timestamp;
    use proptest::prelude::*;

    fn entry(normalized: &str, start_ms: Option<i64>) -> LyricEntry {
        LyricEntry {
            line_index: 0,
            normalized: normalized.to_string(),
            start_ms,
        }
    }

    #[test]
    fn test_reference_anchor_skips_cast_markers() {
        let reference = vec![
            entry("男", Some(500)),
            entry("女", Some(800)),
            entry("hello", Some(1_000)),
        ];
        assert_eq!(reference_anchor(&reference).unwrap().normalized, "hello");

        let all_markers = vec![entry("男", Some(500)), entry("合", Some(900))];
        assert_eq!(reference_anchor(&all_markers).unwrap().start_ms, Some(500));

        assert!(reference_anchor(&[]).is_none());
        // Only a lone glyph is a marker
        assert!(!is_cast_marker("男生"));
    }

    #[test]
    fn test_compute_offset() {
        let calc = compute_offset(&entry("a", Some(1_000)), &entry("a", Some(11_000)), 1_500);
        assert_eq!(calc.raw_ms, -10_000);
        assert_eq!(calc.applied_ms, -10_000);

        // Absent times default to zero
        let calc = compute_offset(&entry("a", None), &entry("a", Some(4_000)), 1_500);
        assert_eq!(calc.raw_ms, -4_000);
        let calc = compute_offset(&entry("a", Some(4_000)), &entry("a", None), 1_500);
        assert_eq!(calc.raw_ms, 4_000);
    }

    #[test]
    fn test_dead_zone_boundaries() {
        assert_eq!(apply_dead_zone(1_499, 1_500), 0);
        assert_eq!(apply_dead_zone(-1_499, 1_500), 0);
        assert_eq!(apply_dead_zone(1_500, 1_500), 1_500);
        assert_eq!(apply_dead_zone(-1_500, 1_500), -1_500);
        assert_eq!(apply_dead_zone(i64::MIN, 1_500), i64::MIN);
    }

    #[test]
    fn test_shift_line_drops_negative_start() {
        assert_eq!(shift_line("[00:01.00]intro", -5_000), None);
        assert_eq!(shift_line("[00:06.00]verse", -5_000), Some("[00:01.00]verse".to_string()));
        // Untimed lines pass through
        assert_eq!(shift_line("[ti:Song]", -5_000), Some("[ti:Song]".to_string()));
        assert_eq!(shift_line("", -5_000), Some(String::new()));
    }

    #[test]
    fn test_shift_line_blanks_secondary_tag() {
        // Primary tag survives, so the line stays and only the late tag moves
        assert_eq!(
            shift_line("[00:30.00][00:02.00]chorus", -10_000),
            Some("[00:20.00]chorus".to_string())
        );
        // Same rule across shapes: the bare millisecond tag goes, the line stays
        assert_eq!(
            shift_line("[00:30.00][1000]x", -2_000),
            Some("[00:28.00]x".to_string())
        );
    }

    #[test]
    fn test_rewrite_transcript() {
        let text = "[ti:Song]\n[00:02.00]too early\n[00:11.00]hello\n[00:14.00]world";
        let rewritten = rewrite_transcript(text, -10_000);
        assert_eq!(rewritten.text, "[ti:Song]\n[00:01.00]hello\n[00:04.00]world");
        assert_eq!(rewritten.dropped_lines, 1);
    }

    #[test]
    fn test_rewrite_transcript_keeps_crlf() {
        let text = "[00:11.00]hello\r\n[00:14.00]world\r\n";
        let rewritten = rewrite_transcript(text, 2_000);
        assert_eq!(rewritten.text, "[00:13.00]hello\r\n[00:16.00]world\r\n");
    }

    #[test]
    fn test_rewrite_zero_offset_is_identity() {
        let text = "[ti:x]\r\n[00:01.00]a\n\n  [00:02.00]b  \r\n";
        assert_eq!(rewrite_transcript(text, 0).text, text);
    }

    proptest! {
        #[test]
        fn prop_dead_zone_zeroes_small_offsets(offset in -1_499i64..1_500) {
            prop_assert_eq!(apply_dead_zone(offset, 1_500), 0);
        }

        #[test]
        fn prop_rewrite_never_goes_negative(
            starts in prop::collection::vec(0i64..600_000, 1..20),
            offset in -300_000i64..300_000,
        ) {
            // Centisecond-aligned starts so LRC rendering is exact
            let lines: Vec<String> = starts
                .iter()
                .enumerate()
                .map(|(i, &ms)| format!("{}line {}", format_lrc_timestamp(ms / 10 * 10), i))
                .collect();
            let text = lines.join("\n");
            let rewritten = rewrite_transcript(&text, offset);

            let expected_kept = starts.iter().filter(|&&ms| ms / 10 * 10 + offset >= 0).count();
            let out_lines: Vec<&str> = if rewritten.text.is_empty() {
                Vec::new()
            } else {
                rewritten.text.split('\n').collect()
            };
            prop_assert_eq!(out_lines.len(), expected_kept);
            prop_assert!(out_lines.len() <= lines.len());
            for line in out_lines {
                let start = parse_start_ms(line);
                prop_assert!(start.map_or(false, |ms| ms >= 0));
            }
        }
    }
}
