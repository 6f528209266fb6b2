//! Entry building: cleaned transcript → ordered comparable entries.

use crate::models::LyricEntry;
use crate::normalize::normalize_line;
use crate::timestamp::parse_start_ms;

/// Split a transcript on `\n`, dropping a trailing `\r` from each line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Build entries for every line that normalizes to something non-empty.
///
/// `line_index` is the line's position in `cleaned`; skipped lines simply
/// leave a gap in the indices.
pub fn build_entries(cleaned: &str) -> Vec<LyricEntry> {
    split_lines(cleaned)
        .enumerate()
        .filter_map(|(line_index, line)| {
            let normalized = normalize_line(line);
            if normalized.is_empty() {
                return None;
            }
            Some(LyricEntry {
                line_index,
                normalized,
                start_ms: parse_start_ms(line),
            })
        })
        .collect()
}
