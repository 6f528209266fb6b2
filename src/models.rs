//! Core data models for lyric alignment.
//!
//! This module contains the entry records built from transcripts, the
//! matcher's result type and the serializable reports produced per
//! alignment and per batch.

use serde::Serialize;

use crate::align::AlignOutcome;

// ============================================================================
// Entries
// ============================================================================

/// One comparable line of a cleaned transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LyricEntry {
    /// 0-based position in the cleaned line sequence it was built from
    pub line_index: usize,
    /// Comparison key, never empty
    pub normalized: String,
    /// Start time of the line's first tag, if it has a readable one
    pub start_ms: Option<i64>,
}

// ============================================================================
// Matching
// ============================================================================

/// Which matcher tier found the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    Fuzzy,
}

/// Candidate entry aligned with the reference's first content entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    /// Index into the candidate entry list
    pub index: usize,
    pub mode: MatchMode,
}

// ============================================================================
// Reports
// ============================================================================

/// What a successful alignment decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignReport {
    pub match_mode: MatchMode,
    pub matched_entry: usize,
    pub matched_line: usize,
    pub reference_entries: usize,
    pub candidate_entries: usize,
    pub reference_anchor_ms: i64,
    pub candidate_anchor_ms: i64,
    /// Offset before the dead zone was applied
    pub raw_offset_ms: i64,
    pub applied_offset_ms: i64,
    pub dropped_lines: usize,
}

/// Aggregate counters for a batch run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchStats {
    pub total_pairs: usize,

    // Aligned outcomes
    pub shifted: usize,         // Offset applied
    pub already_aligned: usize, // Matched, offset inside the dead zone
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
    pub dropped_lines: usize,

    // Everything else
    pub passthrough: usize, // No usable reference, candidate kept as-is
    pub unmatched: usize,   // Content not recognisably the same song
    pub rejected: usize,    // Empty candidate
    pub io_errors: usize,

    pub elapsed_seconds: f64,
}

impl BatchStats {
    /// Count one alignment outcome.
    pub fn record(&mut self, outcome: &AlignOutcome) {
        self.total_pairs += 1;
        match outcome {
            AlignOutcome::Rejected => self.rejected += 1,
            AlignOutcome::Passthrough(_) => self.passthrough += 1,
            AlignOutcome::Unmatched => self.unmatched += 1,
            AlignOutcome::Aligned { report, .. } => {
                if report.applied_offset_ms == 0 {
                    self.already_aligned += 1;
                } else {
                    self.shifted += 1;
                }
                match report.match_mode {
                    MatchMode::Exact => self.exact_matches += 1,
                    MatchMode::Fuzzy => self.fuzzy_matches += 1,
                }
                self.dropped_lines += report.dropped_lines;
            }
        }
    }

    /// Count a pair that could not be read or written.
    pub fn record_io_error(&mut self) {
        self.total_pairs += 1;
        self.io_errors += 1;
    }

    /// Matched pairs as a percentage of all pairs
    pub fn match_rate(&self) -> f64 {
        if self.total_pairs == 0 {
            0.0
        } else {
            100.0 * (self.shifted + self.already_aligned) as f64 / self.total_pairs as f64
        }
    }

    /// Log stats to stderr in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS:{}]\n{}", phase, json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
