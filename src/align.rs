//! Public alignment entry points.
//!
//! Pipeline: strip metadata → build entries → find anchor → compute offset
//! → rewrite the original candidate text.

use tracing::debug;

use crate::config::AlignConfig;
use crate::entries::build_entries;
use crate::matcher::find_anchor;
use crate::metadata::strip_metadata;
use crate::models::AlignReport;
use crate::offset::{compute_offset, reference_anchor, rewrite_transcript};

/// Why a candidate was handed back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    /// No reference, or a blank one
    MissingReference,
    /// Reference had nothing left after metadata stripping
    EmptyReference,
    /// One side produced no comparable entries
    NoEntries,
}

/// Result of one alignment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignOutcome {
    /// Candidate was empty
    Rejected,
    /// Nothing to align against; the candidate stands as-is
    Passthrough(PassthroughReason),
    /// Content is not recognisably the same song
    Unmatched,
    Aligned { text: String, report: AlignReport },
}

impl AlignOutcome {
    /// Collapse to the text contract: None for rejected or unmatched input,
    /// the candidate itself for a passthrough, the re-timed text otherwise.
    pub fn into_text(self, candidate: &str) -> Option<String> {
        match self {
            AlignOutcome::Rejected | AlignOutcome::Unmatched => None,
            AlignOutcome::Passthrough(_) => Some(candidate.to_string()),
            AlignOutcome::Aligned { text, .. } => Some(text),
        }
    }

    pub fn report(&self) -> Option<&AlignReport> {
        match self {
            AlignOutcome::Aligned { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Align `candidate` against `reference` and describe what happened.
pub fn align_lyrics(
    candidate: &str,
    reference: Option<&str>,
    config: &AlignConfig,
) -> AlignOutcome {
    if candidate.is_empty() {
        return AlignOutcome::Rejected;
    }
    let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
        return AlignOutcome::Passthrough(PassthroughReason::MissingReference);
    };

    let cleaned_reference = strip_metadata(reference, &config.keywords);
    if cleaned_reference.trim().is_empty() {
        return AlignOutcome::Passthrough(PassthroughReason::EmptyReference);
    }
    let cleaned_candidate = strip_metadata(candidate, &config.keywords);

    let reference_entries = build_entries(&cleaned_reference);
    let candidate_entries = build_entries(&cleaned_candidate);
    debug!(
        reference = reference_entries.len(),
        candidate = candidate_entries.len(),
        "Built lyric entries"
    );

    let Some(reference_entry) = reference_anchor(&reference_entries) else {
        return AlignOutcome::Passthrough(PassthroughReason::NoEntries);
    };
    if candidate_entries.is_empty() {
        return AlignOutcome::Passthrough(PassthroughReason::NoEntries);
    }

    let Some(anchor) = find_anchor(&reference_entries, &candidate_entries, config) else {
        return AlignOutcome::Unmatched;
    };
    let candidate_entry = &candidate_entries[anchor.index];

    let offset = compute_offset(reference_entry, candidate_entry, config.dead_zone_ms);
    debug!(
        raw_ms = offset.raw_ms,
        applied_ms = offset.applied_ms,
        mode = ?anchor.mode,
        "Computed alignment offset"
    );

    let rewritten = rewrite_transcript(candidate, offset.applied_ms);

    let report = AlignReport {
        match_mode: anchor.mode,
        matched_entry: anchor.index,
        matched_line: candidate_entry.line_index,
        reference_entries: reference_entries.len(),
        candidate_entries: candidate_entries.len(),
        reference_anchor_ms: offset.reference_ms,
        candidate_anchor_ms: offset.candidate_ms,
        raw_offset_ms: offset.raw_ms,
        applied_offset_ms: offset.applied_ms,
        dropped_lines: rewritten.dropped_lines,
    };

    AlignOutcome::Aligned {
        text: rewritten.text,
        report,
    }
}

/// Re-time `candidate` so it agrees with `reference`.
///
/// - empty candidate → None
/// - missing/blank reference, or nothing comparable on either side → candidate unchanged
/// - no recognisable overlap → None
/// - otherwise the re-timed candidate (unchanged when the offset is in the dead zone)
pub fn align_candidate_lyrics(
    candidate: &str,
    reference: Option<&str>,
    config: &AlignConfig,
) -> Option<String> {
    align_lyrics(candidate, reference, config).into_text(candidate)
}
