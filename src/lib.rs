//! Lyric alignment library - re-times a candidate lyric transcript against a
//! trusted reference transcript of the same song.
//!
//! Used by the `lyric-align` binary; the alignment modules are pure and safe
//! to call from many threads at once. `progress` and `safety` exist for the
//! CLI's file handling.

pub mod align;
pub mod config;
pub mod entries;
pub mod matcher;
pub mod metadata;
pub mod models;
pub mod normalize;
pub mod offset;
pub mod progress;
pub mod safety;
pub mod timestamp;

pub use align::{align_candidate_lyrics, align_lyrics, AlignOutcome, PassthroughReason};
pub use config::AlignConfig;
pub use metadata::MetadataKeywords;
pub use models::{AlignReport, BatchStats, LyricEntry, MatchMode};
