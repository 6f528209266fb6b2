//! Alignment tunables.

use crate::metadata::MetadataKeywords;

/// Leading reference entries that must line up to confirm an anchor
pub const ANCHOR_LINES: usize = 3;

/// Candidate entries the fuzzy matcher may join into one reference line
pub const FUZZY_LOOKAHEAD: usize = 10;

/// Offsets smaller than this (in ms, either direction) are treated as drift noise
pub const DEAD_ZONE_MS: i64 = 1_500;

/// Configuration injected into every alignment call.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    pub keywords: MetadataKeywords,
    pub anchor_lines: usize,
    pub fuzzy_lookahead: usize,
    pub dead_zone_ms: i64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            keywords: MetadataKeywords::default(),
            anchor_lines: ANCHOR_LINES,
            fuzzy_lookahead: FUZZY_LOOKAHEAD,
            dead_zone_ms: DEAD_ZONE_MS,
        }
    }
}

impl AlignConfig {
    pub fn with_keywords(mut self, keywords: MetadataKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    /// At least one line is always required.
    pub fn with_anchor_lines(mut self, lines: usize) -> Self {
        self.anchor_lines = lines.max(1);
        self
    }

    /// At least one entry is always examined.
    pub fn with_fuzzy_lookahead(mut self, lookahead: usize) -> Self {
        self.fuzzy_lookahead = lookahead.max(1);
        self
    }

    pub fn with_dead_zone_ms(mut self, dead_zone_ms: i64) -> Self {
        self.dead_zone_ms = dead_zone_ms.max(0);
        self
    }
}
