//! Metadata header/footer stripping.
//!
//! Lyric providers pad transcripts with credit lines (lyricist, composer,
//! producer), uploader notes and copyright disclaimers, usually as timed
//! lines at the top and bottom. Stripping keeps the inclusive range from the
//! first confirmed content line to the last one; the interior is never
//! touched, and ambiguous input is returned unchanged.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// `[ti:...]`, `[ar:...]`, `[al:...]`, `[by:...]`, `[offset:...]`, `[ch:...]`
pub static PROTECTED_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\[(?:ti|ar|al|by|offset|ch):").unwrap());

/// Line starting with a bracketed run of digits, colons, commas, dots or spaces.
pub static TIMED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[[\d,:.\s]+\]").unwrap());

/// Bracket or brace tags removed before keyword matching.
static TAG_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]|\{[^}]*\}").unwrap());

/// Word-level timing groups: `(1000,500,0)`.
static NUMERIC_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d+(?:,\d+)*\)").unwrap());

/// Any parenthesised span, used to decide whether a timed line has content at all.
static PAREN_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

// ============================================================================
// KEYWORDS
// ============================================================================

/// Built-in credit and disclaimer keywords.
pub const DEFAULT_METADATA_KEYWORDS: &[&str] = &[
    // Chinese credits (simplified and traditional)
    "作词", "作詞", "作曲", "编曲", "編曲", "词：", "词:", "曲：", "曲:",
    "制作人", "製作人", "监制", "監製", "混音", "母带", "母帶", "录音", "錄音",
    "和声", "和聲", "配唱", "吉他", "贝斯", "貝斯", "弦乐", "弦樂",
    "出品", "发行", "發行", "企划", "企劃", "统筹", "統籌", "版权", "版權",
    "未经许可", "未經許可", "不得翻唱",
    // English credits
    "Lyricist", "Composer", "Arranger", "Producer",
    "Lyrics by", "Composed by", "Arranged by", "Produced by", "Written by",
    "Mixed by", "Mastered by", "Recorded by",
];

/// Ordered list of substrings marking a line as metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKeywords {
    keywords: Vec<String>,
}

impl MetadataKeywords {
    /// Build from any list; blank entries are dropped since they would match every line.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.trim().is_empty())
            .collect();
        Self { keywords }
    }

    /// Parse a JSON array of strings.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let keywords: Vec<String> = serde_json::from_str(json)
            .context("Metadata keywords must be a JSON array of strings")?;
        Ok(Self::new(keywords))
    }

    /// Load a JSON array of strings from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid keyword file {}", path.display()))
    }

    /// True when `text` contains any keyword.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for MetadataKeywords {
    fn default() -> Self {
        Self::new(DEFAULT_METADATA_KEYWORDS.iter().copied())
    }
}

// ============================================================================
// LINE CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// Blank, header, untimed or tag-only: never a scan boundary
    Skip,
    Metadata,
    Content,
}

/// Metadata check on a raw line. Protected headers never count.
pub fn is_metadata_line(line: &str, keywords: &MetadataKeywords) -> bool {
    let trimmed = line.trim();
    if PROTECTED_HEADER.is_match(trimmed) {
        return false;
    }
    let untagged = TAG_SPAN.replace_all(trimmed, "");
    let untagged = NUMERIC_GROUP.replace_all(&untagged, "");
    keywords.matches(untagged.trim())
}

fn classify(line: &str, keywords: &MetadataKeywords) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() || PROTECTED_HEADER.is_match(trimmed) || !TIMED_LINE.is_match(trimmed) {
        return LineKind::Skip;
    }

    let without_brackets = TAG_SPAN.replace_all(trimmed, "");
    if PAREN_SPAN.replace_all(&without_brackets, "").trim().is_empty() {
        return LineKind::Skip;
    }

    if is_metadata_line(trimmed, keywords) {
        LineKind::Metadata
    } else {
        LineKind::Content
    }
}

// ============================================================================
// SCANS
// ============================================================================

/// Forward scan for the first confirmed content line.
///
/// The first considered line is only tentative: a metadata line after it
/// resets it, and the next content line confirms whichever start is pending.
/// An unconfirmed scan starts at line 0.
fn content_start(lines: &[&str], keywords: &MetadataKeywords) -> usize {
    let mut tentative: Option<usize> = None;
    let mut seen_first = false;

    for (i, line) in lines.iter().enumerate() {
        match classify(line, keywords) {
            LineKind::Skip => {}
            LineKind::Metadata => {
                seen_first = true;
                tentative = None;
            }
            LineKind::Content if !seen_first => {
                seen_first = true;
                tentative = Some(i);
            }
            LineKind::Content => return tentative.unwrap_or(i),
        }
    }
    0
}

/// Backward scan, down to `start`, for the last content line.
fn content_end(lines: &[&str], start: usize, keywords: &MetadataKeywords) -> Option<usize> {
    (start..lines.len())
        .rev()
        .find(|&i| classify(lines[i], keywords) == LineKind::Content)
}

/// Remove leading and trailing metadata blocks from a transcript.
///
/// Returns the input unchanged when no content line can be found.
pub fn strip_metadata(text: &str, keywords: &MetadataKeywords) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let start = content_start(&lines, keywords);

    match content_end(&lines, start, keywords) {
        Some(end) => lines[start..=end].join("\n"),
        None => text.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
