//! Comparison keys for lyric lines.
//!
//! A normalized line has every timing tag removed, is NFKC-folded and
//! lowercased, and carries no punctuation or whitespace. It is only ever
//! compared, never shown.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Any `[...]` span: LRC/YRC line tags and `[ti:...]`-style headers.
pub static BRACKET_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Word-level timing groups: `(1000,500,0)`.
pub static NUMERIC_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\d+(?:,\d+)*\)").unwrap());

/// Whitespace, ASCII punctuation and the CJK punctuation that survives NFKC.
pub static PUNCTUATION_AND_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"[\s!"#$%&'()*+,\-./:;<=>?@\[\]^_`{|}~·！？。，、；：“”‘’（）【】《》〈〉—…～]"##)
        .unwrap()
});

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Normalize a raw lyric line into its comparison key.
/// e.g., "[00:01.00]Hello, World!" → "helloworld"
///       "[1000,2000](1000,500,0)Ｈｉ(1500,500,0)！" → "hi"
pub fn normalize_line(line: &str) -> String {
    let untagged = BRACKET_SPAN.replace_all(line, "");
    let untagged = NUMERIC_GROUP.replace_all(&untagged, "");

    // Compatibility fold before lowercasing so full-width forms fold too
    let folded = untagged.nfkc().collect::<String>().to_lowercase();

    PUNCTUATION_AND_SPACE.replace_all(&folded, "").into_owned()
}

/// Drop plain spaces from an already normalized key.
pub fn strip_spaces(s: &str) -> String {
    s.chars().filter(|&c| c != ' ').collect()
}

// ============================================================================
// TESTS
// ============================================================================
