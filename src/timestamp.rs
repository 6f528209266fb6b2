//! Timestamp tag parsing and rewriting.
//!
//! Four tag shapes are recognised, always tried in this order:
//! - `[mm:ss]`, `[mm:ss.fff]`, `[mm:ss:ff]` (LRC line tags)
//! - `[start,duration]` (YRC/QRC line tags, milliseconds)
//! - `[start]` (bare millisecond tags)
//! - `(start,...)` (word-level timing groups)
//!
//! Only the first tag of a line decides its start time. Rewriting touches
//! every tag of every shape.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// ============================================================================
// TAG PATTERNS
// ============================================================================

/// `[mm:ss]` with an optional `.fff` / `:ff` fraction.
pub static LRC_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,2}):(\d{1,2})(?:[.:](\d{1,3}))?\]").unwrap());

/// `[start,duration]`, both in milliseconds.
pub static START_DURATION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+),\s*(\d+)\]").unwrap());

/// `[start]` in milliseconds.
pub static START_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").unwrap());

/// `(start,duration,...)`; group 1 holds the whole comma-separated body.
pub static PAREN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+(?:,\d+)*)\)").unwrap());

// ============================================================================
// TAG SHAPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagShape {
    Lrc,
    StartDuration,
    Start,
    Paren,
}

impl TagShape {
    /// Shapes in lookup priority order.
    pub const ALL: [TagShape; 4] = [
        TagShape::Lrc,
        TagShape::StartDuration,
        TagShape::Start,
        TagShape::Paren,
    ];

    pub fn pattern(self) -> &'static Regex {
        match self {
            TagShape::Lrc => &*LRC_TAG,
            TagShape::StartDuration => &*START_DURATION_TAG,
            TagShape::Start => &*START_TAG,
            TagShape::Paren => &*PAREN_TAG,
        }
    }

    /// Start time in milliseconds of a tag captured by [`TagShape::pattern`].
    /// Returns None when a number does not fit in an i64.
    pub fn start_ms(self, caps: &Captures<'_>) -> Option<i64> {
        match self {
            TagShape::Lrc => {
                let minutes: i64 = caps[1].parse().ok()?;
                let seconds: i64 = caps[2].parse().ok()?;
                let fraction = match caps.get(3) {
                    Some(m) => fraction_ms(m.as_str())?,
                    None => 0,
                };
                Some(minutes * 60_000 + seconds * 1_000 + fraction)
            }
            TagShape::StartDuration | TagShape::Start => caps[1].parse().ok(),
            TagShape::Paren => caps[1].split(',').next()?.parse().ok(),
        }
    }

    /// Render the captured tag shifted by `offset` milliseconds.
    ///
    /// Returns None when the shifted start would be negative, meaning the
    /// tag should be removed. Tags whose numbers cannot be read are kept
    /// as they are.
    pub fn shift(self, caps: &Captures<'_>, offset: i64) -> Option<String> {
        let Some(start) = self.start_ms(caps) else {
            return Some(caps[0].to_string());
        };
        let shifted = start.saturating_add(offset);
        if shifted < 0 {
            return None;
        }

        let rendered = match self {
            TagShape::Lrc => format_lrc_timestamp(shifted),
            TagShape::StartDuration => format!("[{},{}]", shifted, &caps[2]),
            TagShape::Start => format!("[{}]", shifted),
            TagShape::Paren => match caps[1].split_once(',') {
                Some((_, rest)) => format!("({},{})", shifted, rest),
                None => format!("({})", shifted),
            },
        };
        Some(rendered)
    }
}

// ============================================================================
// PARSING AND RENDERING
// ============================================================================

/// A three-digit fraction is milliseconds, anything else is centiseconds.
fn fraction_ms(digits: &str) -> Option<i64> {
    let value: i64 = digits.parse().ok()?;
    if digits.len() == 3 {
        Some(value)
    } else {
        Some(value * 10)
    }
}

/// Start time of a line in milliseconds.
///
/// The first shape (in [`TagShape::ALL`] order) that occurs anywhere in the
/// line decides; its leftmost occurrence is used.
/// e.g., "[01:02.50]text" → Some(62500), "[1200,800](1200,400,0)word" → Some(1200)
pub fn parse_start_ms(line: &str) -> Option<i64> {
    for shape in TagShape::ALL {
        if let Some(caps) = shape.pattern().captures(line) {
            return shape.start_ms(&caps);
        }
    }
    None
}

/// Render milliseconds as an LRC `[mm:ss.cc]` tag.
/// Negative values clamp to zero; rounding is half-up to centiseconds.
pub fn format_lrc_timestamp(ms: i64) -> String {
    let centi = ms.max(0).saturating_add(5) / 10;
    let minutes = centi / 6_000;
    let seconds = (centi % 6_000) / 100;
    let centiseconds = centi % 100;
    format!("[{:02}:{:02}.{:02}]", minutes, seconds, centiseconds)
}

/// Shift every recognised tag on a line by `offset` milliseconds.
/// Tags that would become negative are removed; the rest of the line is untouched.
pub fn shift_tags(line: &str, offset: i64) -> String {
    TagShape::ALL.iter().fold(line.to_string(), |acc, &shape| {
        shape
            .pattern()
            .replace_all(&acc, |caps: &Captures<'_>| {
                shape.shift(caps, offset).unwrap_or_default()
            })
            .into_owned()
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lrc_fractions() {
        assert_eq!(parse_start_ms("[01:02.50]text"), Some(62_500));
        assert_eq!(parse_start_ms("[01:02.500]text"), Some(62_500));
        assert_eq!(parse_start_ms("[00:05.123]text"), Some(5_123));
        // One digit is still centiseconds
        assert_eq!(parse_start_ms("[00:05.5]text"), Some(5_050));
        // Colon separated fraction
        assert_eq!(parse_start_ms("[00:05:20]text"), Some(5_200));
        assert_eq!(parse_start_ms("[3:07]text"), Some(187_000));
    }

    #[test]
    fn test_parse_millisecond_shapes() {
        assert_eq!(parse_start_ms("[12000,3400]line"), Some(12_000));
        assert_eq!(parse_start_ms("[12000, 3400]line"), Some(12_000));
        assert_eq!(parse_start_ms("[1500]line"), Some(1_500));
        assert_eq!(parse_start_ms("(300,200,0)word"), Some(300));
        assert_eq!(parse_start_ms("(42)word"), Some(42));
    }

    #[test]
    fn test_parse_uses_first_shape_then_first_tag() {
        // Word-level YRC line: the line tag wins over the word groups
        assert_eq!(parse_start_ms("[1000,2000](1000,500,0)Hel(1500,500,0)lo"), Some(1_000));
        // Two LRC tags on one line: leftmost wins
        assert_eq!(parse_start_ms("[00:20.00][00:40.00]chorus"), Some(20_000));
        // LRC shape takes priority even when it appears later in the line
        assert_eq!(parse_start_ms("(500,100,0)x[00:01.00]"), Some(1_000));
    }

    #[test]
    fn test_parse_absent() {
        assert_eq!(parse_start_ms("plain text"), None);
        assert_eq!(parse_start_ms("[ti:Song Title]"), None);
        assert_eq!(parse_start_ms(""), None);
        // Overflowing number is absent, not an error
        assert_eq!(parse_start_ms("[99999999999999999999999]x"), None);
    }

    #[test]
    fn test_format_lrc_timestamp() {
        assert_eq!(format_lrc_timestamp(0), "[00:00.00]");
        assert_eq!(format_lrc_timestamp(1_000), "[00:01.00]");
        assert_eq!(format_lrc_timestamp(61_234), "[01:01.23]");
        assert_eq!(format_lrc_timestamp(61_235), "[01:01.24]");
        assert_eq!(format_lrc_timestamp(59_999), "[01:00.00]");
        assert_eq!(format_lrc_timestamp(6_000_000), "[100:00.00]");
        assert_eq!(format_lrc_timestamp(-20), "[00:00.00]");
        // Saturated shifts still render
        assert_eq!(format_lrc_timestamp(i64::MAX), "[153722867280912:55.80]");
    }

    #[test]
    fn test_shift_tags_lrc() {
        assert_eq!(shift_tags("[00:11.00]hello", -10_000), "[00:01.00]hello");
        assert_eq!(shift_tags("[00:11.123]hello", 1_000), "[00:12.12]hello");
        // The negative tag disappears, the other one is shifted
        assert_eq!(shift_tags("[00:01.00][00:20.00]chorus", -5_000), "[00:15.00]chorus");
    }

    #[test]
    fn test_shift_tags_word_level() {
        assert_eq!(
            shift_tags("[12000,3000](12000,500,0)a(12500,500,0)b", -2_000),
            "[10000,3000](10000,500,0)a(10500,500,0)b"
        );
        assert_eq!(shift_tags("[1500]x", 500), "[2000]x");
        // A word group that would start before zero is removed, the rest shift
        assert_eq!(
            shift_tags("[5000,1000](5000,500,0)a(100,500,0)b", -2_000),
            "[3000,1000](3000,500,0)ab"
        );
        assert_eq!(shift_tags("[12000, 3000]x", 1_000), "[13000,3000]x");
    }

    #[test]
    fn test_shift_tags_keeps_text() {
        assert_eq!(shift_tags("no tags here", 5_000), "no tags here");
        assert_eq!(shift_tags("[ar:Singer]", 5_000), "[ar:Singer]");
    }
}
