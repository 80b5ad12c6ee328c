//! Junk-line rules, evaluated in order against a normalized line

use super::vocabulary::Vocabulary;
use serde::Serialize;

/// Lines shorter than this (in characters) are recognition debris
pub const MIN_LINE_CHARS: usize = 3;
/// Lines with at least this many digits anywhere are barcodes or SKUs
pub const BARCODE_MIN_DIGITS: usize = 7;

/// Why a line was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    TooShort,
    PureNumeric,
    BarcodeLike,
    Boilerplate,
}

/// One independent junk predicate
#[derive(Debug, Clone, Copy)]
pub enum LineRule {
    TooShort,
    PureNumeric,
    BarcodeLike,
    Boilerplate(Vocabulary),
}

impl LineRule {
    /// The standard rule table, in evaluation order
    pub fn standard(vocabulary: Vocabulary) -> Vec<LineRule> {
        vec![
            LineRule::TooShort,
            LineRule::PureNumeric,
            LineRule::BarcodeLike,
            LineRule::Boilerplate(vocabulary),
        ]
    }

    pub fn reason(&self) -> DropReason {
        match self {
            LineRule::TooShort => DropReason::TooShort,
            LineRule::PureNumeric => DropReason::PureNumeric,
            LineRule::BarcodeLike => DropReason::BarcodeLike,
            LineRule::Boilerplate(_) => DropReason::Boilerplate,
        }
    }

    /// True if the rule says `normalized` is junk
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            LineRule::TooShort => normalized.chars().count() < MIN_LINE_CHARS,
            LineRule::PureNumeric => {
                !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_digit())
            }
            // Counts every digit, not just contiguous runs
            LineRule::BarcodeLike => {
                normalized.chars().filter(|c| c.is_ascii_digit()).count() >= BARCODE_MIN_DIGITS
            }
            LineRule::Boilerplate(vocabulary) => vocabulary.matches(normalized),
        }
    }
}
