//! Junk-line classifier
//!
//! Decides, line by line, whether recognized receipt text names a purchased
//! item or is boilerplate (totals, tax, payment footers, barcodes). Each line
//! is judged on its own: no state is carried between lines, and kept lines
//! retain their original content and relative order.

pub mod normalize;
pub mod rules;
pub mod vocabulary;

pub use normalize::normalize;
pub use rules::{DropReason, LineRule};
pub use vocabulary::{Locale, Vocabulary};

use serde::Serialize;

/// Keep/drop decision for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop(DropReason),
}

/// A line removed by the classifier, with the rule that removed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedLine {
    pub line: String,
    pub reason: DropReason,
}

/// Ordered rule table; the first matching rule drops the line
#[derive(Debug, Clone)]
pub struct LineClassifier {
    rules: Vec<LineRule>,
}

impl LineClassifier {
    pub fn new(locale: Locale) -> Self {
        Self::with_rules(LineRule::standard(Vocabulary::new(locale)))
    }

    pub fn with_rules(rules: Vec<LineRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LineRule] {
        &self.rules
    }

    pub fn classify(&self, line: &str) -> Verdict {
        let normalized = normalize(line);
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map_or(Verdict::Keep, |rule| Verdict::Drop(rule.reason()))
    }

    /// Candidate item lines, in input order, duplicates kept
    pub fn filter<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        self.partition(lines).0
    }

    /// Split lines into kept candidates and dropped lines with reasons
    pub fn partition<S: AsRef<str>>(&self, lines: &[S]) -> (Vec<String>, Vec<DroppedLine>) {
        let mut kept = Vec::new();
        let mut dropped = Vec::new();

        for line in lines {
            let line = line.as_ref();
            match self.classify(line) {
                Verdict::Keep => kept.push(line.to_string()),
                Verdict::Drop(reason) => {
                    tracing::trace!("Dropping {:?}: {:?}", line, reason);
                    dropped.push(DroppedLine {
                        line: line.to_string(),
                        reason,
                    });
                }
            }
        }

        (kept, dropped)
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

/// Split recognizer output delivered as one block of text into lines
///
/// Blank separator lines carry no content and are skipped; every other line
/// is kept verbatim.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
