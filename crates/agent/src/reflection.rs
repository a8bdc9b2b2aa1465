//! Accept-or-retry decisions for the reflection loop.
//!
//! The model signals that it is satisfied with its entities by writing the
//! terminator (default `DONE`) into its reply. The validator strips the
//! terminator from accepted replies and hands everything else back for
//! another round. There is no failure path: empty or garbled text simply
//! retries.

use pipewright_config::ExtractionConfig;
use serde::{Deserialize, Serialize};

/// How the terminator is recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminatorMatch {
    /// Anywhere in the reply; the first occurrence is removed.
    #[default]
    Substring,
    /// Only on a line of its own (surrounding whitespace ignored); that
    /// line is removed.
    StandaloneLine,
}

/// The validator's decision on one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Final entities, terminator removed.
    Accepted(String),
    /// The unchanged candidate, to be revised.
    Retry(String),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Verdict::Accepted(t) | Verdict::Retry(t) => t,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Verdict::Accepted(t) | Verdict::Retry(t) => t,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReflectionValidator {
    terminator: String,
    mode: TerminatorMatch,
}

impl Default for ReflectionValidator {
    fn default() -> Self {
        Self::new("DONE")
    }
}

impl ReflectionValidator {
    pub fn new(terminator: impl Into<String>) -> Self {
        Self {
            terminator: terminator.into(),
            mode: TerminatorMatch::Substring,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mode = if config.standalone_terminator {
            TerminatorMatch::StandaloneLine
        } else {
            TerminatorMatch::Substring
        };
        Self::new(&config.terminator).with_mode(mode)
    }

    pub fn with_mode(mut self, mode: TerminatorMatch) -> Self {
        self.mode = mode;
        self
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    pub fn validate(&self, candidate: &str) -> Verdict {
        let accepted = match self.mode {
            TerminatorMatch::Substring => self.strip_first(candidate),
            TerminatorMatch::StandaloneLine => self.strip_line(candidate),
        };
        match accepted {
            Some(entities) => Verdict::Accepted(entities),
            None => Verdict::Retry(candidate.to_string()),
        }
    }

    fn strip_first(&self, candidate: &str) -> Option<String> {
        if self.terminator.is_empty() {
            return None;
        }
        let start = candidate.find(&self.terminator)?;
        let end = start + self.terminator.len();
        Some(format!("{}{}", &candidate[..start], &candidate[end..]))
    }

    fn strip_line(&self, candidate: &str) -> Option<String> {
        let mut lines = candidate.split_inclusive('\n');
        let mut kept = String::with_capacity(candidate.len());

        while let Some(line) = lines.next() {
            if line.trim() == self.terminator {
                kept.extend(lines);
                return Some(kept);
            }
            kept.push_str(line);
        }
        None
    }
}
