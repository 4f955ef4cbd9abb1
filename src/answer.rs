//! Final answers and the `NO DATA` sentinel.
//!
//! Internally an answer is either real text or an explicit [`Answer::NoData`].
//! The sentinel string only appears at the plain-text boundary (HTTP body,
//! model replies), so a weather report that happens to contain the phrase is
//! never mistaken for "unanswerable".

use std::fmt;

/// Sentinel used on plain-string channels to signal "no answer available".
pub const NO_DATA: &str = "NO DATA";

/// The outcome of answering a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A real answer.
    Text(String),
    /// The question could not be answered from the available data.
    NoData,
}

impl Answer {
    /// Interpret a raw model reply, mapping sentinel-like replies to [`Answer::NoData`].
    pub fn from_reply(text: &str) -> Self {
        if is_no_data_reply(text) {
            Answer::NoData
        } else {
            Answer::Text(text.to_string())
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Answer::NoData)
    }

    /// Render for a plain-text channel.
    pub fn as_str(&self) -> &str {
        match self {
            Answer::Text(text) => text,
            Answer::NoData => NO_DATA,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a model reply means "unanswerable".
///
/// True for an empty or whitespace-only reply, or one that is exactly the
/// sentinel (case-insensitive, optionally followed by a period). Replies that
/// merely contain the phrase are real answers.
pub fn is_no_data_reply(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed).trim_end();
    trimmed.eq_ignore_ascii_case(NO_DATA)
}
