//! Terminal-signal detection and protocol-marker stripping.
//!
//! Models communicate loop control through the *last non-empty line* of their output.
//! Only that line is ever inspected: a round that merely discusses "verification" in its
//! body must not be able to end the loop.
//!
//! Lines are compared after normalisation: surrounding whitespace and trailing periods
//! are removed and the result is lowercased, so `"Revision needed."`, `"revision NEEDED"`
//! and `"Revision needed"` are the same token.
//!
//! ```rust
//! use cloudllm_reasoning::signal::{classify, strip_markers, MarkerSet, Signal};
//!
//! let markers = MarkerSet::default();
//! let round = "1. fetch structure\n2. relax slab\nNEED_REVISION";
//!
//! assert_eq!(classify(round, &markers), Signal::NeedsRevision);
//! assert_eq!(strip_markers(round, &markers), "1. fetch structure\n2. relax slab");
//! assert_eq!(classify("Checked inputs.\nVerification passed.", &markers), Signal::Passed);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified outcome of a round's final line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    /// The model asked for (another) validation round.
    NeedsRevision,
    /// The model confirmed the reasoning it was asked to validate.
    Passed,
    /// Anything else, including empty output.
    Other,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::NeedsRevision => write!(f, "needs_revision"),
            Signal::Passed => write!(f, "passed"),
            Signal::Other => write!(f, "other"),
        }
    }
}

/// The protocol tokens a text generator is asked to end its rounds with.
///
/// All comparisons are case-insensitive and ignore trailing periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSet {
    /// First-round tokens meaning "the reasoning is final".
    pub ready: Vec<String>,
    /// Tokens meaning "validate this again".
    pub needs_revision: Vec<String>,
    /// Short synonym for a passed verification.
    pub ok_token: String,
    /// Canonical passed phrase; a last line *ending* with it also counts.
    pub passed_phrase: String,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            ready: vec!["READY".to_string()],
            needs_revision: vec![
                "NEED_REVISION".to_string(),
                "Needs revision".to_string(),
                "Revision needed".to_string(),
            ],
            ok_token: "OK".to_string(),
            passed_phrase: "Verification passed".to_string(),
        }
    }
}

impl MarkerSet {
    /// `true` if `line` is one of the first-round "ready" tokens.
    pub fn is_ready(&self, line: &str) -> bool {
        matches_any(line, &self.ready)
    }

    /// `true` if `line` is one of the "needs revision" tokens.
    pub fn is_needs_revision(&self, line: &str) -> bool {
        matches_any(line, &self.needs_revision)
    }

    /// `true` if `line` is the OK token, the passed phrase, or ends with the passed phrase.
    ///
    /// ```rust
    /// use cloudllm_reasoning::signal::MarkerSet;
    ///
    /// let markers = MarkerSet::default();
    /// assert!(markers.is_passed("ok"));
    /// assert!(markers.is_passed("All prerequisites met, verification passed..."));
    /// assert!(!markers.is_passed("Verification passed? Not yet."));
    /// ```
    pub fn is_passed(&self, line: &str) -> bool {
        let line = normalize_line(line);
        if line.is_empty() {
            return false;
        }
        let ok = normalize_line(&self.ok_token);
        let phrase = normalize_line(&self.passed_phrase);
        (!ok.is_empty() && line == ok) || (!phrase.is_empty() && line.ends_with(&phrase))
    }

    /// `true` if `line` is a first-round terminal token (ready or needs-revision family).
    pub fn is_first_round_marker(&self, line: &str) -> bool {
        self.is_ready(line) || self.is_needs_revision(line)
    }
}

fn matches_any(line: &str, tokens: &[String]) -> bool {
    let line = normalize_line(line);
    !line.is_empty() && tokens.iter().any(|token| normalize_line(token) == line)
}

/// Trim, drop trailing periods, and lowercase a single line.
pub fn normalize_line(line: &str) -> String {
    line.trim().trim_end_matches('.').trim_end().to_lowercase()
}

/// The last non-empty line of `text`, trimmed, or `""` when there is none.
///
/// ```rust
/// use cloudllm_reasoning::signal::last_line;
///
/// assert_eq!(last_line("first\n  second  \n\n"), "second");
/// assert_eq!(last_line("   \n"), "");
/// ```
pub fn last_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or("")
}

/// Derive the [`Signal`] of a round from its full text.
pub fn classify(text: &str, markers: &MarkerSet) -> Signal {
    let line = last_line(text);
    if line.is_empty() {
        Signal::Other
    } else if markers.is_passed(line) {
        Signal::Passed
    } else if markers.is_needs_revision(line) {
        Signal::NeedsRevision
    } else {
        Signal::Other
    }
}

/// `true` if the round consists of nothing but the passed line (no validation narrative).
pub fn is_bare_pass(text: &str, markers: &MarkerSet) -> bool {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    match (lines.next(), lines.next()) {
        (Some(only), None) => markers.is_passed(only),
        _ => false,
    }
}

/// Remove trailing protocol lines (ready / needs-revision tokens) from `text`.
///
/// Blank lines between markers are dropped too, so the result never ends with a marker
/// and stripping twice is the same as stripping once. The result is trimmed; the kept
/// lines are a slice of the input, so their separators (`\n` or `\r\n`) are unchanged.
///
/// ```rust
/// use cloudllm_reasoning::signal::{strip_markers, MarkerSet};
///
/// let markers = MarkerSet::default();
/// assert_eq!(strip_markers("Step one\r\nStep two", &markers), "Step one\r\nStep two");
/// assert_eq!(strip_markers("Step one\r\n\r\nREADY\r\n", &markers), "Step one");
/// ```
pub fn strip_markers(text: &str, markers: &MarkerSet) -> String {
    let mut kept = text.trim();
    while !kept.is_empty() {
        let (head, last) = match kept.rfind('\n') {
            Some(idx) => (&kept[..idx], &kept[idx + 1..]),
            None => ("", kept),
        };
        if !markers.is_first_round_marker(last) {
            break;
        }
        kept = head.trim_end();
    }
    kept.to_string()
}
