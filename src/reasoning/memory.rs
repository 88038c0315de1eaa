//! Short-term memory injection.
//!
//! The loop never talks to a memory service directly. Callers inject a [`MemoryReader`]
//! when they build [`SessionParameters`](crate::session::SessionParameters), and the
//! retrieved snippets are rendered into a single prompt block by
//! [`format_short_term_memory`].
//!
//! ```rust
//! use cloudllm_reasoning::memory::{format_short_term_memory, MemoryReader, MemorySnippet};
//! use cloudllm_reasoning::ReasoningResult;
//!
//! struct Pinned;
//!
//! impl MemoryReader for Pinned {
//!     fn read(&self, _query: &str, _session_id: &str, _limit: usize) -> ReasoningResult<Vec<MemorySnippet>> {
//!         Ok(vec![MemorySnippet::new("Structure file: Fe_bcc.cif (from get_structure_info)")])
//!     }
//! }
//!
//! let block = format_short_term_memory(&Pinned, "relax Fe", "session-1", 5).unwrap();
//! assert_eq!(
//!     block,
//!     "### Short-term working memory\n\n- [1] Structure file: Fe_bcc.cif (from get_structure_info)\n"
//! );
//! ```

use crate::reasoning::error::ReasoningResult;
use std::collections::HashMap;

/// Section header used for the injected block.
pub const SHORT_TERM_MEMORY_HEADER: &str = "Short-term working memory";

/// Default number of snippets requested from the reader.
pub const DEFAULT_MEMORY_LIMIT: usize = 5;

/// One retrieved memory item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySnippet {
    /// The text to inject.
    pub document: String,
    /// Optional metadata such as the tool that produced the snippet.
    pub metadata: HashMap<String, String>,
}

impl MemorySnippet {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach metadata to the snippet (builder pattern).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Read access to session-scoped memory.
pub trait MemoryReader: Send + Sync {
    /// Return up to `limit` snippets relevant to `query` within `session_id`.
    fn read(&self, query: &str, session_id: &str, limit: usize)
        -> ReasoningResult<Vec<MemorySnippet>>;
}

/// Reader that never returns anything.
pub struct NoopMemory;

impl MemoryReader for NoopMemory {
    fn read(
        &self,
        _query: &str,
        _session_id: &str,
        _limit: usize,
    ) -> ReasoningResult<Vec<MemorySnippet>> {
        Ok(Vec::new())
    }
}

/// Retrieve snippets for the current session and render them as one prompt block.
///
/// Returns an empty string when `session_id` is empty or nothing relevant was found.
/// Snippet numbering follows the reader's ordering; empty documents are skipped but keep
/// their number.
pub fn format_short_term_memory(
    reader: &dyn MemoryReader,
    query: &str,
    session_id: &str,
    limit: usize,
) -> ReasoningResult<String> {
    if session_id.is_empty() {
        log::debug!("format_short_term_memory skipped: empty session_id");
        return Ok(String::new());
    }

    let snippets = reader.read(query, session_id, limit)?;
    let mut lines = vec![format!("### {}", SHORT_TERM_MEMORY_HEADER), String::new()];
    for (idx, snippet) in snippets.iter().enumerate() {
        if !snippet.document.is_empty() {
            lines.push(format!("- [{}] {}", idx + 1, snippet.document));
        }
    }

    if lines.len() <= 2 {
        log::info!(
            "format_short_term_memory session_id={} query_len={} limit={} -> 0 hits",
            session_id,
            query.len(),
            limit
        );
        return Ok(String::new());
    }

    log::info!(
        "format_short_term_memory session_id={} query_len={} -> {} snippet(s)",
        session_id,
        query.len(),
        snippets.len()
    );
    lines.push(String::new());
    Ok(lines.join("\n"))
}
