//! Session parameters and the scope guard that clears them.
//!
//! [`SessionParameters`] are single-use: a caller configures them right before starting a
//! loop and the loop guarantees they are gone when it ends, whether it converged, ran out
//! of rounds, failed, or was dropped mid-stream. The guarantee is carried by
//! [`SessionGuard`], whose `Drop` clears the slot.

use crate::reasoning::error::ReasoningResult;
use crate::reasoning::memory::{format_short_term_memory, MemoryReader};

/// Inputs for one reasoning loop invocation.
///
/// # Example
///
/// ```rust
/// use cloudllm_reasoning::SessionParameters;
///
/// let params = SessionParameters::new(
///     "get_structure_info: read a structure file",
///     "Fe_bcc.cif (uploaded)",
///     "relax this iron cell",
///     "Relax the bcc Fe cell in Fe_bcc.cif and report the lattice constant",
/// )
/// .with_short_term_memory("### Short-term working memory\n\n- [1] lattice a=2.87\n");
///
/// assert!(params.short_term_memory.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionParameters {
    /// Rendered catalog of the tools the downstream planner may use.
    pub tool_catalog: String,
    /// Summary of files available in the session.
    pub file_summary: String,
    /// The request exactly as the user wrote it.
    pub original_query: String,
    /// The refined/expanded form of the request.
    pub expanded_query: String,
    /// Optional short-term memory block.
    pub short_term_memory: Option<String>,
}

impl SessionParameters {
    pub fn new(
        tool_catalog: impl Into<String>,
        file_summary: impl Into<String>,
        original_query: impl Into<String>,
        expanded_query: impl Into<String>,
    ) -> Self {
        Self {
            tool_catalog: tool_catalog.into(),
            file_summary: file_summary.into(),
            original_query: original_query.into(),
            expanded_query: expanded_query.into(),
            short_term_memory: None,
        }
    }

    /// Attach a pre-rendered memory block. Blank text leaves the memory unset.
    pub fn with_short_term_memory(mut self, memory: impl Into<String>) -> Self {
        let memory = memory.into();
        self.short_term_memory = if memory.trim().is_empty() {
            None
        } else {
            Some(memory)
        };
        self
    }

    /// Query the injected reader and attach whatever it returns.
    ///
    /// The expanded query is used as the lookup text, falling back to the original query
    /// when it is empty.
    pub fn with_memory_from(
        self,
        reader: &dyn MemoryReader,
        session_id: &str,
        limit: usize,
    ) -> ReasoningResult<Self> {
        let query = if self.expanded_query.trim().is_empty() {
            self.original_query.clone()
        } else {
            self.expanded_query.clone()
        };
        let block = format_short_term_memory(reader, &query, session_id, limit)?;
        Ok(self.with_short_term_memory(block))
    }
}

/// Holds the configured-session slot for the duration of one loop invocation and empties
/// it when dropped.
pub(crate) struct SessionGuard<'a> {
    slot: &'a mut Option<SessionParameters>,
}

impl<'a> SessionGuard<'a> {
    pub(crate) fn new(slot: &'a mut Option<SessionParameters>) -> Self {
        Self { slot }
    }

    /// The configured parameters, or `None` if the loop was started unconfigured.
    pub(crate) fn params(&self) -> Option<&SessionParameters> {
        self.slot.as_ref()
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.slot.take().is_some() {
            log::debug!("SessionGuard: session parameters cleared");
        }
    }
}
