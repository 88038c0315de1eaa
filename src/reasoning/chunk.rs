//! Streamed chunk records and the per-round text accumulator.
//!
//! A [`StreamedChunk`] is an immutable value: rewriting a chunk means building a new one
//! with [`StreamedChunk::with_text`], never mutating a record another consumer may hold.
//!
//! Text generators are expected to periodically emit the *complete* message so far as a
//! non-partial chunk, in addition to any partial deltas. [`TextAccumulator`] relies on
//! that: the last complete chunk of a round is the round's full text.
//!
//! ```rust
//! use cloudllm_reasoning::chunk::{StreamedChunk, TextAccumulator};
//!
//! let mut acc = TextAccumulator::new();
//! acc.observe(&StreamedChunk::partial("Step 1"));
//! acc.observe(&StreamedChunk::complete("Step 1\nStep 2"));
//! acc.observe(&StreamedChunk::empty());
//! assert_eq!(acc.text(), "Step 1\nStep 2");
//! ```

/// Opaque metadata attached to every chunk. The loop never interprets it and always
/// forwards it verbatim, including on rewritten chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Name of the component that produced the chunk (e.g. `"reasoning_agent"`).
    pub author: Option<String>,
    /// Correlation identifier tying the chunk to one generation request.
    pub invocation_id: Option<String>,
    /// Conversational role of the producer (e.g. `"model"`).
    pub role: Option<String>,
}

impl ChunkMetadata {
    /// Build metadata with only the author set.
    pub fn from_author(author: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            ..Self::default()
        }
    }

    /// Set the correlation identifier (builder pattern).
    pub fn with_invocation_id(mut self, invocation_id: impl Into<String>) -> Self {
        self.invocation_id = Some(invocation_id.into());
        self
    }

    /// Set the producer role (builder pattern).
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// One item yielded by a text generator during a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamedChunk {
    /// Text payload, if any. Partial chunks usually carry a delta, complete chunks the
    /// whole message so far.
    pub text: Option<String>,
    /// `true` while the producer is still assembling the message.
    pub partial: bool,
    /// Metadata preserved verbatim by the loop.
    pub metadata: ChunkMetadata,
}

impl StreamedChunk {
    /// A still-assembling chunk carrying a delta.
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            partial: true,
            metadata: ChunkMetadata::default(),
        }
    }

    /// A complete chunk carrying the whole message so far.
    pub fn complete(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            partial: false,
            metadata: ChunkMetadata::default(),
        }
    }

    /// A complete chunk without any text (e.g. a turn-complete marker).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach metadata (builder pattern).
    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Rebuild the chunk with a different text payload. The `partial` flag and the
    /// metadata are carried over unchanged.
    ///
    /// ```rust
    /// use cloudllm_reasoning::chunk::{ChunkMetadata, StreamedChunk};
    ///
    /// let original = StreamedChunk::complete("raw")
    ///     .with_metadata(ChunkMetadata::from_author("reasoning_agent"));
    /// let rewritten = original.clone().with_text("clean");
    /// assert_eq!(rewritten.text.as_deref(), Some("clean"));
    /// assert_eq!(rewritten.metadata, original.metadata);
    /// assert_eq!(rewritten.partial, original.partial);
    /// ```
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..self
        }
    }

    /// `true` if the chunk carries text with at least one non-whitespace character.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// The trimmed text of a complete chunk, or `None` for partial and textless chunks.
    pub fn complete_text(&self) -> Option<&str> {
        if self.partial {
            return None;
        }
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Reconstructs the full text of one round from its chunks.
///
/// Partial and textless chunks contribute nothing; a complete chunk with text replaces
/// whatever was accumulated before it.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    full_text: String,
    complete_chunks: usize,
}

impl TextAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of the round, in arrival order.
    pub fn observe(&mut self, chunk: &StreamedChunk) {
        if let Some(text) = chunk.complete_text() {
            self.full_text.clear();
            self.full_text.push_str(text);
            self.complete_chunks += 1;
        }
    }

    /// The round text as known so far (trimmed).
    pub fn text(&self) -> &str {
        &self.full_text
    }

    /// How many complete chunks replaced the text during this round.
    pub fn complete_chunks(&self) -> usize {
        self.complete_chunks
    }

    pub fn into_text(self) -> String {
        self.full_text
    }
}
