//! In-order rewriting of a round's chunk stream.
//!
//! Exactly one chunk per round may have its text replaced: the most recent chunk that
//! carries text. Every other chunk, and the target's `partial` flag and metadata, pass
//! through untouched, and the sequence keeps its length and order.
//!
//! [`rewrite_last_text`] is the batch form over a finished round. [`RoundRelay`] is the
//! streaming form used by the loop: it forwards chunks as soon as they can no longer be
//! the rewrite target and holds back only the tail that starts at the latest text-bearing
//! chunk, so the caller sees the round live while the rewrite still lands before the
//! round is released.

use crate::reasoning::chunk::StreamedChunk;

/// Replace the text of the last text-bearing chunk in `chunks` with `replacement`.
///
/// Returns the sequence unchanged when no chunk carries text.
///
/// ```rust
/// use cloudllm_reasoning::chunk::StreamedChunk;
/// use cloudllm_reasoning::rewriter::rewrite_last_text;
///
/// let round = vec![
///     StreamedChunk::partial("Analysis"),
///     StreamedChunk::complete("Analysis\nNEED_REVISION"),
///     StreamedChunk::empty(),
/// ];
/// let rewritten = rewrite_last_text(round.clone(), "Analysis");
///
/// assert_eq!(rewritten.len(), 3);
/// assert_eq!(rewritten[0], round[0]);
/// assert_eq!(rewritten[1].text.as_deref(), Some("Analysis"));
/// assert!(!rewritten[1].partial);
/// assert_eq!(rewritten[2], round[2]);
/// ```
pub fn rewrite_last_text(chunks: Vec<StreamedChunk>, replacement: &str) -> Vec<StreamedChunk> {
    let Some(target) = chunks.iter().rposition(StreamedChunk::has_text) else {
        return chunks;
    };

    chunks
        .into_iter()
        .enumerate()
        .map(|(idx, chunk)| {
            if idx == target {
                chunk.with_text(replacement)
            } else {
                chunk
            }
        })
        .collect()
}

/// Streaming forwarder for one round.
///
/// Chunks are pushed in arrival order; [`push`](RoundRelay::push) returns the chunks that
/// are safe to forward right away. At round end [`finish`](RoundRelay::finish) releases
/// the held tail, optionally rewriting its first chunk (the round's last text-bearing
/// chunk). Concatenating every returned batch yields exactly
/// `rewrite_last_text(all_chunks, replacement)`.
///
/// ```rust
/// use cloudllm_reasoning::chunk::StreamedChunk;
/// use cloudllm_reasoning::rewriter::RoundRelay;
///
/// let mut relay = RoundRelay::new();
/// assert!(relay.push(StreamedChunk::partial("Verification")).is_empty());
/// let released = relay.push(StreamedChunk::complete("Verification passed."));
/// assert_eq!(released.len(), 1);
///
/// let tail = relay.finish(Some("Looks good, moving on to planning."));
/// assert_eq!(tail[0].text.as_deref(), Some("Looks good, moving on to planning."));
/// ```
#[derive(Debug, Default)]
pub struct RoundRelay {
    held: Vec<StreamedChunk>,
    forwarded: usize,
}

impl RoundRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the next chunk and return whatever can be forwarded now.
    pub fn push(&mut self, chunk: StreamedChunk) -> Vec<StreamedChunk> {
        let ready = if chunk.has_text() {
            let released = std::mem::take(&mut self.held);
            self.held.push(chunk);
            released
        } else if self.held.is_empty() {
            vec![chunk]
        } else {
            self.held.push(chunk);
            Vec::new()
        };
        self.forwarded += ready.len();
        ready
    }

    /// Number of chunks currently held back.
    pub fn held(&self) -> usize {
        self.held.len()
    }

    /// Number of chunks released so far by [`push`](RoundRelay::push).
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }

    /// End the round and release the held tail, rewriting its text-bearing head when a
    /// replacement is given.
    pub fn finish(self, replacement: Option<&str>) -> Vec<StreamedChunk> {
        match replacement {
            Some(text) => rewrite_last_text(self.held, text),
            None => self.held,
        }
    }
}
