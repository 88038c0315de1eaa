//! The text-generation capability consumed by the reasoning loop.
//!
//! A [`TextGenerator`] turns one [`GenerationRequest`] into an ordered stream of
//! [`StreamedChunk`]s. The loop does not care which provider sits behind it; it only
//! needs two interchangeable instruction pairs (planning and revision) and the chunk
//! semantics documented on [`TextAccumulator`](crate::chunk::TextAccumulator).
//!
//! # Example: a canned generator
//!
//! ```rust
//! use async_trait::async_trait;
//! use cloudllm_reasoning::chunk::StreamedChunk;
//! use cloudllm_reasoning::generator::{chunks_to_stream, ChunkStream, GenerationRequest, TextGenerator};
//! use cloudllm_reasoning::ReasoningResult;
//!
//! struct AlwaysPasses;
//!
//! #[async_trait(?Send)]
//! impl TextGenerator for AlwaysPasses {
//!     async fn generate(&self, _request: GenerationRequest) -> ReasoningResult<ChunkStream> {
//!         Ok(chunks_to_stream(vec![Ok(StreamedChunk::complete("Verification passed."))]))
//!     }
//! }
//! ```

use crate::reasoning::chunk::StreamedChunk;
use crate::reasoning::error::ReasoningResult;
use async_trait::async_trait;
use futures_util::Stream;
use std::fmt;
use std::pin::Pin;

/// Ordered chunk stream for one round. Like provider streams, it may not be `Send` and is
/// consumed on the task that requested it.
pub type ChunkStream = Pin<Box<dyn Stream<Item = ReasoningResult<StreamedChunk>>>>;

/// Which instruction pair a round uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundKind {
    /// Round 1: propose the reasoning.
    Planning,
    /// Rounds 2..: validate (and possibly correct) the previous reasoning.
    Revision,
}

impl RoundKind {
    /// Kind of the given 1-based round.
    pub fn for_round(round: usize) -> Self {
        if round <= 1 {
            RoundKind::Planning
        } else {
            RoundKind::Revision
        }
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundKind::Planning => write!(f, "planning"),
            RoundKind::Revision => write!(f, "revision"),
        }
    }
}

/// System + user instruction blocks for one request.
///
/// The system block holds content that does not change across rounds of the same kind so
/// providers with prompt caching can reuse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionPair {
    pub system: String,
    pub user: String,
}

impl InstructionPair {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Everything a generator receives for one round.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// 1-based round index.
    pub round: usize,
    /// Planning for round 1, revision afterwards.
    pub kind: RoundKind,
    /// Instructions assembled by the [`InstructionBuilder`](crate::instructions::InstructionBuilder).
    pub instructions: InstructionPair,
    /// Marker-free reasoning under validation; `None` for the planning round.
    pub previous_reasoning: Option<String>,
}

/// Interface to a streaming text-generation backend.
#[async_trait(?Send)]
pub trait TextGenerator: Send + Sync {
    /// Start a round and return its chunk stream.
    ///
    /// Errors returned here, or yielded by the stream, are propagated to the loop's caller
    /// unchanged. Dropping the returned stream must cancel the underlying request.
    async fn generate(&self, request: GenerationRequest) -> ReasoningResult<ChunkStream>;
}

/// Wrap pre-computed chunk results into a [`ChunkStream`].
pub fn chunks_to_stream(chunks: Vec<ReasoningResult<StreamedChunk>>) -> ChunkStream {
    Box::pin(futures_util::stream::iter(chunks))
}
