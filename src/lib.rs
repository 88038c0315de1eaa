//! # CloudLLM Reasoning
//!
//! A self-verifying reasoning loop for LLM agents. Before an agent commits to a plan, the
//! loop asks a model to reason about the request, then repeatedly asks it to check that
//! reasoning against the available tools and context until the model confirms it or a
//! round budget runs out.
//!
//! The crate provides:
//!
//! * **Round control**: [`ReasoningLoop`] drives one planning round followed by bounded
//!   revision rounds, and exposes the verified (or best-effort) reasoning as a [`LoopResult`]
//! * **Streaming**: every round is streamed to the caller as [`StreamedChunk`]s while it
//!   is produced; protocol markers are rewritten out of the stream in place
//! * **Signal parsing**: [`signal`] recognizes the "ready", "needs revision" and
//!   "verification passed" markers on the last line of a round
//! * **Provider flexibility**: anything implementing [`TextGenerator`] can drive the loop;
//!   [`clients::openai::OpenAIGenerator`] covers OpenAI compatible endpoints
//! * **Observability**: [`ReasoningEvent`]s delivered to an [`EventHandler`], plus `log`
//!   output controlled through `RUST_LOG`
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures_util::StreamExt;
//! use cloudllm_reasoning::clients::openai::OpenAIGenerator;
//! use cloudllm_reasoning::{ReasoningConfig, ReasoningLoop, SessionParameters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     cloudllm_reasoning::init_logger();
//!
//!     let generator = Arc::new(OpenAIGenerator::new(
//!         &std::env::var("OPEN_AI_SECRET")?,
//!         "gpt-4.1-mini",
//!     ));
//!     let mut reasoning = ReasoningLoop::new(generator)
//!         .with_config(ReasoningConfig::default().with_max_rounds(4));
//!
//!     reasoning.configure(SessionParameters::new(
//!         "http_client: GET/POST JSON APIs",
//!         "README.md (2 KB)",
//!         "fetch the weather",
//!         "Fetch today's weather for Lisbon from a public JSON API",
//!     ))?;
//!
//!     {
//!         let mut stream = reasoning.run();
//!         while let Some(chunk) = stream.next().await {
//!             let chunk = chunk?;
//!             if chunk.partial {
//!                 continue;
//!             }
//!             if let Some(text) = chunk.text {
//!                 println!("{}", text);
//!             }
//!         }
//!     }
//!
//!     println!("\n---\n{}", reasoning.reasoning().unwrap_or_default());
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Applications embedding the reasoning loop can opt in to `RUST_LOG` driven diagnostics
/// without choosing a logging backend upfront.
///
/// ```rust
/// cloudllm_reasoning::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::try_init();
    });
}

// Import the top-level `reasoning` module.
pub mod reasoning;

// Re-exporting key items for easier external access.
pub use reasoning::chunk;
pub use reasoning::chunk::{ChunkMetadata, StreamedChunk, TextAccumulator};
pub use reasoning::clients;
pub use reasoning::config;
pub use reasoning::config::ReasoningConfig;
pub use reasoning::controller;
pub use reasoning::controller::{LoopOutcome, LoopResult, ReasoningLoop, ReasoningStream};
pub use reasoning::error;
pub use reasoning::error::{BoxError, GenerationError, ReasoningError, ReasoningResult};
pub use reasoning::event;
pub use reasoning::event::{EventHandler, ReasoningEvent, RewriteReason};
pub use reasoning::generator;
pub use reasoning::generator::{
    ChunkStream, GenerationRequest, InstructionPair, RoundKind, TextGenerator,
};
pub use reasoning::instructions;
pub use reasoning::instructions::{DefaultInstructions, InstructionBuilder};
pub use reasoning::memory;
pub use reasoning::memory::{MemoryReader, MemorySnippet, NoopMemory};
pub use reasoning::rewriter;
pub use reasoning::session;
pub use reasoning::session::SessionParameters;
pub use reasoning::signal;
pub use reasoning::signal::{MarkerSet, Signal};
