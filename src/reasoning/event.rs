//! Reasoning loop event system.
//!
//! Implement [`EventHandler`] to observe a [`ReasoningLoop`](crate::ReasoningLoop) while
//! it runs: round boundaries, the signal each round ended with, stream rewrites, and how
//! the loop finished. The handler is optional and purely observational; it cannot change
//! the loop's decisions.
//!
//! # Event Flow (planning round + one passing revision)
//!
//! ```text
//! LoopStarted { max_rounds: 5 }
//!   └─ RoundStarted { round: 1, kind: Planning }
//!   └─ RoundCompleted { round: 1, signal: NeedsRevision }
//!   └─ StreamRewritten { round: 1, reason: MarkerStripped }
//!   └─ RoundStarted { round: 2, kind: Revision }
//!   └─ RoundCompleted { round: 2, signal: Passed }
//!   └─ StreamRewritten { round: 2, reason: BarePass }
//! LoopCompleted { rounds: 2, outcome: Verified { round: 2 } }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use cloudllm_reasoning::event::{EventHandler, ReasoningEvent};
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl EventHandler for Printer {
//!     async fn on_reasoning_event(&self, event: &ReasoningEvent) {
//!         if let ReasoningEvent::RoundCompleted { round, signal, .. } = event {
//!             println!("round {} ended with {}", round, signal);
//!         }
//!     }
//! }
//! ```

use crate::reasoning::controller::LoopOutcome;
use crate::reasoning::generator::RoundKind;
use crate::reasoning::signal::Signal;
use async_trait::async_trait;

/// Why a round's stream was rewritten before release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteReason {
    /// The planning round ended with a protocol marker that was removed.
    MarkerStripped,
    /// A revision round said nothing but "verification passed".
    BarePass,
}

/// Events emitted by a [`ReasoningLoop`](crate::ReasoningLoop).
///
/// Every variant carries the `loop_id` of the invocation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningEvent {
    /// The loop acquired its session parameters and is about to start round 1.
    LoopStarted {
        loop_id: String,
        max_rounds: usize,
    },

    /// A generation request is about to be issued.
    RoundStarted {
        loop_id: String,
        /// 1-based round index.
        round: usize,
        kind: RoundKind,
    },

    /// The round's stream ended and its text was classified.
    RoundCompleted {
        loop_id: String,
        round: usize,
        kind: RoundKind,
        signal: Signal,
        /// Number of chunks the generator produced in this round.
        chunk_count: usize,
        /// Length of the assembled round text in `char`s.
        text_length: usize,
    },

    /// One chunk of the round was rewritten before being released to the caller.
    StreamRewritten {
        loop_id: String,
        round: usize,
        reason: RewriteReason,
    },

    /// The loop ended normally and its result is available.
    LoopCompleted {
        loop_id: String,
        rounds: usize,
        outcome: LoopOutcome,
        /// Length of the final reasoning text in `char`s.
        reasoning_length: usize,
    },

    /// The generator failed; the error is being propagated to the caller.
    LoopFailed {
        loop_id: String,
        round: usize,
        error: String,
    },
}

/// Receiver for [`ReasoningEvent`]s.
///
/// The default implementation is a no-op. The `Send + Sync` bound lets one handler be
/// shared across loops via `Arc<dyn EventHandler>`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_reasoning_event(&self, _event: &ReasoningEvent) {}
}
