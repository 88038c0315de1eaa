//! The round controller: a bounded propose → verify → revise loop over streamed output.
//!
//! Round 1 (planning) proposes reasoning. Every following round (revision) validates the
//! reasoning produced so far and either confirms it or replaces it with a correction.
//! The loop ends when a revision round's last line says the verification passed, or when
//! the round budget runs out, in which case the latest reasoning is returned as a
//! best-effort result.
//!
//! Chunks are forwarded to the caller while they stream in. Protocol tokens never reach
//! the caller: the planning round's trailing marker is stripped from the chunk that
//! carried it, and a revision round that said nothing but "verification passed" is
//! replaced by the configured transition message.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures_util::StreamExt;
//! use cloudllm_reasoning::clients::openai::OpenAIGenerator;
//! use cloudllm_reasoning::{ReasoningLoop, SessionParameters};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let generator = Arc::new(OpenAIGenerator::new(
//!     &std::env::var("OPEN_AI_SECRET")?,
//!     "gpt-4.1-mini",
//! ));
//! let mut reasoning = ReasoningLoop::new(generator);
//!
//! reasoning.configure(SessionParameters::new(
//!     "calculator: evaluate expressions",
//!     "no files",
//!     "what is 2+2?",
//!     "Evaluate 2+2 with the calculator",
//! ))?;
//!
//! {
//!     let mut stream = reasoning.run();
//!     while let Some(chunk) = stream.next().await {
//!         // Complete chunks carry the whole (possibly rewritten) message.
//!         let chunk = chunk?;
//!         if let (false, Some(text)) = (chunk.partial, chunk.text) {
//!             println!("{}", text);
//!         }
//!     }
//! }
//!
//! if let Some(result) = reasoning.result() {
//!     println!("\n{} after {} round(s)", result.outcome, result.rounds);
//! }
//! # Ok(())
//! # }
//! ```

use crate::reasoning::chunk::{StreamedChunk, TextAccumulator};
use crate::reasoning::config::ReasoningConfig;
use crate::reasoning::error::{BoxError, ReasoningError, ReasoningResult};
use crate::reasoning::event::{EventHandler, ReasoningEvent, RewriteReason};
use crate::reasoning::generator::{GenerationRequest, RoundKind, TextGenerator};
use crate::reasoning::instructions::{DefaultInstructions, InstructionBuilder};
use crate::reasoning::rewriter::RoundRelay;
use crate::reasoning::session::{SessionGuard, SessionParameters};
use crate::reasoning::signal::{classify, is_bare_pass, strip_markers, Signal};
use async_stream::stream;
use futures_util::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// Stream returned by [`ReasoningLoop::run`]. It borrows the loop until dropped.
pub type ReasoningStream<'a> = Pin<Box<dyn Stream<Item = ReasoningResult<StreamedChunk>> + 'a>>;

/// How a loop invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// A revision round confirmed the reasoning.
    Verified {
        /// The round whose last line carried the pass signal.
        round: usize,
    },
    /// The round budget ran out; the result is the latest unverified reasoning.
    BudgetExhausted,
}

impl LoopOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, LoopOutcome::Verified { .. })
    }
}

impl fmt::Display for LoopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopOutcome::Verified { round } => write!(f, "verified in round {}", round),
            LoopOutcome::BudgetExhausted => write!(f, "round budget exhausted"),
        }
    }
}

/// Final output of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopResult {
    /// Marker-free reasoning text for the downstream planner.
    pub reasoning: String,
    /// Whether the reasoning was verified or is a best-effort fallback.
    pub outcome: LoopOutcome,
    /// Rounds issued, planning round included.
    pub rounds: usize,
}

/// Drives the planning round and the revision sub-loop against a [`TextGenerator`].
///
/// The loop is reusable sequentially: configure, run, drain, read the result, repeat.
/// [`run`](ReasoningLoop::run) borrows the loop mutably for as long as its stream is
/// alive, so a second invocation cannot start while one is in flight.
pub struct ReasoningLoop {
    generator: Arc<dyn TextGenerator>,
    instructions: Arc<dyn InstructionBuilder>,
    config: ReasoningConfig,
    event_handler: Option<Arc<dyn EventHandler>>,
    session: Option<SessionParameters>,
    result: Option<LoopResult>,
}

impl ReasoningLoop {
    /// Create a loop with the default configuration and [`DefaultInstructions`].
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            instructions: Arc::new(DefaultInstructions::new()),
            config: ReasoningConfig::default(),
            event_handler: None,
            session: None,
            result: None,
        }
    }

    /// Replace the configuration (builder pattern). Validation happens when a run starts.
    pub fn with_config(mut self, config: ReasoningConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the instruction builder (builder pattern).
    pub fn with_instructions(mut self, instructions: Arc<dyn InstructionBuilder>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Register an observer for [`ReasoningEvent`]s (builder pattern).
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    /// Provide the session parameters for the next run.
    ///
    /// Fails with [`ReasoningError::AlreadyConfigured`] if a previous configuration has not
    /// been consumed by a run yet.
    pub fn configure(&mut self, params: SessionParameters) -> Result<(), ReasoningError> {
        if self.session.is_some() {
            return Err(ReasoningError::AlreadyConfigured);
        }
        self.session = Some(params);
        Ok(())
    }

    /// `true` while session parameters are held.
    pub fn is_configured(&self) -> bool {
        self.session.is_some()
    }

    /// The result of the last completed run; `None` before, during, or after a failed or
    /// cancelled run.
    pub fn result(&self) -> Option<&LoopResult> {
        self.result.as_ref()
    }

    /// Shortcut for the reasoning text of [`result`](ReasoningLoop::result).
    pub fn reasoning(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.reasoning.as_str())
    }

    /// Start the loop and return the forwarded chunk stream.
    ///
    /// The previous result is cleared immediately. Session parameters are cleared when the
    /// stream finishes, fails, or is dropped, even if it was never polled. Upstream errors
    /// are yielded unchanged and end the stream.
    pub fn run(&mut self) -> ReasoningStream<'_> {
        self.result = None;

        let generator = Arc::clone(&self.generator);
        let instructions = Arc::clone(&self.instructions);
        let config = self.config.clone();
        let handler = self.event_handler.clone();
        let result_slot = &mut self.result;
        let guard = SessionGuard::new(&mut self.session);

        Box::pin(stream! {
            let guard = guard;
            let loop_id = Uuid::new_v4().to_string();

            let Some(params) = guard.params() else {
                log::error!("ReasoningLoop::run(): started without session parameters");
                yield Err(Box::new(ReasoningError::NotConfigured) as BoxError);
                return;
            };
            if let Err(err) = config.validate() {
                log::error!("ReasoningLoop::run(): {}", err);
                yield Err(Box::new(err) as BoxError);
                return;
            }

            let markers = &config.markers;
            emit(&handler, ReasoningEvent::LoopStarted {
                loop_id: loop_id.clone(),
                max_rounds: config.max_rounds,
            })
            .await;
            log::info!("ReasoningLoop {} started (max {} rounds)", loop_id, config.max_rounds);

            let mut previous_reasoning = String::new();
            let mut outcome = LoopOutcome::BudgetExhausted;
            let mut rounds = 0;

            for round in 1..=config.max_rounds {
                rounds = round;
                let kind = RoundKind::for_round(round);
                let request = match kind {
                    RoundKind::Planning => GenerationRequest {
                        round,
                        kind,
                        instructions: instructions.planning(params),
                        previous_reasoning: None,
                    },
                    RoundKind::Revision => GenerationRequest {
                        round,
                        kind,
                        instructions: instructions.revision(params, &previous_reasoning),
                        previous_reasoning: Some(previous_reasoning.clone()),
                    },
                };

                emit(&handler, ReasoningEvent::RoundStarted {
                    loop_id: loop_id.clone(),
                    round,
                    kind,
                })
                .await;
                log::info!("  Round {}/{} ({})", round, config.max_rounds, kind);

                let mut upstream = match generator.generate(request).await {
                    Ok(upstream) => upstream,
                    Err(err) => {
                        log::error!("  Round {} failed to start: {}", round, err);
                        emit(&handler, ReasoningEvent::LoopFailed {
                            loop_id: loop_id.clone(),
                            round,
                            error: err.to_string(),
                        })
                        .await;
                        yield Err(err);
                        return;
                    }
                };

                let mut accumulator = TextAccumulator::new();
                let mut relay = RoundRelay::new();
                let mut chunk_count = 0;

                while let Some(item) = upstream.next().await {
                    let chunk = match item {
                        Ok(chunk) => chunk,
                        Err(err) => {
                            log::error!("  Round {} stream error: {}", round, err);
                            emit(&handler, ReasoningEvent::LoopFailed {
                                loop_id: loop_id.clone(),
                                round,
                                error: err.to_string(),
                            })
                            .await;
                            yield Err(err);
                            return;
                        }
                    };
                    chunk_count += 1;
                    accumulator.observe(&chunk);
                    for ready in relay.push(chunk) {
                        yield Ok(ready);
                    }
                }
                drop(upstream);

                let round_text = accumulator.into_text();
                let text_length = round_text.chars().count();
                let signal = classify(&round_text, markers);
                emit(&handler, ReasoningEvent::RoundCompleted {
                    loop_id: loop_id.clone(),
                    round,
                    kind,
                    signal,
                    chunk_count,
                    text_length,
                })
                .await;
                log::info!(
                    "  Round {} done ({} chunks, {} chars, signal: {})",
                    round,
                    chunk_count,
                    text_length,
                    signal
                );

                match (kind, signal) {
                    (RoundKind::Planning, _) => {
                        let stripped = strip_markers(&round_text, markers);
                        let replacement = if stripped != round_text {
                            emit(&handler, ReasoningEvent::StreamRewritten {
                                loop_id: loop_id.clone(),
                                round,
                                reason: RewriteReason::MarkerStripped,
                            })
                            .await;
                            log::debug!("  Round {}: stripped trailing marker from stream", round);
                            Some(stripped.as_str())
                        } else {
                            None
                        };
                        for ready in relay.finish(replacement) {
                            yield Ok(ready);
                        }
                        previous_reasoning = stripped;
                    }
                    (RoundKind::Revision, Signal::Passed) => {
                        let replacement = if is_bare_pass(&round_text, markers) {
                            emit(&handler, ReasoningEvent::StreamRewritten {
                                loop_id: loop_id.clone(),
                                round,
                                reason: RewriteReason::BarePass,
                            })
                            .await;
                            Some(config.transition_message.as_str())
                        } else {
                            None
                        };
                        for ready in relay.finish(replacement) {
                            yield Ok(ready);
                        }
                        outcome = LoopOutcome::Verified { round };
                        break;
                    }
                    (RoundKind::Revision, _) => {
                        for ready in relay.finish(None) {
                            yield Ok(ready);
                        }
                        let revised = strip_markers(&round_text, markers);
                        if revised.is_empty() {
                            log::warn!(
                                "  Round {} produced no reasoning, revalidating the previous one",
                                round
                            );
                        } else {
                            previous_reasoning = revised;
                        }
                    }
                }
            }

            if outcome == LoopOutcome::BudgetExhausted {
                log::warn!(
                    "ReasoningLoop {}: no verification after {} rounds, using latest reasoning",
                    loop_id,
                    rounds
                );
            }

            let reasoning = strip_markers(&previous_reasoning, markers);
            emit(&handler, ReasoningEvent::LoopCompleted {
                loop_id: loop_id.clone(),
                rounds,
                outcome,
                reasoning_length: reasoning.chars().count(),
            })
            .await;
            log::info!("ReasoningLoop {} finished: {} after {} round(s)", loop_id, outcome, rounds);

            *result_slot = Some(LoopResult {
                reasoning,
                outcome,
                rounds,
            });
            drop(guard);
        })
    }
}

async fn emit(handler: &Option<Arc<dyn EventHandler>>, event: ReasoningEvent) {
    if let Some(handler) = handler {
        handler.on_reasoning_event(&event).await;
    }
}
