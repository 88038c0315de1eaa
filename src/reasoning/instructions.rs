//! Instruction assembly for planning and revision rounds.
//!
//! The loop only needs two interchangeable instruction pairs; their wording belongs to the
//! application. [`DefaultInstructions`] is a neutral starting point that states the
//! signal contract each round has to follow and nothing domain specific.
//!
//! Each pair is split into a *static* system block (role, tool catalog, output contract)
//! that stays byte-identical across the rounds of one kind, and a *dynamic* user block
//! with the per-session context. Providers that cache prompt prefixes can reuse the
//! system block between revision rounds.

use crate::reasoning::generator::InstructionPair;
use crate::reasoning::session::SessionParameters;
use crate::reasoning::signal::MarkerSet;

/// Builds the instruction pairs for the two round kinds.
pub trait InstructionBuilder: Send + Sync {
    /// Instructions for round 1.
    fn planning(&self, params: &SessionParameters) -> InstructionPair;

    /// Instructions for a revision round validating `previous_reasoning`.
    fn revision(&self, params: &SessionParameters, previous_reasoning: &str) -> InstructionPair;
}

/// Minimal instruction builder that only encodes the signal contract.
///
/// ```rust
/// use cloudllm_reasoning::instructions::{DefaultInstructions, InstructionBuilder};
/// use cloudllm_reasoning::SessionParameters;
///
/// let params = SessionParameters::new("tool_a: does A", "none", "do A", "Run tool_a once");
/// let builder = DefaultInstructions::new();
///
/// let planning = builder.planning(&params);
/// assert!(planning.system.contains("tool_a: does A"));
/// assert!(planning.system.contains("NEED_REVISION"));
///
/// let first = builder.revision(&params, "step 1: tool_a");
/// let second = builder.revision(&params, "step 1: tool_a, step 2: tool_a");
/// assert_eq!(first.system, second.system);
/// assert!(second.user.contains("step 2: tool_a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DefaultInstructions {
    markers: MarkerSet,
}

impl DefaultInstructions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom protocol tokens in the output contract.
    pub fn with_markers(mut self, markers: MarkerSet) -> Self {
        self.markers = markers;
        self
    }

    fn revision_token(&self) -> &str {
        self.markers
            .needs_revision
            .first()
            .map(String::as_str)
            .unwrap_or("NEED_REVISION")
    }

    fn dynamic_context(&self, params: &SessionParameters) -> String {
        let mut block = String::new();
        block.push_str("### DYNAMIC CONTEXT\n");
        block.push_str("<Session File Info>\n");
        block.push_str(&params.file_summary);
        block.push_str("\n</Session File Info>\n\n");
        if let Some(memory) = &params.short_term_memory {
            block.push_str(memory);
            block.push('\n');
        }
        block.push_str("--- Inputs ---\n");
        block.push_str(&format!("User Query: {}\n", params.original_query));
        block.push_str(&format!("Expanded Task: {}\n", params.expanded_query));
        block
    }
}

impl InstructionBuilder for DefaultInstructions {
    fn planning(&self, params: &SessionParameters) -> InstructionPair {
        let system = format!(
            "You reason about which tools to use, and in which order, to fulfil the task.\n\
             Use ONLY the tools listed below.\n\n\
             ### OUTPUT CONTRACT\n\
             End your response with exactly one line: {}\n\n\
             <Available Tools With Info>\n{}\n</Available Tools With Info>\n",
            self.revision_token(),
            params.tool_catalog
        );
        InstructionPair::new(system, self.dynamic_context(params))
    }

    fn revision(&self, params: &SessionParameters, previous_reasoning: &str) -> InstructionPair {
        let system = format!(
            "You validate the previous reasoning for missing prerequisites, mismatched \
             outputs, and tools that are not listed below.\n\n\
             ### OUTPUT CONTRACT\n\
             If the reasoning is valid, explain what you checked and end with: {}.\n\
             Otherwise provide the full corrected reasoning. End with {} only if you want \
             another validation round.\n\n\
             <Available Tools With Info>\n{}\n</Available Tools With Info>\n",
            self.markers.passed_phrase,
            self.revision_token(),
            params.tool_catalog
        );
        let user = format!(
            "{}\n--- Previous Reasoning to Validate ---\n{}\n",
            self.dynamic_context(params),
            previous_reasoning
        );
        InstructionPair::new(system, user)
    }
}
