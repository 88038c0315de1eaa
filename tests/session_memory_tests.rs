use cloudllm_reasoning::instructions::{DefaultInstructions, InstructionBuilder};
use cloudllm_reasoning::memory::{
    format_short_term_memory, MemoryReader, MemorySnippet, NoopMemory, DEFAULT_MEMORY_LIMIT,
};
use cloudllm_reasoning::{MarkerSet, ReasoningResult, SessionParameters};
use std::sync::Mutex;

/// Returns fixed snippets and records the lookups it served.
struct FixedMemory {
    snippets: Vec<MemorySnippet>,
    lookups: Mutex<Vec<(String, String, usize)>>,
}

impl FixedMemory {
    fn new(snippets: Vec<MemorySnippet>) -> Self {
        Self {
            snippets,
            lookups: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryReader for FixedMemory {
    fn read(
        &self,
        query: &str,
        session_id: &str,
        limit: usize,
    ) -> ReasoningResult<Vec<MemorySnippet>> {
        self.lookups
            .lock()
            .unwrap()
            .push((query.to_string(), session_id.to_string(), limit));
        Ok(self.snippets.iter().take(limit).cloned().collect())
    }
}

struct BrokenMemory;

impl MemoryReader for BrokenMemory {
    fn read(&self, _: &str, _: &str, _: usize) -> ReasoningResult<Vec<MemorySnippet>> {
        Err("memory backend offline".into())
    }
}

fn params() -> SessionParameters {
    SessionParameters::new(
        "relax: relax a structure",
        "Fe_bcc.cif",
        "relax my iron",
        "Relax the bcc Fe cell from Fe_bcc.cif",
    )
}

#[test]
fn test_format_short_term_memory() {
    let memory = FixedMemory::new(vec![
        MemorySnippet::new("Lattice constant a=2.87").with_metadata("tool", "relax"),
        MemorySnippet::new(""),
        MemorySnippet::new("Structure file: Fe_bcc.cif"),
    ]);

    let block = format_short_term_memory(&memory, "relax", "session-1", 5).unwrap();
    assert_eq!(
        block,
        "### Short-term working memory\n\n- [1] Lattice constant a=2.87\n- [3] Structure file: Fe_bcc.cif\n"
    );
}

#[test]
fn test_format_short_term_memory_empty_cases() {
    let memory = FixedMemory::new(vec![MemorySnippet::new("something")]);
    assert_eq!(format_short_term_memory(&memory, "q", "", 5).unwrap(), "");
    assert!(memory.lookups.lock().unwrap().is_empty());

    assert_eq!(format_short_term_memory(&NoopMemory, "q", "s", 5).unwrap(), "");

    let blanks = FixedMemory::new(vec![MemorySnippet::new("")]);
    assert_eq!(format_short_term_memory(&blanks, "q", "s", 5).unwrap(), "");
}

#[test]
fn test_memory_errors_propagate() {
    let err = format_short_term_memory(&BrokenMemory, "q", "s", 5).unwrap_err();
    assert_eq!(err.to_string(), "memory backend offline");
    assert!(params().with_memory_from(&BrokenMemory, "s", 5).is_err());
}

#[test]
fn test_with_memory_from_uses_expanded_query() {
    let memory = FixedMemory::new(vec![MemorySnippet::new("Lattice constant a=2.87")]);
    let params = params()
        .with_memory_from(&memory, "session-7", DEFAULT_MEMORY_LIMIT)
        .unwrap();

    assert!(params
        .short_term_memory
        .as_deref()
        .unwrap()
        .contains("- [1] Lattice constant a=2.87"));
    let lookups = memory.lookups.lock().unwrap();
    assert_eq!(
        lookups[0],
        (
            "Relax the bcc Fe cell from Fe_bcc.cif".to_string(),
            "session-7".to_string(),
            DEFAULT_MEMORY_LIMIT
        )
    );
}

#[test]
fn test_with_memory_from_falls_back_to_original_query() {
    let memory = FixedMemory::new(Vec::new());
    let params = SessionParameters::new("tools", "files", "original request", "  ")
        .with_memory_from(&memory, "session-7", 3)
        .unwrap();

    assert_eq!(params.short_term_memory, None);
    assert_eq!(memory.lookups.lock().unwrap()[0].0, "original request");
}

#[test]
fn test_blank_short_term_memory_is_ignored() {
    assert_eq!(params().with_short_term_memory(" \n ").short_term_memory, None);
}

#[test]
fn test_default_instructions_layout() {
    let builder = DefaultInstructions::new();
    let params = params().with_short_term_memory("### Short-term working memory\n\n- [1] a=2.87\n");

    let planning = builder.planning(&params);
    assert!(planning.system.contains("relax: relax a structure"));
    assert!(planning.system.contains("NEED_REVISION"));
    assert!(planning.user.contains("Fe_bcc.cif"));
    assert!(planning.user.contains("User Query: relax my iron"));
    assert!(planning.user.contains("- [1] a=2.87"));

    let revision = builder.revision(&params, "1. relax");
    assert!(revision.system.contains("Verification passed"));
    assert!(revision.user.ends_with("1. relax\n"));
    assert!(!revision.system.contains("1. relax"));
}

#[test]
fn test_default_instructions_custom_markers() {
    let builder = DefaultInstructions::new().with_markers(MarkerSet {
        needs_revision: vec!["AGAIN".to_string()],
        passed_phrase: "All checks complete".to_string(),
        ..MarkerSet::default()
    });
    let revision = builder.revision(&params(), "plan");
    assert!(revision.system.contains("AGAIN"));
    assert!(revision.system.contains("All checks complete"));
    assert!(!revision.system.contains("NEED_REVISION"));
}
