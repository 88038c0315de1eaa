use cloudllm_reasoning::chunk::{ChunkMetadata, StreamedChunk, TextAccumulator};
use cloudllm_reasoning::rewriter::{rewrite_last_text, RoundRelay};

fn sample_round() -> Vec<StreamedChunk> {
    let meta = ChunkMetadata::from_author("reasoning_agent").with_invocation_id("inv-1");
    vec![
        StreamedChunk::empty().with_metadata(meta.clone()),
        StreamedChunk::partial("Step 1").with_metadata(meta.clone()),
        StreamedChunk::partial("\nStep 2").with_metadata(meta.clone()),
        StreamedChunk::complete("Step 1\nStep 2\nNEED_REVISION").with_metadata(meta.clone()),
        StreamedChunk::partial("   ").with_metadata(meta.clone()),
        StreamedChunk::empty().with_metadata(meta),
    ]
}

#[test]
fn test_rewrite_only_touches_last_text_chunk() {
    let round = sample_round();
    let rewritten = rewrite_last_text(round.clone(), "Step 1\nStep 2");

    assert_eq!(rewritten.len(), round.len());
    for (idx, (before, after)) in round.iter().zip(rewritten.iter()).enumerate() {
        if idx == 3 {
            assert_eq!(after.text.as_deref(), Some("Step 1\nStep 2"));
            assert_eq!(after.partial, before.partial);
            assert_eq!(after.metadata, before.metadata);
        } else {
            assert_eq!(after, before, "chunk {} changed", idx);
        }
    }
}

#[test]
fn test_rewrite_targets_partial_chunk_when_it_is_last() {
    let round = vec![
        StreamedChunk::complete("Verification"),
        StreamedChunk::partial(" passed."),
    ];
    let rewritten = rewrite_last_text(round, "Moving on.");
    assert_eq!(rewritten[0].text.as_deref(), Some("Verification"));
    assert_eq!(rewritten[1].text.as_deref(), Some("Moving on."));
    assert!(rewritten[1].partial);
}

#[test]
fn test_rewrite_without_text_is_identity() {
    let round = vec![
        StreamedChunk::empty(),
        StreamedChunk::partial("  \n"),
        StreamedChunk::empty(),
    ];
    assert_eq!(rewrite_last_text(round.clone(), "anything"), round);
    assert!(rewrite_last_text(Vec::new(), "anything").is_empty());
}

#[test]
fn test_relay_matches_batch_rewrite() {
    let round = sample_round();
    for replacement in [Some("Step 1\nStep 2"), None] {
        let mut relay = RoundRelay::new();
        let mut released = Vec::new();
        for chunk in round.clone() {
            released.extend(relay.push(chunk));
        }
        released.extend(relay.finish(replacement));

        let expected = match replacement {
            Some(text) => rewrite_last_text(round.clone(), text),
            None => round.clone(),
        };
        assert_eq!(released, expected);
    }
}

#[test]
fn test_relay_forwards_before_round_end() {
    let mut relay = RoundRelay::new();

    // Nothing text-bearing yet: forward immediately.
    assert_eq!(relay.push(StreamedChunk::empty()).len(), 1);

    // A text chunk is held until a newer text chunk arrives.
    assert!(relay.push(StreamedChunk::partial("a")).is_empty());
    assert!(relay.push(StreamedChunk::empty()).is_empty());
    assert_eq!(relay.held(), 2);

    let released = relay.push(StreamedChunk::partial("b"));
    assert_eq!(released.len(), 2);
    assert_eq!(released[0].text.as_deref(), Some("a"));
    assert_eq!(relay.held(), 1);
    assert_eq!(relay.forwarded(), 3);

    let tail = relay.finish(None);
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].text.as_deref(), Some("b"));
}

#[test]
fn test_accumulator_replace_semantics() {
    let mut acc = TextAccumulator::new();
    acc.observe(&StreamedChunk::partial("ignored delta"));
    assert_eq!(acc.text(), "");

    acc.observe(&StreamedChunk::complete("  first snapshot \n"));
    assert_eq!(acc.text(), "first snapshot");

    acc.observe(&StreamedChunk::complete("   "));
    acc.observe(&StreamedChunk::empty());
    assert_eq!(acc.text(), "first snapshot");

    acc.observe(&StreamedChunk::complete("second snapshot"));
    assert_eq!(acc.complete_chunks(), 2);
    assert_eq!(acc.into_text(), "second snapshot");
}
