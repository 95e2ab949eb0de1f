//! Chunked-processing correctness over the public API

use markant_core::{Annotator, AnnotatorConfig, EngineError, Family, MarkerDefinition, SpanPolicy};

fn definitions() -> Vec<MarkerDefinition> {
    vec![
        MarkerDefinition::atomic("ATO_MUSTER", 0.7).with_regex("Muster"),
        MarkerDefinition::atomic("ATO_SIGNAL", 0.8).with_regex(r"\bSignal\b"),
        MarkerDefinition::composed("SEM_MUSTER", [("ATO_MUSTER", 1.0)])
            .with_span_policy(SpanPolicy::sentence_union(1)),
    ]
}

fn document(sentences: usize) -> String {
    (0..sentences)
        .map(|i| {
            if i % 3 == 0 {
                format!("Satz {i} enthält ein Muster. ")
            } else if i % 7 == 0 {
                format!("Satz {i} sendet ein Signal. ")
            } else {
                format!("Satz {i} ist unauffällig. ")
            }
        })
        .collect()
}

fn chunked_config(threshold: usize, overlap: usize) -> AnnotatorConfig {
    AnnotatorConfig::builder()
        .chunk_threshold_bytes(threshold)
        .chunk_overlap_bytes(overlap)
        .build()
        .unwrap()
}

#[test]
fn chunking_forced_and_disabled_agree() {
    let text = document(120);
    let whole = Annotator::new(&definitions())
        .unwrap()
        .annotate(&text)
        .unwrap();
    let chunked = Annotator::with_config(&definitions(), chunked_config(400, 120))
        .unwrap()
        .annotate(&text)
        .unwrap();

    assert_eq!(whole.stats.windows, 1);
    assert!(chunked.stats.windows > 1);
    assert_eq!(whole.annotations, chunked.annotations);
    assert_eq!(whole.family_counts, chunked.family_counts);
}

#[test]
fn chunked_offsets_are_document_global() {
    let text = document(100);
    let result = Annotator::with_config(&definitions(), chunked_config(300, 90))
        .unwrap()
        .annotate(&text)
        .unwrap();

    assert!(!result.is_empty());
    for annotation in &result {
        let span = &text[annotation.start..annotation.end];
        match annotation.family {
            Family::Sem => assert!(span.contains("Muster"), "bad SEM span {span:?}"),
            Family::Ato => assert!(span.contains("Signal"), "bad ATO span {span:?}"),
            other => panic!("unexpected family {other}"),
        }
    }
}

#[test]
fn overlap_margins_produce_no_duplicates() {
    let text = document(100);
    let result = Annotator::with_config(&definitions(), chunked_config(300, 150))
        .unwrap()
        .annotate(&text)
        .unwrap();

    let mut spans: Vec<(usize, usize, &str)> = result
        .iter()
        .map(|a| (a.start, a.end, a.marker_id.as_str()))
        .collect();
    let before = spans.len();
    spans.sort();
    spans.dedup();
    assert_eq!(spans.len(), before, "duplicate detections survived merge");

    for pair in result.annotations.windows(2) {
        assert!(pair[0].end <= pair[1].start, "overlap in final set");
    }
}

#[test]
fn chunked_runs_are_deterministic() {
    let text = document(90);
    let annotator = Annotator::with_config(&definitions(), chunked_config(350, 100)).unwrap();
    let first = annotator.annotate(&text).unwrap();
    let second = annotator.annotate(&text).unwrap();
    assert_eq!(first, second);
}

#[test]
fn hard_cap_rejects_oversized_documents() {
    let config = AnnotatorConfig::builder()
        .chunk_threshold_bytes(1000)
        .chunk_overlap_bytes(100)
        .max_input_bytes(2000)
        .build()
        .unwrap();
    let annotator = Annotator::with_config(&definitions(), config).unwrap();
    let text = document(200);
    assert!(text.len() > 2000);
    let err = annotator.annotate(&text).unwrap_err();
    assert!(matches!(err, EngineError::InputTooLarge { cap: 2000, .. }));
}

#[test]
fn single_threaded_chunking_matches_default() {
    let text = document(80);
    let parallel = Annotator::with_config(&definitions(), chunked_config(300, 90))
        .unwrap()
        .annotate(&text)
        .unwrap();

    let mut single = chunked_config(300, 90);
    single.threads = Some(1);
    let sequential = Annotator::with_config(&definitions(), single)
        .unwrap()
        .annotate(&text)
        .unwrap();

    assert_eq!(parallel, sequential);
}
