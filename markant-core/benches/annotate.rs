//! Annotation throughput benchmarks

use criterion::{criterion_group, criterion_main, Criterion};
use markant_core::{Annotator, AnnotatorConfig, MarkerDefinition, SpanPolicy};
use std::hint::black_box;

fn definitions() -> Vec<MarkerDefinition> {
    vec![
        MarkerDefinition::atomic("ATO_MUSTER", 0.7).with_regex("Muster"),
        MarkerDefinition::atomic("ATO_IMMER", 0.6).with_regex(r"\bimmer\b"),
        MarkerDefinition::composed("SEM_MUSTER", [("ATO_MUSTER", 1.0), ("ATO_IMMER", 0.5)])
            .with_activation("total_children >= 1")
            .with_span_policy(SpanPolicy::sentence_union(1)),
    ]
}

fn document(bytes: usize) -> String {
    let mut text = String::with_capacity(bytes + 64);
    let mut i = 0;
    while text.len() < bytes {
        if i % 5 == 0 {
            text.push_str(&format!("Satz {i} zeigt immer dasselbe Muster. "));
        } else {
            text.push_str(&format!("Satz {i} bleibt ohne Auffälligkeiten. "));
        }
        i += 1;
    }
    text
}

fn bench_single_window(c: &mut Criterion) {
    let annotator = Annotator::new(&definitions()).unwrap();
    let text = document(8_000);
    c.bench_function("annotate_8kb_single_window", |b| {
        b.iter(|| annotator.annotate(black_box(&text)).unwrap())
    });
}

fn bench_chunked(c: &mut Criterion) {
    let config = AnnotatorConfig::builder()
        .chunk_threshold_bytes(12_000)
        .chunk_overlap_bytes(400)
        .build()
        .unwrap();
    let annotator = Annotator::with_config(&definitions(), config).unwrap();
    let text = document(256_000);
    c.bench_function("annotate_256kb_chunked", |b| {
        b.iter(|| annotator.annotate(black_box(&text)).unwrap())
    });
}

criterion_group!(benches, bench_single_window, bench_chunked);
criterion_main!(benches);
