//! End-to-end tests over the public API

use markant_core::{
    Annotator, AnnotatorConfig, Diagnostic, Family, MarkerDefinition, MarkerKind, PromotionRule,
    SpanPolicy,
};

const GASLIGHTING_TEXT: &str = "Du bildest dir das nur ein. Das habe ich nie gesagt.";

fn gaslighting_definitions() -> Vec<MarkerDefinition> {
    vec![
        MarkerDefinition::atomic("ATO_GASLIGHTING_TERM", 0.7)
            .with_regex(r"bildest dir das nur ein"),
        MarkerDefinition::composed("SEM_GASLIGHTING_PATTERN", [("ATO_GASLIGHTING_TERM", 1.0)])
            .with_activation("ATO_GASLIGHTING_TERM >= 1")
            .with_span_policy(SpanPolicy::sentence_union(1)),
    ]
}

#[test]
fn gaslighting_scenario_reports_one_sentence_level_annotation() {
    let annotator = Annotator::new(&gaslighting_definitions()).unwrap();
    let result = annotator.annotate(GASLIGHTING_TEXT).unwrap();

    assert_eq!(result.len(), 1);
    let annotation = &result.annotations[0];
    assert_eq!(annotation.marker_id, "SEM_GASLIGHTING_PATTERN");
    assert_eq!(annotation.family, Family::Sem);
    assert_eq!(annotation.kind, MarkerKind::Composed);
    // Exactly the first sentence; the underlying ATO candidate lost the
    // overlap to the higher-priority SEM
    assert_eq!(
        &GASLIGHTING_TEXT[annotation.start..annotation.end],
        "Du bildest dir das nur ein."
    );
    assert_eq!(result.family_counts.sem, 1);
    assert_eq!(result.family_counts.ato, 0);
    assert_eq!(result.stats.atomic_candidates, 1);
    assert_eq!(result.stats.composed_candidates, 1);
    assert_eq!(result.stats.reported, 1);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn repeated_runs_are_bit_identical() {
    let annotator = Annotator::new(&gaslighting_definitions()).unwrap();
    let first = annotator.annotate(GASLIGHTING_TEXT).unwrap();
    let second = annotator.annotate(GASLIGHTING_TEXT).unwrap();
    assert_eq!(first, second);
}

#[test]
fn composed_marker_requires_its_evidence() {
    // Hierarchy monotonicity: the SEM fires only while the child count
    // satisfies the activation formula
    let defs = vec![
        MarkerDefinition::atomic("ATO_VORWURF", 0.8).with_regex("immer"),
        MarkerDefinition::composed("SEM_VERALLGEMEINERUNG", [("ATO_VORWURF", 1.0)])
            .with_activation("ATO_VORWURF >= 2"),
    ];
    let annotator = Annotator::new(&defs).unwrap();

    let below = annotator.annotate("Du kommst immer zu spät.").unwrap();
    assert!(below.iter().all(|a| a.family != Family::Sem));

    let at = annotator
        .annotate("Du kommst immer zu spät und redest immer dazwischen.")
        .unwrap();
    assert!(at.iter().any(|a| a.marker_id == "SEM_VERALLGEMEINERUNG"));
}

#[test]
fn broken_definition_is_isolated_per_window() {
    let defs = vec![
        MarkerDefinition::atomic("ATO_GASLIGHTING_TERM", 0.7)
            .with_regex(r"bildest dir das nur ein"),
        MarkerDefinition::composed("SEM_BROKEN", [("ATO_GASLIGHTING_TERM", 1.0)])
            .with_activation("ATO_NOT_DECLARED >= 1"),
        MarkerDefinition::composed("SEM_HEALTHY", [("ATO_GASLIGHTING_TERM", 1.0)])
            .with_span_policy(SpanPolicy::sentence_union(1)),
    ];
    let annotator = Annotator::new(&defs).unwrap();
    let result = annotator.annotate(GASLIGHTING_TEXT).unwrap();

    assert!(result.iter().any(|a| a.marker_id == "SEM_HEALTHY"));
    assert!(result.iter().all(|a| a.marker_id != "SEM_BROKEN"));
    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(
        &result.diagnostics[0],
        Diagnostic::ActivationFailed { marker_id, .. } if marker_id == "SEM_BROKEN"
    ));
}

#[test]
fn promotion_rule_retargets_reported_family() {
    let defs = vec![
        MarkerDefinition::atomic("ATO_GASLIGHTING_TERM", 0.9)
            .with_regex(r"bildest dir das nur ein"),
        MarkerDefinition::composed("SEM_GASLIGHTING_PATTERN", [("ATO_GASLIGHTING_TERM", 1.0)])
            .with_promotion(PromotionRule {
                activate_when: Some("score >= 0.8 && total_children >= 1".to_string()),
                min_score: None,
                promote_to: Some(Family::Clu),
            }),
    ];
    let annotator = Annotator::new(&defs).unwrap();
    let result = annotator.annotate(GASLIGHTING_TEXT).unwrap();
    let promoted = result
        .iter()
        .find(|a| a.marker_id == "SEM_GASLIGHTING_PATTERN")
        .expect("promoted marker reported");
    assert_eq!(promoted.family, Family::Clu);
    assert_eq!(result.family_counts.clu, 1);
}

#[test]
fn demote_patterns_suppress_false_positives() {
    let defs = vec![MarkerDefinition::atomic("ATO_ABSOLUT", 0.7)
        .with_regex("immer")
        .with_demote("fast immer")];
    let annotator = Annotator::new(&defs).unwrap();

    assert!(annotator.annotate("Das passiert fast immer.").unwrap().is_empty());
    assert_eq!(annotator.annotate("Das passiert immer.").unwrap().len(), 1);
}

#[test]
fn labels_are_carried_into_annotations() {
    let defs = vec![MarkerDefinition::atomic("ATO_GASLIGHTING_TERM", 0.7)
        .with_regex(r"bildest dir das nur ein")
        .with_label("Realitätsverleugnung")];
    let annotator = Annotator::new(&defs).unwrap();
    let result = annotator.annotate(GASLIGHTING_TEXT).unwrap();
    assert_eq!(
        result.annotations[0].label.as_deref(),
        Some("Realitätsverleugnung")
    );
}

#[test]
fn custom_family_priority_changes_the_winner() {
    let config = AnnotatorConfig::builder()
        .family_priority([Family::Ato, Family::Sem, Family::Clu, Family::Mema])
        .build()
        .unwrap();
    let annotator = Annotator::with_config(&gaslighting_definitions(), config).unwrap();
    let result = annotator.annotate(GASLIGHTING_TEXT).unwrap();
    assert_eq!(result.annotations[0].marker_id, "ATO_GASLIGHTING_TERM");
}

#[test]
fn empty_inputs_produce_empty_sets() {
    let annotator = Annotator::new(&gaslighting_definitions()).unwrap();
    assert!(annotator.annotate("").unwrap().is_empty());

    let empty = Annotator::new(&[]).unwrap();
    assert!(empty.annotate(GASLIGHTING_TEXT).unwrap().is_empty());
}

#[test]
fn annotations_are_ordered_and_non_overlapping() {
    let defs = vec![
        MarkerDefinition::atomic("ATO_A", 0.7).with_regex("Muster"),
        MarkerDefinition::atomic("ATO_B", 0.9).with_regex("Muster eins"),
        MarkerDefinition::composed("SEM_C", [("ATO_A", 1.0)])
            .with_span_policy(SpanPolicy::sentence_union(1)),
    ];
    let annotator = Annotator::new(&defs).unwrap();
    let text = "Das ist Muster eins. Hier steht nichts. Das ist Muster zwei.";
    let result = annotator.annotate(text).unwrap();
    assert!(!result.is_empty());
    for pair in result.annotations.windows(2) {
        assert!(pair[0].start <= pair[1].start);
        assert!(pair[0].end <= pair[1].start, "{pair:?} overlap");
    }
}

#[test]
fn one_off_annotate_matches_the_processor() {
    let config = AnnotatorConfig::default();
    let via_fn =
        markant_core::annotate(GASLIGHTING_TEXT, &gaslighting_definitions(), &config).unwrap();
    let via_annotator = Annotator::new(&gaslighting_definitions())
        .unwrap()
        .annotate(GASLIGHTING_TEXT)
        .unwrap();
    assert_eq!(via_fn, via_annotator);
}
