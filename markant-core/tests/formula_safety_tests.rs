//! Formula safety: anything outside the closed grammar dies at load time

use markant_core::{Annotator, DefinitionError, MarkerDefinition};

fn set_with_activation(formula: &str) -> Vec<MarkerDefinition> {
    vec![
        MarkerDefinition::atomic("ATO_A", 0.7).with_regex("foo"),
        MarkerDefinition::composed("SEM_B", [("ATO_A", 1.0)]).with_activation(formula),
    ]
}

#[test]
fn code_like_constructs_are_rejected_before_any_document() {
    let hostile = [
        "__import__('os').system('rm -rf /')",
        "exec('print(1)')",
        "open('/etc/passwd')",
        "ATO_A.__class__",
        "lambda: 1",
        "[x for x in range(10)]",
        "ATO_A; DROP TABLE markers",
        "a = 1",
        "f(x)",
        "ATO_A + 1 >= 2",
    ];
    for formula in hostile {
        let err = Annotator::new(&set_with_activation(formula)).unwrap_err();
        assert!(
            matches!(err, DefinitionError::FormulaSyntax { .. }),
            "formula {formula:?} was not rejected as a syntax error"
        );
    }
}

#[test]
fn malformed_formulas_are_rejected() {
    for formula in ["", "ATO_A >=", "(ATO_A >= 1", ">= 1", "ATO_A && ", "1..2 > 0"] {
        assert!(
            Annotator::new(&set_with_activation(formula)).is_err(),
            "formula {formula:?} was accepted"
        );
    }
}

#[test]
fn well_formed_formulas_compile() {
    let fine = [
        "ATO_A >= 1",
        "total_children >= 2 && score > 0.5",
        "(ATO_A >= 1 || ATO_A == 0) && !(score < 0.1)",
        "ATO_A != 3",
    ];
    for formula in fine {
        assert!(
            Annotator::new(&set_with_activation(formula)).is_ok(),
            "formula {formula:?} was rejected"
        );
    }
}

#[test]
fn promotion_formulas_get_the_same_treatment() {
    use markant_core::PromotionRule;
    let defs = vec![
        MarkerDefinition::atomic("ATO_A", 0.7).with_regex("foo"),
        MarkerDefinition::composed("SEM_B", [("ATO_A", 1.0)]).with_promotion(PromotionRule {
            activate_when: Some("eval('code')".to_string()),
            min_score: None,
            promote_to: None,
        }),
    ];
    assert!(matches!(
        Annotator::new(&defs).unwrap_err(),
        DefinitionError::FormulaSyntax { .. }
    ));
}
