//! Formula behaviour tests
//!
//! End-to-end checks through the public API:
//! - Literal arithmetic against values computed directly in Rust
//! - Positional binding, determinism, comparison results
//! - Error kinds and offsets, redefinition safety

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use formula_core::{ErrorKind, Formula, FormulaError};
use std::f64::consts::{E, PI};

fn eval(text: &str) -> f64 {
    Formula::<f64>::parse(text).unwrap().evaluate(&[])
}

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-12 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn kind_and_offset(text: &str) -> (ErrorKind, usize) {
    let err = Formula::<f64>::parse(text).unwrap_err();
    (err.kind().unwrap(), err.offset().unwrap())
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_literal_arithmetic() {
    assert_eq!(eval("2+3*4"), 14.0);
    assert_eq!(eval("(2+3)*4"), 20.0);
    assert_eq!(eval("pow(2,10)"), 1024.0);
}

#[test]
fn test_matches_reference_values() {
    let cases: [(&str, f64); 10] = [
        ("1.5e3 / 3 - 0.25", 1.5e3 / 3.0 - 0.25),
        ("sin(pi/6) + cos(pi/3)", (PI / 6.0).sin() + (PI / 3.0).cos()),
        ("log(e*e)", (E * E).ln()),
        ("log10(2) + log2(10)", 2f64.log10() + 10f64.log2()),
        ("atan2(1, -1)", 1f64.atan2(-1.0)),
        ("tanh(0.5) * sinh(1) / cosh(2)", 0.5f64.tanh() * 1f64.sinh() / 2f64.cosh()),
        ("asin(0.5) + acos(0.5) + atan(1)", 0.5f64.asin() + 0.5f64.acos() + 1f64.atan()),
        ("mod(-7.5, 2)", -7.5f64 % 2.0),
        ("-(2 - 10) / (4 * 0.5)", -(2.0 - 10.0) / (4.0 * 0.5)),
        ("tan(0.3) - exp(-1)", 0.3f64.tan() - (-1f64).exp()),
    ];
    for (text, expected) in cases {
        assert_close(eval(text), expected);
    }
}

#[test]
fn test_ieee_results_are_not_errors() {
    assert!(eval("1/0").is_infinite());
    assert!(eval("sqrt(-1)").is_nan());
    assert!(eval("log(0)").is_infinite());
}

#[test]
fn test_named_constant_precision() {
    assert_eq!(eval("pi"), PI);
    assert_eq!(eval("e"), E);
    assert_eq!(
        Formula::<f32>::parse("pi").unwrap().evaluate(&[]),
        std::f32::consts::PI
    );
}

// ============================================================================
// Variables
// ============================================================================

#[test]
fn test_multi_variable_binding() {
    let mut formula = Formula::<f64>::new();
    formula.define("sqrt(x*x + y*y); x; y").unwrap();
    assert_eq!(formula.evaluate(&[3.0, 4.0]), 5.0);
}

#[test]
fn test_binding_follows_declaration_order() {
    let mut formula = Formula::<f64>::parse("a - b; b; a").unwrap();
    // First argument binds `b`
    assert_eq!(formula.evaluate(&[1.0, 10.0]), 9.0);
}

#[test]
fn test_repeated_evaluation_is_bit_identical() {
    let mut formula = Formula::<f64>::parse("exp(-(t - 5)*(t - 5)/0.1) * sin(t); t").unwrap();
    let first = formula.evaluate(&[4.7]);
    for _ in 0..100 {
        assert_eq!(formula.evaluate(&[4.7]).to_bits(), first.to_bits());
        assert_eq!(formula.value().to_bits(), first.to_bits());
    }
}

#[test]
fn test_comparisons_return_zero_or_one() {
    assert_eq!(eval("gt(5,3)"), 1.0);
    assert_eq!(eval("lt(5,3)"), 0.0);

    let mut formula = Formula::<f64>::parse("eq(a, b) + gt(a, b) + lt(a, b); a; b").unwrap();
    for (a, b) in [(1.0, 2.0), (2.0, 1.0), (3.0, 3.0), (-0.0, 0.0)] {
        // Exactly one comparison holds for ordered operands
        assert_eq!(formula.evaluate(&[a, b]), 1.0);
    }
    assert_eq!(formula.evaluate(&[f64::NAN, 1.0]), 0.0);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_kinds() {
    assert_eq!(kind_and_offset("(1+2"), (ErrorKind::UnmatchedParentheses, 0));
    assert_eq!(kind_and_offset("foo(1)"), (ErrorKind::UnknownSymbol, 0));
    assert_eq!(kind_and_offset("1 + + "), (ErrorKind::SyntaxError, 6));
    assert_eq!(kind_and_offset("sin(x); 1x"), (ErrorKind::InvalidVariableName, 8));
}

#[test]
fn test_error_offsets_are_deterministic() {
    for text in ["(1+2", "foo(1)", "1 + + ", "sin(x); 1x", "pow(1)", "2 $ 3"] {
        let first = Formula::<f64>::parse(text).unwrap_err();
        for _ in 0..10 {
            assert_eq!(Formula::<f64>::parse(text).unwrap_err(), first);
        }
    }
}

#[test]
fn test_undeclared_variable_is_unknown() {
    assert_eq!(kind_and_offset("x + y; x"), (ErrorKind::UnknownSymbol, 4));
}

#[test]
fn test_redefinition_with_invalid_text_leaves_formula_empty() {
    let mut formula = Formula::<f64>::parse("x * 2; x").unwrap();
    assert_eq!(formula.evaluate(&[21.0]), 42.0);

    assert!(formula.define("x * ; x").is_err());
    assert!(!formula.is_defined());
    assert_eq!(formula.arity(), 0);
    assert_eq!(formula.node_count(), 0);
}

#[test]
#[should_panic]
fn test_evaluate_after_failed_redefinition_panics() {
    let mut formula = Formula::<f64>::parse("1 + 1").unwrap();
    let _ = formula.define("1 +");
    formula.evaluate(&[]);
}

#[test]
fn test_error_report_caret() {
    let text = "2 * (3 + 4";
    let report = Formula::<f64>::parse(text).unwrap_err().report(text);
    assert_eq!(report.code, 1);
    assert_eq!(report.caret_line().unwrap(), "2 * (3 + 4\n    ^");
}

// ============================================================================
// Threads
// ============================================================================

#[test]
fn test_independent_formulas_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut formula = Formula::<f64>::parse("k * x; x; k").unwrap();
                (0..1000)
                    .map(|x| formula.evaluate(&[x as f64, i as f64]))
                    .sum::<f64>()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), i as f64 * 499_500.0);
    }
}

#[test]
fn test_shared_reads_across_threads() {
    let mut formula = Formula::<f64>::parse("x * x; x").unwrap();
    formula.set_variable(0, 3.0);
    let formula = &formula;

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(move || assert_eq!(formula.value(), 9.0));
        }
    });
}

#[test]
fn test_formula_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&FormulaError::syntax(0));
}

// ============================================================================
// Nesting depth
// ============================================================================

fn nested(depth: usize) -> String {
    format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_moderate_nesting_on_default_stack() {
    assert_eq!(eval(&nested(100)), 1.0);
    // An even number of signs cancels out
    assert_eq!(eval(&format!("{}1", "-".repeat(100))), 1.0);
}

#[test]
fn test_deep_nesting_with_larger_stack() {
    let value = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| eval(&nested(2000)))
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(value, 1.0);
}
