//! Mold and form: code-readable vs human-readable serialization, and the
//! parse/mold round-trip for canonical literals.

use pretty_assertions::assert_eq;
use viro::{Datum, Error, Evaluator};

fn eval(code: &str) -> Result<Datum, Error> {
    Evaluator::new().do_source(code, "test")
}

fn eval_ok(code: &str) -> Datum {
    eval(code).expect("evaluation failed")
}

fn molded(code: &str) -> String {
    match eval_ok(code) {
        Datum::String(s) => s,
        other => panic!("expected a string, got {other:?}"),
    }
}

// =============================================================================
// 1. mold
// =============================================================================

#[test]
fn mold_scalars() {
    assert_eq!(molded("mold 42"), "42");
    assert_eq!(molded("mold -7"), "-7");
    assert_eq!(molded("mold 3.7"), "3.7");
    assert_eq!(molded("mold 1.0"), "1.0");
    assert_eq!(molded("mold true"), "true");
    assert_eq!(molded("mold none"), "none");
}

#[test]
fn mold_strings_quote_and_escape() {
    assert_eq!(molded(r#"mold "hi""#), "\"hi\"");
    assert_eq!(molded(r#"mold "a\nb""#), "\"a\\nb\"");
    assert_eq!(molded(r#"mold "q\"q""#), "\"q\\\"q\"");
}

#[test]
fn mold_binaries_as_uppercase_spaced_pairs() {
    assert_eq!(molded("mold #{deadbeef}"), "#{DE AD BE EF}");
    assert_eq!(molded("mold #{}"), "#{}");
}

#[test]
fn mold_blocks_recursively() {
    assert_eq!(molded("mold [1 two \"three\" [4]]"), "[1 two \"three\" [4]]");
    assert_eq!(molded("mold next [1 2 3]"), "[2 3]");
}

#[test]
fn mold_word_flavors() {
    assert_eq!(molded("mold ['a]"), "['a]");
    assert_eq!(molded("mold [b: :c --d]"), "[b: :c --d]");
    assert_eq!(molded("mold [a.b.2]"), "[a.b.2]");
    assert_eq!(molded("mold [x.y: :x.y]"), "[x.y: :x.y]");
}

#[test]
fn mold_objects_as_make_object() {
    assert_eq!(
        molded("mold object [a: 1 s: \"x\"]"),
        "make object! [a: 1 s: \"x\"]"
    );
}

#[test]
fn mold_user_functions_show_spec_and_body() {
    assert_eq!(
        molded("mold fn [n --fast] [n + 1]"),
        "fn [n --fast] [n + 1]"
    );
}

// =============================================================================
// 2. form
// =============================================================================

#[test]
fn form_is_the_human_shape() {
    assert_eq!(molded(r#"form "hi""#), "hi");
    assert_eq!(molded("form #{DEAD}"), "DEAD");
    assert_eq!(molded("form [1 \"a\" b]"), "1 a b");
    assert_eq!(molded("form none"), "none");
    assert_eq!(molded("form true"), "true");
    assert_eq!(molded("form 3.7"), "3.7");
}

#[test]
fn form_objects_as_field_lines() {
    assert_eq!(molded("form object [a: 1 b: \"x\"]"), "a: 1\nb: x");
}

// =============================================================================
// 3. Round-trips
// =============================================================================

#[test]
fn parse_mold_round_trip_for_literals() {
    // do of the molded text re-parses and re-evaluates to an equal value
    for literal in ["42", "-7", "3.14", "\"a\\nb\"", "#{DEADBEEF}", "[1 [2] \"x\"]", "true", "none"] {
        let code = format!("v: {literal}\n= v do mold v");
        assert_eq!(
            eval(&code).expect("round trip evaluation"),
            Datum::Logic(true),
            "round trip failed for {literal}"
        );
    }
}

#[test]
fn molded_series_respect_their_index_on_round_trip() {
    assert_eq!(
        eval_ok("= [2 3] do mold next [1 2 3]"),
        Datum::Logic(true)
    );
}
