//! Parser behavior: literal forms, word flavors, paths, source locations,
//! and every syntax error id.

use viro::{Datum, Error, ErrorCategory, ErrorId, Evaluator};

fn eval(code: &str) -> Result<Datum, Error> {
    Evaluator::new().do_source(code, "test")
}

fn eval_ok(code: &str) -> Datum {
    eval(code).expect("evaluation failed")
}

fn syntax_err(code: &str) -> Error {
    let err = eval(code).expect_err("expected a syntax error");
    assert_eq!(err.category, ErrorCategory::Syntax, "category for {code:?}");
    assert!(err.where_.is_empty(), "syntax errors carry no call stack");
    err
}

// =============================================================================
// 1. Literals
// =============================================================================

#[test]
fn integer_literals() {
    assert_eq!(eval_ok("42"), Datum::Integer(42));
    assert_eq!(eval_ok("-7"), Datum::Integer(-7));
    assert_eq!(eval_ok("+3"), Datum::Integer(3));
}

#[test]
fn decimal_literals() {
    assert_eq!(eval_ok("3.14"), Datum::Decimal(3.14));
    assert_eq!(eval_ok("-0.5"), Datum::Decimal(-0.5));
}

#[test]
fn string_literals_with_escapes() {
    assert_eq!(
        eval_ok(r#""a\nb\t\"c\\""#),
        Datum::String("a\nb\t\"c\\".to_owned())
    );
}

#[test]
fn binary_literals_are_space_tolerant_and_case_insensitive() {
    assert_eq!(
        eval_ok("#{DE AD be ef}"),
        Datum::Binary(vec![0xDE, 0xAD, 0xBE, 0xEF])
    );
    assert_eq!(eval_ok("#{}"), Datum::Binary(vec![]));
}

#[test]
fn logic_and_none_words() {
    assert_eq!(eval_ok("true"), Datum::Logic(true));
    assert_eq!(eval_ok("false"), Datum::Logic(false));
    assert_eq!(eval_ok("none"), Datum::None);
}

#[test]
fn blocks_are_inert() {
    assert_eq!(
        eval_ok("[1 two \"three\"]"),
        Datum::Block(vec![
            Datum::Integer(1),
            Datum::Word("two".to_owned()),
            Datum::String("three".to_owned()),
        ])
    );
}

#[test]
fn parens_evaluate_to_their_last_value() {
    assert_eq!(eval_ok("(1 2 3)"), Datum::Integer(3));
    assert_eq!(eval_ok("()"), Datum::None);
}

// =============================================================================
// 2. Words, flavors, tokens
// =============================================================================

#[test]
fn lit_word_evaluates_to_the_word() {
    assert_eq!(eval_ok("'abc"), Datum::Word("abc".to_owned()));
}

#[test]
fn punctuation_only_words_parse() {
    // bound as natives, so resolve and apply
    assert_eq!(eval_ok("(<= 1 2)"), Datum::Logic(true));
    assert_eq!(eval_ok("(<> 1 2)"), Datum::Logic(true));
}

#[test]
fn dotted_numeric_chains_beyond_two_segments_are_paths() {
    // 1.2 is a decimal, 1.2.3 indexes into nothing and fails the walk
    let err = eval("x: 1.2.3").expect_err("path walk on an integer head");
    assert_eq!(err.id, ErrorId::InvalidPath);
}

// =============================================================================
// 3. Source locations
// =============================================================================

#[test]
fn locations_are_one_based_per_value() {
    let mut ev = Evaluator::new();
    let parsed = ev.parse("a\n  b c", "script.viro").unwrap();
    let map = parsed.source_map();
    assert_eq!(map.file(), "script.viro");
    let first = map.location(0).unwrap();
    assert_eq!((first.line, first.column), (1, 1));
    let second = map.location(1).unwrap();
    assert_eq!((second.line, second.column), (2, 3));
    let third = map.location(2).unwrap();
    assert_eq!((third.line, third.column), (2, 5));
}

#[test]
fn nested_values_get_locations_too() {
    let mut ev = Evaluator::new();
    let parsed = ev.parse("[1 [2]]", "t").unwrap();
    // outer block, 1, inner block, 2
    assert_eq!(parsed.source_map().len(), 4);
}

// =============================================================================
// 4. Syntax errors
// =============================================================================

#[test]
fn unclosed_block() {
    assert_eq!(syntax_err("[1 2").id, ErrorId::UnclosedBlock);
    assert_eq!(syntax_err("(1 2").id, ErrorId::UnclosedBlock);
    assert_eq!(syntax_err("]").id, ErrorId::UnclosedBlock);
}

#[test]
fn unterminated_string_reports_unclosed() {
    assert_eq!(syntax_err("\"abc").id, ErrorId::UnclosedBlock);
}

#[test]
fn binary_with_odd_digit_count() {
    assert_eq!(syntax_err("#{ABC}").id, ErrorId::InvalidBinaryLength);
}

#[test]
fn binary_with_bad_digit() {
    assert_eq!(syntax_err("#{AG}").id, ErrorId::InvalidBinaryDigit);
}

#[test]
fn binary_with_only_punctuation_is_invalid_character() {
    assert_eq!(syntax_err("#{,}").id, ErrorId::InvalidCharacter);
}

#[test]
fn leading_eval_segment_is_path_eval_base() {
    assert_eq!(syntax_err("(a).b").id, ErrorId::PathEvalBase);
    assert_eq!(syntax_err("x: (a).b").id, ErrorId::PathEvalBase);
}

#[test]
fn unknown_escape_is_invalid_character() {
    assert_eq!(syntax_err(r#""a\qb""#).id, ErrorId::InvalidCharacter);
}

#[test]
fn syntax_errors_carry_a_source_line_as_near() {
    let err = syntax_err("x: 1\n[1 2");
    assert_eq!(err.near, "[1 2");
}
