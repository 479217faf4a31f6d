//! Functions: closures, recursion, refinements, arity, and per-call body
//! isolation.

use viro::{Datum, Error, ErrorId, Evaluator};

fn eval(code: &str) -> Result<Datum, Error> {
    Evaluator::new().do_source(code, "test")
}

fn eval_ok(code: &str) -> Datum {
    eval(code).expect("evaluation failed")
}

// =============================================================================
// 1. Calls and closures
// =============================================================================

#[test]
fn positional_arguments_bind_in_order() {
    assert_eq!(eval_ok("f: fn [a b] [a - b]\nf 10 4"), Datum::Integer(6));
}

#[test]
fn closures_capture_their_defining_frame() {
    let code = "adder: fn [n] [fn [m] [m + n]]\nadd5: adder 5\nadd5 3";
    assert_eq!(eval_ok(code), Datum::Integer(8));
}

#[test]
fn each_closure_gets_its_own_captured_frame() {
    let code = "adder: fn [n] [fn [m] [m + n]]\nadd1: adder 1\nadd9: adder 9\nreduce [add1 0 add9 0]";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![Datum::Integer(1), Datum::Integer(9)])
    );
}

#[test]
fn function_writes_stay_local() {
    // a set-word inside a function binds in the call frame, not the caller's
    assert_eq!(eval_ok("x: 1\nf: fn [] [x: 99]\nf\nx"), Datum::Integer(1));
}

#[test]
fn series_mutation_crosses_the_function_boundary() {
    assert_eq!(
        eval_ok("s: [1]\nf: fn [] [append s 2]\nf\nlength? s"),
        Datum::Integer(2)
    );
}

#[test]
fn mutual_recursion() {
    let code = "\
is-even: fn [n] [if (= n 0) [true] [(is-odd (- n 1))]]
is-odd: fn [n] [if (= n 0) [false] [(is-even (- n 1))]]
is-even 10";
    assert_eq!(eval_ok(code), Datum::Logic(true));
}

#[test]
fn literal_blocks_in_bodies_are_fresh_per_call() {
    let code = "f: fn [] [b: []\nappend b 1\nlength? b]\nf\nf\nf";
    assert_eq!(eval_ok(code), Datum::Integer(1));
}

#[test]
fn literal_strings_in_bodies_are_fresh_per_call() {
    let code = "f: fn [] [s: \"\"\nappend s \"x\"\nlength? s]\nf\nf";
    assert_eq!(eval_ok(code), Datum::Integer(1));
}

// =============================================================================
// 2. Refinements
// =============================================================================

#[test]
fn flag_refinements_bind_true_or_none() {
    let code = "f: fn [--verbose] [if verbose [\"on\"] [\"off\"]]\nreduce [f --verbose f]";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![
            Datum::String("on".to_owned()),
            Datum::String("off".to_owned()),
        ])
    );
}

#[test]
fn value_refinements_bind_flag_and_value() {
    let code = "f: fn [x --scale s] [if scale [x * s] [x]]\nreduce [f 3 --scale 10 f 3]";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![Datum::Integer(30), Datum::Integer(3)])
    );
}

#[test]
fn refinements_may_precede_positional_arguments() {
    assert_eq!(
        eval_ok("f: fn [x --scale s] [if scale [x * s] [x]]\nf --scale 2 21"),
        Datum::Integer(42)
    );
}

#[test]
fn unknown_refinement() {
    let err = eval("f: fn [x] [x]\nf --bogus 1").expect_err("unknown refinement");
    assert_eq!(err.id, ErrorId::UnknownRefinement);
    assert!(err.message.contains("bogus"), "message: {}", err.message);
}

#[test]
fn duplicate_refinement() {
    let err = eval("f: fn [--a] [a]\nf --a --a").expect_err("duplicate");
    assert_eq!(err.id, ErrorId::DuplicateRefinement);
}

#[test]
fn value_refinement_without_a_value() {
    let err = eval("b: [1 2]\ncopy b --part").expect_err("missing value");
    assert_eq!(err.id, ErrorId::RefinementNeedsValue);
}

// =============================================================================
// 3. Arity and specs
// =============================================================================

#[test]
fn too_few_arguments_is_arg_count() {
    let err = eval("f: fn [a b c] [a]\nf 1 2").expect_err("missing args");
    assert_eq!(err.id, ErrorId::ArgCount);
    assert!(err.message.contains("expected 3, got 2"), "message: {}", err.message);
}

#[test]
fn doc_strings_are_allowed_in_specs() {
    assert_eq!(
        eval_ok("f: fn [\"doubles a number\" n] [n * 2]\nf 4"),
        Datum::Integer(8)
    );
}

#[test]
fn invalid_spec_values_error() {
    let err = eval("fn [1] [1]").expect_err("integer in spec");
    assert_eq!(err.id, ErrorId::InvalidOperation);
}

#[test]
fn functions_take_their_name_from_the_first_binding() {
    let err = eval("my-func: fn [a] [a]\nmy-func").expect_err("missing arg");
    assert!(
        err.message.contains("my-func"),
        "arity error names the function: {}",
        err.message
    );
}

// =============================================================================
// 4. Help output
// =============================================================================

#[test]
fn help_writes_the_doc_record() {
    use viro::CollectStringPrint;
    let collect = CollectStringPrint::default();
    let mut ev = Evaluator::new();
    ev.set_print(Box::new(collect.clone()));
    ev.do_source("help 'append", "test").unwrap();
    let text = collect.take();
    assert!(text.contains("append is a function."), "help output: {text}");
    assert!(text.contains("params:"), "help output: {text}");
}
