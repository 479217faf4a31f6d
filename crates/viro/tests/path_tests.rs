//! Path walking: objects, positional access, association blocks, eval
//! segments, set-paths, get-paths, and every path error id.

use viro::{Datum, Error, ErrorId, Evaluator};

fn eval(code: &str) -> Result<Datum, Error> {
    Evaluator::new().do_source(code, "test")
}

fn eval_ok(code: &str) -> Datum {
    eval(code).expect("evaluation failed")
}

// =============================================================================
// 1. Reading
// =============================================================================

#[test]
fn object_field_access() {
    assert_eq!(eval_ok("o: object [x: 1]\no.x"), Datum::Integer(1));
    assert_eq!(
        eval_ok("o: object [a: object [b: \"deep\"]]\no.a.b"),
        Datum::String("deep".to_owned())
    );
}

#[test]
fn integer_segments_are_one_based_positional() {
    assert_eq!(eval_ok("b: [10 20 30]\nb.2"), Datum::Integer(20));
    assert_eq!(eval_ok("s: \"hello\"\ns.2"), Datum::String("e".to_owned()));
    assert_eq!(eval_ok("bin: #{DEAD}\nbin.1"), Datum::Integer(0xDE));
    // the walk respects the series index
    assert_eq!(eval_ok("b: next [10 20 30]\nb.1"), Datum::Integer(20));
}

#[test]
fn word_segments_look_up_association_blocks() {
    assert_eq!(eval_ok("d: [a 1 b 2]\nd.b"), Datum::Integer(2));
    assert_eq!(eval_ok("d: [a 1]\nd.missing"), Datum::None);
}

#[test]
fn string_segments_match_object_fields() {
    assert_eq!(eval_ok("o: object [x: 7]\no.\"x\""), Datum::Integer(7));
}

#[test]
fn eval_segments_dispatch_on_the_produced_value() {
    assert_eq!(eval_ok("b: [10 20 30]\nb.(1 + 1)"), Datum::Integer(20));
    let code = "field: 'name\no: object [name: \"n\"]\no.(field)";
    assert_eq!(eval_ok(code), Datum::String("n".to_owned()));
}

#[test]
fn get_path_returns_functions_unapplied() {
    assert_eq!(
        eval_ok("o: object [f: fn [] [1]]\ntype? :o.f"),
        Datum::Word("function!".to_owned())
    );
}

#[test]
fn plain_path_applies_a_function_at_the_leaf() {
    assert_eq!(
        eval_ok("o: object [double: fn [n] [n * 2]]\no.double 21"),
        Datum::Integer(42)
    );
}

// =============================================================================
// 2. Set-paths
// =============================================================================

#[test]
fn set_path_into_object_and_block() {
    assert_eq!(eval_ok("o: object [x: 1]\no.x: 5\no.x"), Datum::Integer(5));
    assert_eq!(eval_ok("b: [1 2 3]\nb.2: 99\nb"), Datum::Block(vec![
        Datum::Integer(1),
        Datum::Integer(99),
        Datum::Integer(3),
    ]));
    assert_eq!(
        eval_ok("s: \"abc\"\ns.2: \"X\"\ns"),
        Datum::String("aXc".to_owned())
    );
    assert_eq!(
        eval_ok("bin: #{0000}\nbin.2: 255\nbin"),
        Datum::Binary(vec![0, 255])
    );
}

#[test]
fn set_path_returns_the_stored_value() {
    assert_eq!(eval_ok("o: object [x: 1]\no.x: 5"), Datum::Integer(5));
}

#[test]
fn set_path_evaluates_eval_segments_exactly_once() {
    let code = "log: []\nidx: fn [] [append log 1\n2]\ndata: [10 20 30]\ndata.(idx): 99\nreduce [length? log data.2]";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![Datum::Integer(1), Datum::Integer(99)])
    );
}

#[test]
fn set_path_word_segment_upserts_association_pairs() {
    assert_eq!(eval_ok("d: [a 1]\nd.a: 9\nselect d 'a"), Datum::Integer(9));
    assert_eq!(eval_ok("d: [a 1]\nd.b: 2\nselect d 'b"), Datum::Integer(2));
}

// =============================================================================
// 3. Path errors
// =============================================================================

#[test]
fn descending_through_none_is_none_path() {
    let err = eval("n: none\nn.x").expect_err("none base");
    assert_eq!(err.id, ErrorId::NonePath);
}

#[test]
fn missing_object_field_is_no_such_field() {
    let err = eval("o: object [a: 1]\no.b").expect_err("missing field");
    assert_eq!(err.id, ErrorId::NoSuchField);
}

#[test]
fn out_of_bounds_integer_segment_errors() {
    let err = eval("b: [1 2]\nb.9").expect_err("out of bounds");
    assert_eq!(err.id, ErrorId::OutOfBounds);
    let err = eval("b: [1 2]\nb.0").expect_err("index zero");
    assert_eq!(err.id, ErrorId::OutOfBounds);
}

#[test]
fn decimal_and_block_eval_segments_are_invalid_path() {
    let err = eval("b: [1 2]\nb.(1.5)").expect_err("decimal segment");
    assert_eq!(err.id, ErrorId::InvalidPath);
    let err = eval("b: [1 2]\nb.([1])").expect_err("block segment");
    assert_eq!(err.id, ErrorId::InvalidPath);
}

#[test]
fn integer_key_on_an_object_is_invalid_path() {
    let err = eval("o: object [a: 1]\no.2").expect_err("integer key");
    assert_eq!(err.id, ErrorId::InvalidPath);
}

#[test]
fn path_into_a_scalar_is_invalid_path() {
    let err = eval("x: 10\nx.y").expect_err("scalar base");
    assert_eq!(err.id, ErrorId::InvalidPath);
}

// =============================================================================
// 4. Error values as path bases
// =============================================================================

#[test]
fn error_values_expose_their_parts() {
    assert_eq!(
        eval_ok("e: make error! \"boom\"\ne.message"),
        Datum::String("boom".to_owned())
    );
    assert_eq!(
        eval_ok("e: make error! \"boom\"\ne.category"),
        Datum::Word("User".to_owned())
    );
    assert_eq!(
        eval_ok("e: make error! [category: 'Math id: 'div-zero message: \"d\"]\ne.id"),
        Datum::Word("div-zero".to_owned())
    );
}

#[test]
fn make_error_defaults_and_type() {
    assert_eq!(
        eval_ok("type? make error! \"x\""),
        Datum::Word("error!".to_owned())
    );
    assert_eq!(
        eval_ok("e: make error! [message: \"m\"]\ne.category"),
        Datum::Word("User".to_owned())
    );
}

// =============================================================================
// 5. Objects and make
// =============================================================================

#[test]
fn object_spec_sees_the_outer_scope() {
    assert_eq!(
        eval_ok("base: 10\no: object [x: base + 1]\no.x"),
        Datum::Integer(11)
    );
}

#[test]
fn make_object_extends_a_prototype() {
    let code = "proto: object [a: 1 b: 2]\nchild: make proto [b: 99 c: 3]\nreduce [child.a child.b child.c]";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![Datum::Integer(1), Datum::Integer(99), Datum::Integer(3)])
    );
    // the prototype is untouched
    assert_eq!(
        eval_ok("proto: object [b: 2]\nmake proto [b: 99]\nproto.b"),
        Datum::Integer(2)
    );
}

#[test]
fn objects_mold_with_field_order_preserved() {
    assert_eq!(
        eval_ok("mold object [a: 1 b: \"x\"]"),
        Datum::String("make object! [a: 1 b: \"x\"]".to_owned())
    );
}
