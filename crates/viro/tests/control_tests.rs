//! Control flow: conditionals, loops, break/continue levels, return
//! boundaries, and the transparent natives.

use viro::{Datum, Error, ErrorId, Evaluator};

fn eval(code: &str) -> Result<Datum, Error> {
    Evaluator::new().do_source(code, "test")
}

fn eval_ok(code: &str) -> Datum {
    eval(code).expect("evaluation failed")
}

// =============================================================================
// 1. when / if / while
// =============================================================================

#[test]
fn when_returns_branch_value_or_none() {
    assert_eq!(eval_ok("when 1 < 2 [\"yes\"]"), Datum::String("yes".to_owned()));
    assert_eq!(eval_ok("when 2 < 1 [\"yes\"]"), Datum::None);
}

#[test]
fn if_requires_both_branches_and_returns_the_chosen_value() {
    assert_eq!(eval_ok("if true [1] [2]"), Datum::Integer(1));
    assert_eq!(eval_ok("if false [1] [2]"), Datum::Integer(2));
    let err = eval("if true [1] 2").expect_err("non-block branch");
    assert_eq!(err.id, ErrorId::TypeMismatch);
}

#[test]
fn while_re_evaluates_block_conditions() {
    assert_eq!(eval_ok("x: 0\nwhile [x < 5] [x: x + 1]\nx"), Datum::Integer(5));
}

#[test]
fn while_with_falsy_constant_never_runs() {
    assert_eq!(eval_ok("while false [1]"), Datum::None);
    assert_eq!(eval_ok("while none [1]"), Datum::None);
}

#[test]
fn while_with_truthy_constant_runs_until_break() {
    assert_eq!(
        eval_ok("x: 0\nwhile true [x: x + 1\nwhen (= x 3) [break]]\nx"),
        Datum::Integer(3)
    );
}

// =============================================================================
// 2. loop
// =============================================================================

#[test]
fn loop_returns_last_body_value_or_none_for_zero() {
    assert_eq!(eval_ok("loop 3 [7]"), Datum::Integer(7));
    assert_eq!(eval_ok("loop 0 [7]"), Datum::None);
}

#[test]
fn loop_count_must_be_non_negative() {
    let err = eval("loop -1 [1]").expect_err("negative count");
    assert_eq!(err.id, ErrorId::InvalidOperation);
}

#[test]
fn loop_with_index_binds_a_zero_based_counter() {
    assert_eq!(
        eval_ok("acc: []\nloop 3 --with-index 'i [append acc i]\nacc"),
        Datum::Block(vec![Datum::Integer(0), Datum::Integer(1), Datum::Integer(2)])
    );
}

// =============================================================================
// 3. foreach
// =============================================================================

#[test]
fn foreach_over_a_block() {
    assert_eq!(
        eval_ok("total: 0\nforeach [1 2 3] 'x [total: total + x]\ntotal"),
        Datum::Integer(6)
    );
}

#[test]
fn foreach_groups_fill_missing_elements_with_none() {
    let code = "acc: []\nforeach [1 2 3] ['a 'b] [append acc b]\nacc";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![Datum::Integer(2), Datum::None])
    );
}

#[test]
fn foreach_over_a_string_yields_single_character_strings() {
    assert_eq!(
        eval_ok("acc: \"\"\nforeach \"abc\" 'c [append acc c]\nacc"),
        Datum::String("abc".to_owned())
    );
}

#[test]
fn foreach_over_a_binary_yields_bytes() {
    assert_eq!(
        eval_ok("total: 0\nforeach #{01 02 03} 'b [total: total + b]\ntotal"),
        Datum::Integer(6)
    );
}

#[test]
fn foreach_with_index_counts_groups() {
    let code = "acc: []\nforeach [a b c d] ['x 'y] --with-index 'i [append acc i]\nacc";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![Datum::Integer(0), Datum::Integer(1)])
    );
}

// =============================================================================
// 4. break / continue
// =============================================================================

#[test]
fn break_is_local_to_the_innermost_loop() {
    let code = "x: 0\nloop 3 [loop 3 [x: x + 1\nbreak]]\nx";
    assert_eq!(eval_ok(code), Datum::Integer(3));
}

#[test]
fn break_levels_exits_nested_loops() {
    let code = "x: 0\nloop 3 [loop 3 [x: x + 1\nbreak --levels 2]]\nx";
    assert_eq!(eval_ok(code), Datum::Integer(1));
}

#[test]
fn continue_skips_to_the_next_iteration() {
    let code = "acc: []\nloop 5 --with-index 'i [when (= i 2) [continue]\nappend acc i]\nacc";
    assert_eq!(
        eval_ok(code),
        Datum::Block(vec![
            Datum::Integer(0),
            Datum::Integer(1),
            Datum::Integer(3),
            Datum::Integer(4),
        ])
    );
}

#[test]
fn break_levels_validation() {
    assert_eq!(
        eval("loop 1 [break --levels 0]").expect_err("zero levels").id,
        ErrorId::InvalidOperation
    );
    assert_eq!(
        eval("loop 1 [break --levels \"x\"]").expect_err("non-integer levels").id,
        ErrorId::TypeMismatch
    );
}

#[test]
fn break_crossing_a_function_boundary_becomes_a_script_error() {
    let err = eval("f: fn [] [break]\nloop 3 [f]").expect_err("escaping break");
    assert_eq!(err.id, ErrorId::BreakOutsideLoop);
    let err = eval("g: fn [] [continue]\nloop 3 [g]").expect_err("escaping continue");
    assert_eq!(err.id, ErrorId::ContinueOutsideLoop);
}

#[test]
fn top_level_break_is_an_error() {
    let err = eval("break").expect_err("top-level break");
    assert_eq!(err.id, ErrorId::BreakOutsideLoop);
}

// =============================================================================
// 5. return
// =============================================================================

#[test]
fn return_exits_the_enclosing_function() {
    assert_eq!(eval_ok("f: fn [x] [return x\n99]\nf 7"), Datum::Integer(7));
    assert_eq!(eval_ok("f: fn [] [return]\nf"), Datum::None);
}

#[test]
fn return_passes_through_transparent_natives() {
    assert_eq!(eval_ok("f: fn [] [do [return 1]\n2]\nf"), Datum::Integer(1));
    assert_eq!(eval_ok("f: fn [] [loop 3 [return 5]\n9]\nf"), Datum::Integer(5));
    assert_eq!(eval_ok("f: fn [] [when true [return 4]\n9]\nf"), Datum::Integer(4));
}

#[test]
fn top_level_return_terminates_the_script_with_its_value() {
    assert_eq!(eval_ok("return 5\n99"), Datum::Integer(5));
}

// =============================================================================
// 6. do / reduce / compose
// =============================================================================

#[test]
fn do_evaluates_blocks_and_strings() {
    assert_eq!(eval_ok("do [1 + 2]"), Datum::Integer(3));
    assert_eq!(eval_ok("do \"3 * 4\""), Datum::Integer(12));
    assert_eq!(eval_ok("do 42"), Datum::Integer(42));
}

#[test]
fn do_raises_error_values() {
    let err = eval("do make error! \"boom\"").expect_err("raised error");
    assert_eq!(err.message, "boom");
}

#[test]
fn reduce_evaluates_each_expression() {
    assert_eq!(
        eval_ok("reduce [1 + 1 2 * 3]"),
        Datum::Block(vec![Datum::Integer(2), Datum::Integer(6)])
    );
}

#[test]
fn compose_replaces_parens_only() {
    assert_eq!(
        eval_ok("compose [a (1 + 1) b]"),
        Datum::Block(vec![
            Datum::Word("a".to_owned()),
            Datum::Integer(2),
            Datum::Word("b".to_owned()),
        ])
    );
}
