//! Series semantics: shared-buffer mutation, positional operations, and the
//! type-frame actions across block, string, and binary.

use viro::{Datum, Error, ErrorId, Evaluator};

fn eval(code: &str) -> Result<Datum, Error> {
    Evaluator::new().do_source(code, "test")
}

fn eval_ok(code: &str) -> Datum {
    eval(code).expect("evaluation failed")
}

fn ints(values: &[i64]) -> Datum {
    Datum::Block(values.iter().copied().map(Datum::Integer).collect())
}

// =============================================================================
// 1. Sharing and independence
// =============================================================================

#[test]
fn mutation_is_visible_through_every_reference() {
    // b shares s's buffer one element in; append through s grows b's view
    assert_eq!(
        eval_ok("s: [1 2 3]\nb: next s\nappend s 4\nlength? b"),
        Datum::Integer(3)
    );
}

#[test]
fn copy_produces_an_independent_buffer() {
    assert_eq!(
        eval_ok("s: [1 2]\nc: copy s\nappend c 3\nlength? s"),
        Datum::Integer(2)
    );
    assert_eq!(
        eval_ok("s: \"ab\"\nc: copy s\nappend c \"c\"\nlength? s"),
        Datum::Integer(2)
    );
}

#[test]
fn skip_obeys_the_length_invariant() {
    assert_eq!(eval_ok("length? skip [1 2 3 4] 2"), Datum::Integer(2));
    assert_eq!(eval_ok("length? skip [1 2] 9"), Datum::Integer(0));
    assert_eq!(eval_ok("length? skip \"hello\" 3"), Datum::Integer(2));
}

#[test]
fn positional_reads_respect_the_index() {
    assert_eq!(eval_ok("first next [1 2 3]"), Datum::Integer(2));
    assert_eq!(eval_ok("second [10 20 30]"), Datum::Integer(20));
    assert_eq!(eval_ok("tenth [1 2 3]"), Datum::None);
    assert_eq!(eval_ok("first []"), Datum::None);
    assert_eq!(eval_ok("first \"\""), Datum::None);
    assert_eq!(eval_ok("first #{}"), Datum::None);
    assert_eq!(eval_ok("first \"xyz\""), Datum::String("x".to_owned()));
    assert_eq!(eval_ok("first #{DEAD}"), Datum::Integer(0xDE));
}

// =============================================================================
// 2. Mutating operations
// =============================================================================

#[test]
fn insert_writes_at_the_index() {
    assert_eq!(eval_ok("s: [1 3]\ninsert next s 2\ns"), ints(&[1, 2, 3]));
}

#[test]
fn remove_with_part() {
    assert_eq!(eval_ok("s: [1 2 3 4]\nremove s\ns"), ints(&[2, 3, 4]));
    assert_eq!(eval_ok("s: [1 2 3 4]\nremove s --part 2\ns"), ints(&[3, 4]));
    let err = eval("remove [1] --part 5").expect_err("part beyond length");
    assert_eq!(err.id, ErrorId::OutOfBounds);
}

#[test]
fn take_removes_and_returns_the_front() {
    assert_eq!(eval_ok("s: [1 2 3 4]\ntake s 2"), ints(&[1, 2]));
    assert_eq!(eval_ok("s: [1 2 3 4]\nt: take s 2\ns"), ints(&[3, 4]));
    assert_eq!(eval_ok("take [1 2] 99"), ints(&[1, 2]));
    assert_eq!(eval_ok("take \"hello\" 2"), Datum::String("he".to_owned()));
}

#[test]
fn copy_part_limits_or_errors() {
    assert_eq!(eval_ok("copy --part 2 [1 2 3]"), ints(&[1, 2]));
    let err = eval("copy --part 9 [1 2]").expect_err("part beyond length");
    assert_eq!(err.id, ErrorId::OutOfBounds);
}

#[test]
fn sort_and_reverse_are_in_place() {
    assert_eq!(eval_ok("s: [3 1 2]\nsort s\ns"), ints(&[1, 2, 3]));
    assert_eq!(eval_ok("s: [1 2 3]\nreverse s\ns"), ints(&[3, 2, 1]));
    assert_eq!(eval_ok("sort \"cba\""), Datum::String("abc".to_owned()));
    // the part before the index is untouched
    assert_eq!(eval_ok("s: [9 3 1]\nsort next s\ns"), ints(&[9, 1, 3]));
}

#[test]
fn sorting_a_mixed_type_block_errors() {
    let err = eval("sort [1 \"a\"]").expect_err("mixed types");
    assert_eq!(err.id, ErrorId::InvalidOperation);
}

#[test]
fn string_append_coercion() {
    assert_eq!(eval_ok("append \"ab\" \"cd\""), Datum::String("abcd".to_owned()));
    assert_eq!(eval_ok("append \"n=\" 42"), Datum::String("n=42".to_owned()));
    let err = eval("append \"ab\" [1]").expect_err("structured addition");
    assert_eq!(err.id, ErrorId::TypeMismatch);
}

#[test]
fn binary_append_coercion() {
    assert_eq!(eval_ok("append #{01} 255"), Datum::Binary(vec![1, 255]));
    assert_eq!(eval_ok("append #{01} #{0203}"), Datum::Binary(vec![1, 2, 3]));
    assert_eq!(eval_ok("append #{} \"hi\""), Datum::Binary(vec![b'h', b'i']));
    let err = eval("append #{01} 256").expect_err("byte out of range");
    assert_eq!(err.id, ErrorId::InvalidOperation);
}

// =============================================================================
// 3. find / put / select
// =============================================================================

#[test]
fn find_returns_one_based_absolute_indices() {
    assert_eq!(eval_ok("find [a b c] 'b"), Datum::Integer(2));
    assert_eq!(eval_ok("find next [1 2 3] 3"), Datum::Integer(3));
    assert_eq!(eval_ok("find [1 2 1] 1 --last"), Datum::Integer(3));
    assert_eq!(eval_ok("find [1 2] 9"), Datum::None);
    assert_eq!(eval_ok("find \"hello\" \"lo\""), Datum::Integer(4));
    assert_eq!(eval_ok("find #{DEADBE} #{AD}"), Datum::Integer(2));
}

#[test]
fn find_on_strings_takes_only_string_needles() {
    let err = eval("find \"abc\" 1").expect_err("non-string needle");
    assert_eq!(err.id, ErrorId::TypeMismatch);
}

#[test]
fn put_updates_creates_and_removes_pairs() {
    assert_eq!(eval_ok("d: [a 1 b 2]\nput d 'a 9\nselect d 'a"), Datum::Integer(9));
    assert_eq!(eval_ok("d: [a 1]\nput d 'b 2\nselect d 'b"), Datum::Integer(2));
    assert_eq!(
        eval_ok("d: [a 1 b 2]\nput d 'a none\nd"),
        Datum::Block(vec![Datum::Word("b".to_owned()), Datum::Integer(2)])
    );
    // odd tail: the key gets its missing value slot
    assert_eq!(eval_ok("d: [a]\nput d 'a 1\nd.2"), Datum::Integer(1));
}

#[test]
fn select_with_default() {
    assert_eq!(eval_ok("select [a 1] 'a"), Datum::Integer(1));
    assert_eq!(eval_ok("select [a 1] 'b"), Datum::None);
    assert_eq!(eval_ok("select [a 1] 'b --default 99"), Datum::Integer(99));
    assert_eq!(
        eval_ok("select object [x: 5] 'x"),
        Datum::Integer(5)
    );
}

// =============================================================================
// 4. Set operations
// =============================================================================

#[test]
fn set_operations_preserve_left_order_and_dedupe() {
    assert_eq!(eval_ok("intersect [1 2 2 3] [2 3 4]"), ints(&[2, 3]));
    assert_eq!(eval_ok("union [1 2] [2 3]"), ints(&[1, 2, 3]));
    assert_eq!(eval_ok("difference [1 2] [2 3]"), ints(&[1, 3]));
    assert_eq!(eval_ok("intersect \"abc\" \"cbd\""), Datum::String("bc".to_owned()));
    assert_eq!(eval_ok("union #{01} #{0102}"), Datum::Binary(vec![1, 2]));
}

#[test]
fn set_operations_require_matching_kinds() {
    let err = eval("union [1] \"a\"").expect_err("mixed series kinds");
    assert_eq!(err.id, ErrorId::TypeMismatch);
}
