//! Series actions, dispatched through type-frames.
//!
//! The root frame holds one dispatcher per action name; the implementation
//! is resolved through the type-frame of the first argument, so `first`,
//! `append`, `length?`, ... work uniformly across block/paren/string/binary
//! (plus `select` on objects) without per-call branching. A type without an
//! implementation raises `action-no-impl`.

use crate::{
    error::{Error, ErrorId, EvalResult, Unwind},
    eval::{self, Evaluator, Invocation},
    types::{BinarySeries, BlockSeries, StringSeries, Type},
    value::Value,
};

use super::{DEF, NativeDef, register_action, register_type_impl};

pub(crate) fn register(ev: &mut Evaluator) {
    for def in ACTIONS {
        register_action(ev, def);
    }
    for ty in [Type::Block, Type::Paren, Type::String, Type::Binary, Type::Object] {
        let name = ev.interns.intern(&ty.to_string());
        ev.frames.register_type_frame(ty, name);
    }
    for ty in [Type::Block, Type::Paren] {
        for ordinal in ORDINALS {
            register_type_impl(ev, ty, ordinal, blk_nth);
        }
        register_type_impl(ev, ty, "length?", blk_length);
        register_type_impl(ev, ty, "next", blk_next);
        register_type_impl(ev, ty, "skip", blk_skip);
        register_type_impl(ev, ty, "take", blk_take);
        register_type_impl(ev, ty, "append", blk_append);
        register_type_impl(ev, ty, "insert", blk_insert);
        register_type_impl(ev, ty, "remove", blk_remove);
        register_type_impl(ev, ty, "copy", blk_copy);
        register_type_impl(ev, ty, "find", blk_find);
        register_type_impl(ev, ty, "sort", blk_sort);
        register_type_impl(ev, ty, "reverse", blk_reverse);
        register_type_impl(ev, ty, "put", blk_put);
        register_type_impl(ev, ty, "select", blk_select);
        register_type_impl(ev, ty, "intersect", blk_intersect);
        register_type_impl(ev, ty, "union", blk_union);
        register_type_impl(ev, ty, "difference", blk_difference);
    }
    for ordinal in ORDINALS {
        register_type_impl(ev, Type::String, ordinal, str_nth);
        register_type_impl(ev, Type::Binary, ordinal, bin_nth);
    }
    register_type_impl(ev, Type::String, "length?", str_length);
    register_type_impl(ev, Type::String, "next", str_next);
    register_type_impl(ev, Type::String, "skip", str_skip);
    register_type_impl(ev, Type::String, "take", str_take);
    register_type_impl(ev, Type::String, "append", str_append);
    register_type_impl(ev, Type::String, "insert", str_insert);
    register_type_impl(ev, Type::String, "remove", str_remove);
    register_type_impl(ev, Type::String, "copy", str_copy);
    register_type_impl(ev, Type::String, "find", str_find);
    register_type_impl(ev, Type::String, "sort", str_sort);
    register_type_impl(ev, Type::String, "reverse", str_reverse);
    register_type_impl(ev, Type::String, "intersect", str_intersect);
    register_type_impl(ev, Type::String, "union", str_union);
    register_type_impl(ev, Type::String, "difference", str_difference);
    register_type_impl(ev, Type::Binary, "length?", bin_length);
    register_type_impl(ev, Type::Binary, "next", bin_next);
    register_type_impl(ev, Type::Binary, "skip", bin_skip);
    register_type_impl(ev, Type::Binary, "take", bin_take);
    register_type_impl(ev, Type::Binary, "append", bin_append);
    register_type_impl(ev, Type::Binary, "insert", bin_insert);
    register_type_impl(ev, Type::Binary, "remove", bin_remove);
    register_type_impl(ev, Type::Binary, "copy", bin_copy);
    register_type_impl(ev, Type::Binary, "find", bin_find);
    register_type_impl(ev, Type::Binary, "sort", bin_sort);
    register_type_impl(ev, Type::Binary, "reverse", bin_reverse);
    register_type_impl(ev, Type::Binary, "intersect", bin_intersect);
    register_type_impl(ev, Type::Binary, "union", bin_union);
    register_type_impl(ev, Type::Binary, "difference", bin_difference);
    register_type_impl(ev, Type::Object, "select", obj_select);
}

const ORDINALS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

const ACTIONS: &[NativeDef] = &[
    NativeDef { name: "first", doc: "Positional read of the first element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "second", doc: "Positional read of the second element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "third", doc: "Positional read of the third element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "fourth", doc: "Positional read of the fourth element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "fifth", doc: "Positional read of the fifth element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "sixth", doc: "Positional read of the sixth element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "seventh", doc: "Positional read of the seventh element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "eighth", doc: "Positional read of the eighth element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "ninth", doc: "Positional read of the ninth element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "tenth", doc: "Positional read of the tenth element; none when out of range.", params: &["series"], ..DEF },
    NativeDef { name: "length?", doc: "Remaining elements from the series' index.", params: &["series"], ..DEF },
    NativeDef { name: "next", doc: "The same series advanced by one element.", params: &["series"], ..DEF },
    NativeDef { name: "skip", doc: "The same series advanced by an offset, clamped to the buffer.", params: &["series", "offset"], ..DEF },
    NativeDef { name: "take", doc: "Removes and returns the first elements from the series' index.", params: &["series", "count"], ..DEF },
    NativeDef { name: "append", doc: "Appends a value to the series' buffer; visible through every reference.", params: &["series", "value"], ..DEF },
    NativeDef { name: "insert", doc: "Inserts a value at the series' index.", params: &["series", "value"], ..DEF },
    NativeDef { name: "remove", doc: "Removes one element (or --part n) at the series' index.", params: &["series"], refinements: &[("part", true)], ..DEF },
    NativeDef { name: "copy", doc: "An independent copy of the series (--part n limits the length).", params: &["series"], refinements: &[("part", true)], ..DEF },
    NativeDef { name: "find", doc: "1-based absolute index of the first (--last: last) occurrence, or none.", params: &["series", "value"], refinements: &[("last", false)], ..DEF },
    NativeDef { name: "sort", doc: "Sorts the series in place.", params: &["series"], ..DEF },
    NativeDef { name: "reverse", doc: "Reverses the series in place.", params: &["series"], ..DEF },
    NativeDef { name: "put", doc: "Stores a key/value pair in an association block; a none value removes the pair.", params: &["series", "key", "value"], ..DEF },
    NativeDef { name: "select", doc: "Association or field lookup with optional --default.", params: &["series", "key"], refinements: &[("default", true)], ..DEF },
    NativeDef { name: "intersect", doc: "Unique elements present in both series, in left-operand order.", params: &["series", "other"], ..DEF },
    NativeDef { name: "union", doc: "Unique elements of both series, left-operand elements first.", params: &["series", "other"], ..DEF },
    NativeDef { name: "difference", doc: "Unique elements present in exactly one of the two series.", params: &["series", "other"], ..DEF },
];

// --- shared helpers --------------------------------------------------------

fn ordinal(ev: &Evaluator, inv: &Invocation) -> usize {
    let name = inv.name.map(|sym| ev.interns.resolve(sym)).unwrap_or("first");
    ORDINALS.iter().position(|o| *o == name).map_or(1, |i| i + 1)
}

fn part_count(ev: &Evaluator, inv: &Invocation, len: usize, op: &str) -> Result<Option<usize>, Unwind> {
    match inv.refinement_int(ev, ev.wk.part)? {
        None => Ok(None),
        Some(n) if n < 0 || n as usize > len => Err(Error::script(
            ErrorId::OutOfBounds,
            format!("Part {n} out of bounds for '{op}' (length {len})"),
        )
        .into()),
        Some(n) => Ok(Some(n as usize)),
    }
}

fn mismatch(ev: &Evaluator, inv: &Invocation, expected: &str, got: Type) -> Unwind {
    Error::script(
        ErrorId::TypeMismatch,
        format!(
            "Type mismatch for '{}': expected {expected}, got {got}",
            inv.op_name(ev)
        ),
    )
    .into()
}

fn contains_by<T>(haystack: &[T], needle: &T, eq: impl Fn(&T, &T) -> bool) -> bool {
    haystack.iter().any(|x| eq(x, needle))
}

fn set_intersect<T: Clone>(left: &[T], right: &[T], eq: impl Fn(&T, &T) -> bool) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for x in left {
        if contains_by(right, x, &eq) && !contains_by(&out, x, &eq) {
            out.push(x.clone());
        }
    }
    out
}

fn set_union<T: Clone>(left: &[T], right: &[T], eq: impl Fn(&T, &T) -> bool) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for x in left.iter().chain(right) {
        if !contains_by(&out, x, &eq) {
            out.push(x.clone());
        }
    }
    out
}

fn set_difference<T: Clone>(left: &[T], right: &[T], eq: impl Fn(&T, &T) -> bool) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for x in left {
        if !contains_by(right, x, &eq) && !contains_by(&out, x, &eq) {
            out.push(x.clone());
        }
    }
    for x in right {
        if !contains_by(left, x, &eq) && !contains_by(&out, x, &eq) {
            out.push(x.clone());
        }
    }
    out
}

// --- block / paren ---------------------------------------------------------

/// The dispatched first argument, keeping its block/paren kind.
fn block_arg(ev: &Evaluator, inv: &Invocation) -> Result<(BlockSeries, bool), Unwind> {
    match inv.arg(0) {
        Value::Block(b) => Ok((b.clone(), false)),
        Value::Paren(b) => Ok((b.clone(), true)),
        other => Err(mismatch(ev, inv, "block!", other.ty())),
    }
}

fn block_value(series: BlockSeries, paren: bool) -> Value {
    if paren {
        Value::Paren(series)
    } else {
        Value::Block(series)
    }
}

fn blk_other_arg(ev: &Evaluator, inv: &Invocation) -> Result<BlockSeries, Unwind> {
    match inv.arg(1) {
        Value::Block(b) | Value::Paren(b) => Ok(b.clone()),
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!("operands must be same type for '{}', got {}", inv.op_name(ev), other.ty()),
        )
        .into()),
    }
}

fn blk_nth(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, _) = block_arg(ev, &inv)?;
    let n = ordinal(ev, &inv);
    Ok(s.get(n - 1).unwrap_or(Value::None))
}

fn blk_length(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, _) = block_arg(ev, &inv)?;
    Ok(Value::Int(s.len() as i64))
}

fn blk_next(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    Ok(block_value(s.skip(1), paren))
}

fn blk_skip(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let offset = inv.int(ev, 1)?;
    Ok(block_value(s.skip(offset), paren))
}

fn blk_take(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let count = inv.int(ev, 1)?.max(0) as usize;
    let k = count.min(s.len());
    let taken: Vec<Value> = {
        let mut buf = s.buf.borrow_mut();
        let start = s.index.min(buf.len());
        buf.drain(start..start + k).collect()
    };
    Ok(block_value(BlockSeries::new(taken), paren))
}

fn blk_append(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let value = inv.take_arg(1);
    s.buf.borrow_mut().push(value);
    Ok(block_value(s, paren))
}

fn blk_insert(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let value = inv.take_arg(1);
    let mut buf = s.buf.borrow_mut();
    let at = s.index.min(buf.len());
    buf.insert(at, value);
    drop(buf);
    Ok(block_value(s, paren))
}

fn blk_remove(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let count = part_count(ev, &inv, s.len(), "remove")?.unwrap_or(1);
    let count = count.min(s.len());
    {
        let mut buf = s.buf.borrow_mut();
        let start = s.index.min(buf.len());
        buf.drain(start..start + count);
    }
    Ok(block_value(s, paren))
}

fn blk_copy(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let copied = match part_count(ev, &inv, s.len(), "copy")? {
        Some(n) => BlockSeries::new(s.tail_values().into_iter().take(n).collect()),
        None => s.copy_tail(),
    };
    Ok(block_value(copied, paren))
}

fn blk_find(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, _) = block_arg(ev, &inv)?;
    let needle = inv.arg(1);
    let values = s.tail_values();
    let hit = if inv.has_refinement(ev.wk.last) {
        values.iter().rposition(|v| v.equals(needle))
    } else {
        values.iter().position(|v| v.equals(needle))
    };
    Ok(hit.map_or(Value::None, |i| Value::Int((s.index + i + 1) as i64)))
}

fn blk_sort(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let mut values = s.tail_values();
    if let Some(first) = values.first() {
        for v in &values {
            if first.order(v).is_none() {
                return Err(Error::script(
                    ErrorId::InvalidOperation,
                    "Cannot sort a mixed-type block",
                )
                .into());
            }
        }
    }
    values.sort_by(|a, b| a.order(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut buf = s.buf.borrow_mut();
    let start = s.index.min(buf.len());
    buf.splice(start.., values);
    drop(buf);
    Ok(block_value(s, paren))
}

fn blk_reverse(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let mut buf = s.buf.borrow_mut();
    let start = s.index.min(buf.len());
    buf[start..].reverse();
    drop(buf);
    Ok(block_value(s, paren))
}

fn blk_put(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let key = inv.take_arg(1);
    let value = inv.take_arg(2);
    if matches!(value, Value::None) {
        // a none value removes the pair
        let len = s.len();
        let mut i = 0;
        while i < len {
            let matches = s.buf.borrow()[s.index + i].equals(&key);
            if matches {
                let mut buf = s.buf.borrow_mut();
                let end = (s.index + i + 2).min(buf.len());
                buf.drain(s.index + i..end);
                break;
            }
            i += 2;
        }
    } else {
        eval::assoc_store(&s, key, value);
    }
    Ok(block_value(s, paren))
}

fn blk_select(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, _) = block_arg(ev, &inv)?;
    let found = eval::assoc_lookup(&s, inv.arg(1));
    Ok(match found {
        Some(v) => v,
        None => inv.refinement(ev.wk.default).cloned().unwrap_or(Value::None),
    })
}

fn blk_intersect(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let other = blk_other_arg(ev, &inv)?;
    let out = set_intersect(&s.tail_values(), &other.tail_values(), Value::equals);
    Ok(block_value(BlockSeries::new(out), paren))
}

fn blk_union(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let other = blk_other_arg(ev, &inv)?;
    let out = set_union(&s.tail_values(), &other.tail_values(), Value::equals);
    Ok(block_value(BlockSeries::new(out), paren))
}

fn blk_difference(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (s, paren) = block_arg(ev, &inv)?;
    let other = blk_other_arg(ev, &inv)?;
    let out = set_difference(&s.tail_values(), &other.tail_values(), Value::equals);
    Ok(block_value(BlockSeries::new(out), paren))
}

// --- string ----------------------------------------------------------------

fn str_arg(ev: &Evaluator, inv: &Invocation) -> Result<StringSeries, Unwind> {
    match inv.arg(0) {
        Value::Str(s) => Ok(s.clone()),
        other => Err(mismatch(ev, inv, "string!", other.ty())),
    }
}

fn str_nth(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let n = ordinal(ev, &inv);
    Ok(s.get(n - 1)
        .map_or(Value::None, |c| Value::Str(StringSeries::from_chars(vec![c]))))
}

fn str_length(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    Ok(Value::Int(s.len() as i64))
}

fn str_next(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    Ok(Value::Str(s.skip(1)))
}

fn str_skip(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let offset = inv.int(ev, 1)?;
    Ok(Value::Str(s.skip(offset)))
}

fn str_take(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let count = inv.int(ev, 1)?.max(0) as usize;
    let k = count.min(s.len());
    let taken: Vec<char> = {
        let mut buf = s.buf.borrow_mut();
        let start = s.index.min(buf.len());
        buf.drain(start..start + k).collect()
    };
    Ok(Value::Str(StringSeries::from_chars(taken)))
}

/// Additions a string accepts: other strings, and scalars in their formed
/// text. Structured values are a type error.
fn string_addition(ev: &Evaluator, inv: &Invocation, value: &Value) -> Result<Vec<char>, Unwind> {
    match value {
        Value::Str(other) => Ok(other.tail_chars()),
        Value::Int(_) | Value::Decimal(_) | Value::Logic(_) | Value::None | Value::Word(_) | Value::LitWord(_) => {
            Ok(ev.form_value(value).chars().collect())
        }
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for '{}': cannot add {} to a string",
                inv.op_name(ev),
                other.ty()
            ),
        )
        .into()),
    }
}

fn str_append(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let chars = string_addition(ev, &inv, inv.arg(1))?;
    s.buf.borrow_mut().extend(chars);
    Ok(Value::Str(s))
}

fn str_insert(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let chars = string_addition(ev, &inv, inv.arg(1))?;
    let mut buf = s.buf.borrow_mut();
    let at = s.index.min(buf.len());
    buf.splice(at..at, chars);
    drop(buf);
    Ok(Value::Str(s))
}

fn str_remove(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let count = part_count(ev, &inv, s.len(), "remove")?.unwrap_or(1);
    let count = count.min(s.len());
    {
        let mut buf = s.buf.borrow_mut();
        let start = s.index.min(buf.len());
        buf.drain(start..start + count);
    }
    Ok(Value::Str(s))
}

fn str_copy(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let copied = match part_count(ev, &inv, s.len(), "copy")? {
        Some(n) => StringSeries::from_chars(s.tail_chars().into_iter().take(n).collect()),
        None => s.copy_tail(),
    };
    Ok(Value::Str(copied))
}

fn str_find(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let Value::Str(needle) = inv.arg(1) else {
        return Err(mismatch(ev, &inv, "string!", inv.arg(1).ty()));
    };
    let haystack = s.tail_chars();
    let needle = needle.tail_chars();
    if needle.is_empty() || needle.len() > haystack.len() {
        return Ok(Value::None);
    }
    let positions = 0..=haystack.len() - needle.len();
    let hit = if inv.has_refinement(ev.wk.last) {
        positions.rev().find(|&i| haystack[i..i + needle.len()] == needle[..])
    } else {
        positions.clone().find(|&i| haystack[i..i + needle.len()] == needle[..])
    };
    Ok(hit.map_or(Value::None, |i| Value::Int((s.index + i + 1) as i64)))
}

fn str_sort(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let mut buf = s.buf.borrow_mut();
    let start = s.index.min(buf.len());
    buf[start..].sort_unstable();
    drop(buf);
    Ok(Value::Str(s))
}

fn str_reverse(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let mut buf = s.buf.borrow_mut();
    let start = s.index.min(buf.len());
    buf[start..].reverse();
    drop(buf);
    Ok(Value::Str(s))
}

fn str_other_arg(ev: &Evaluator, inv: &Invocation) -> Result<Vec<char>, Unwind> {
    match inv.arg(1) {
        Value::Str(other) => Ok(other.tail_chars()),
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!("operands must be same type for '{}', got {}", inv.op_name(ev), other.ty()),
        )
        .into()),
    }
}

fn str_intersect(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let other = str_other_arg(ev, &inv)?;
    let out = set_intersect(&s.tail_chars(), &other, |a, b| a == b);
    Ok(Value::Str(StringSeries::from_chars(out)))
}

fn str_union(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let other = str_other_arg(ev, &inv)?;
    let out = set_union(&s.tail_chars(), &other, |a, b| a == b);
    Ok(Value::Str(StringSeries::from_chars(out)))
}

fn str_difference(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let s = str_arg(ev, &inv)?;
    let other = str_other_arg(ev, &inv)?;
    let out = set_difference(&s.tail_chars(), &other, |a, b| a == b);
    Ok(Value::Str(StringSeries::from_chars(out)))
}

// --- binary ----------------------------------------------------------------

fn bin_arg(ev: &Evaluator, inv: &Invocation) -> Result<BinarySeries, Unwind> {
    match inv.arg(0) {
        Value::Binary(b) => Ok(b.clone()),
        other => Err(mismatch(ev, inv, "binary!", other.ty())),
    }
}

fn bin_nth(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let n = ordinal(ev, &inv);
    Ok(b.get(n - 1).map_or(Value::None, |byte| Value::Int(i64::from(byte))))
}

fn bin_length(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    Ok(Value::Int(b.len() as i64))
}

fn bin_next(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    Ok(Value::Binary(b.skip(1)))
}

fn bin_skip(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let offset = inv.int(ev, 1)?;
    Ok(Value::Binary(b.skip(offset)))
}

fn bin_take(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let count = inv.int(ev, 1)?.max(0) as usize;
    let k = count.min(b.len());
    let taken: Vec<u8> = {
        let mut buf = b.buf.borrow_mut();
        let start = b.index.min(buf.len());
        buf.drain(start..start + k).collect()
    };
    Ok(Value::Binary(BinarySeries::new(taken)))
}

/// Additions a binary accepts: integers coerce to one byte in 0..255, other
/// binaries concatenate, strings contribute their UTF-8 bytes.
fn binary_addition(ev: &Evaluator, inv: &Invocation, value: &Value) -> Result<Vec<u8>, Unwind> {
    match value {
        Value::Int(n) => {
            if (0..=255).contains(n) {
                Ok(vec![*n as u8])
            } else {
                Err(Error::script(
                    ErrorId::InvalidOperation,
                    format!("Byte value out of range: {n}"),
                )
                .into())
            }
        }
        Value::Binary(other) => Ok(other.tail_bytes()),
        Value::Str(s) => Ok(s.tail_text().into_bytes()),
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for '{}': cannot add {} to a binary",
                inv.op_name(ev),
                other.ty()
            ),
        )
        .into()),
    }
}

fn bin_append(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let bytes = binary_addition(ev, &inv, inv.arg(1))?;
    b.buf.borrow_mut().extend(bytes);
    Ok(Value::Binary(b))
}

fn bin_insert(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let bytes = binary_addition(ev, &inv, inv.arg(1))?;
    let mut buf = b.buf.borrow_mut();
    let at = b.index.min(buf.len());
    buf.splice(at..at, bytes);
    drop(buf);
    Ok(Value::Binary(b))
}

fn bin_remove(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let count = part_count(ev, &inv, b.len(), "remove")?.unwrap_or(1);
    let count = count.min(b.len());
    {
        let mut buf = b.buf.borrow_mut();
        let start = b.index.min(buf.len());
        buf.drain(start..start + count);
    }
    Ok(Value::Binary(b))
}

fn bin_copy(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let copied = match part_count(ev, &inv, b.len(), "copy")? {
        Some(n) => BinarySeries::new(b.tail_bytes().into_iter().take(n).collect()),
        None => b.copy_tail(),
    };
    Ok(Value::Binary(copied))
}

fn bin_find(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let needle: Vec<u8> = match inv.arg(1) {
        Value::Binary(other) => other.tail_bytes(),
        Value::Int(n) if (0..=255).contains(n) => vec![*n as u8],
        other => return Err(mismatch(ev, &inv, "binary!", other.ty())),
    };
    let haystack = b.tail_bytes();
    if needle.is_empty() || needle.len() > haystack.len() {
        return Ok(Value::None);
    }
    let positions = 0..=haystack.len() - needle.len();
    let hit = if inv.has_refinement(ev.wk.last) {
        positions.rev().find(|&i| haystack[i..i + needle.len()] == needle[..])
    } else {
        positions.clone().find(|&i| haystack[i..i + needle.len()] == needle[..])
    };
    Ok(hit.map_or(Value::None, |i| Value::Int((b.index + i + 1) as i64)))
}

fn bin_sort(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let mut buf = b.buf.borrow_mut();
    let start = b.index.min(buf.len());
    buf[start..].sort_unstable();
    drop(buf);
    Ok(Value::Binary(b))
}

fn bin_reverse(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let mut buf = b.buf.borrow_mut();
    let start = b.index.min(buf.len());
    buf[start..].reverse();
    drop(buf);
    Ok(Value::Binary(b))
}

fn bin_other_arg(ev: &Evaluator, inv: &Invocation) -> Result<Vec<u8>, Unwind> {
    match inv.arg(1) {
        Value::Binary(other) => Ok(other.tail_bytes()),
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!("operands must be same type for '{}', got {}", inv.op_name(ev), other.ty()),
        )
        .into()),
    }
}

fn bin_intersect(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let other = bin_other_arg(ev, &inv)?;
    let out = set_intersect(&b.tail_bytes(), &other, |a, b| a == b);
    Ok(Value::Binary(BinarySeries::new(out)))
}

fn bin_union(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let other = bin_other_arg(ev, &inv)?;
    let out = set_union(&b.tail_bytes(), &other, |a, b| a == b);
    Ok(Value::Binary(BinarySeries::new(out)))
}

fn bin_difference(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let b = bin_arg(ev, &inv)?;
    let other = bin_other_arg(ev, &inv)?;
    let out = set_difference(&b.tail_bytes(), &other, |a, b| a == b);
    Ok(Value::Binary(BinarySeries::new(out)))
}

// --- object ----------------------------------------------------------------

fn obj_select(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let Value::Object(obj) = inv.arg(0) else {
        return Err(mismatch(ev, &inv, "object!", inv.arg(0).ty()));
    };
    let frame = ev.frames.get(obj.frame);
    let found = match inv.arg(1) {
        Value::Word(sym) | Value::LitWord(sym) => frame.bindings.get(sym).cloned(),
        Value::Str(s) => {
            let spelling = s.tail_text();
            frame
                .bindings
                .iter()
                .find(|(sym, _)| ev.interns.resolve(**sym) == spelling)
                .map(|(_, v)| v.clone())
        }
        other => return Err(mismatch(ev, &inv, "word!", other.ty())),
    };
    Ok(match found {
        Some(v) => v,
        None => inv.refinement(ev.wk.default).cloned().unwrap_or(Value::None),
    })
}
