//! Bitwise natives, grouped as fields of the root `bit` object.
//!
//! All operations accept integers or binaries, with both operands of the
//! same type. Binary operands right-align: the shorter one is treated as if
//! left-padded with zero bytes, and the result has the longer length.

use crate::{
    error::{Error, ErrorId, EvalResult, Unwind},
    eval::{Evaluator, Invocation},
    frame::{Frame, FrameKind, ROOT_FRAME},
    types::BinarySeries,
    value::{ObjRef, Value},
};

use super::{DEF, NativeDef, register_in};

pub(crate) fn register(ev: &mut Evaluator) {
    let bit = ev.interns.intern("bit");
    let mut frame = Frame::new(FrameKind::Object, Some(ROOT_FRAME));
    frame.name = Some(bit);
    let fid = ev.frames.alloc(frame);
    ev.frames.pin_chain(fid);
    for def in DEFS {
        register_in(ev, fid, def);
    }
    ev.frames.bind(ROOT_FRAME, bit, Value::Object(ObjRef { frame: fid }));
}

const DEFS: &[NativeDef] = &[
    NativeDef {
        name: "and",
        doc: "Bitwise AND of two integers or two binaries.",
        params: &["value1", "value2"],
        f: bit_and,
        ..DEF
    },
    NativeDef {
        name: "or",
        doc: "Bitwise OR of two integers or two binaries.",
        params: &["value1", "value2"],
        f: bit_or,
        ..DEF
    },
    NativeDef {
        name: "xor",
        doc: "Bitwise XOR of two integers or two binaries.",
        params: &["value1", "value2"],
        f: bit_xor,
        ..DEF
    },
    NativeDef {
        name: "not",
        doc: "Bitwise complement of an integer or binary.",
        params: &["value"],
        f: bit_not,
        ..DEF
    },
    NativeDef {
        name: "shl",
        doc: "Shift left; overflow bits are lost.",
        params: &["value", "count"],
        f: bit_shl,
        ..DEF
    },
    NativeDef {
        name: "shr",
        doc: "Shift right; integers shift arithmetically.",
        params: &["value", "count"],
        f: bit_shr,
        ..DEF
    },
    NativeDef {
        name: "on",
        doc: "Sets one bit of an integer (position 0..63, 0 = least significant).",
        params: &["value", "position"],
        f: bit_on,
        ..DEF
    },
    NativeDef {
        name: "off",
        doc: "Clears one bit of an integer (position 0..63).",
        params: &["value", "position"],
        f: bit_off,
        ..DEF
    },
    NativeDef {
        name: "count",
        doc: "Number of set bits (64-bit two's complement for integers).",
        params: &["value"],
        f: bit_count,
        ..DEF
    },
];

fn same_type_error(ev: &Evaluator, inv: &Invocation) -> Unwind {
    Error::script(
        ErrorId::TypeMismatch,
        format!("operands must be same type for '{}'", inv.op_name(ev)),
    )
    .into()
}

/// Zips two byte strings right-aligned, zero-padding the shorter on the
/// left; the result has the longer length.
fn zip_aligned(a: &[u8], b: &[u8], op: fn(u8, u8) -> u8) -> Vec<u8> {
    let len = a.len().max(b.len());
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let x = if i + a.len() >= len { a[i + a.len() - len] } else { 0 };
        let y = if i + b.len() >= len { b[i + b.len() - len] } else { 0 };
        out.push(op(x, y));
    }
    out
}

fn binary_op(
    ev: &Evaluator,
    inv: &Invocation,
    int_op: fn(i64, i64) -> i64,
    byte_op: fn(u8, u8) -> u8,
) -> EvalResult<Value> {
    match (inv.arg(0), inv.arg(1)) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        (Value::Binary(a), Value::Binary(b)) => Ok(Value::Binary(BinarySeries::new(zip_aligned(
            &a.tail_bytes(),
            &b.tail_bytes(),
            byte_op,
        )))),
        _ => Err(same_type_error(ev, inv)),
    }
}

fn bit_and(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    binary_op(ev, &inv, |a, b| a & b, |a, b| a & b)
}

fn bit_or(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    binary_op(ev, &inv, |a, b| a | b, |a, b| a | b)
}

fn bit_xor(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    binary_op(ev, &inv, |a, b| a ^ b, |a, b| a ^ b)
}

fn bit_not(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match inv.arg(0) {
        Value::Int(n) => Ok(Value::Int(!n)),
        Value::Binary(b) => Ok(Value::Binary(BinarySeries::new(
            b.tail_bytes().into_iter().map(|byte| !byte).collect(),
        ))),
        _ => Err(same_type_error(ev, &inv)),
    }
}

fn shift_count(ev: &Evaluator, inv: &Invocation) -> Result<u32, Unwind> {
    let count = inv.int(ev, 1)?;
    if count < 0 {
        return Err(Error::script(ErrorId::InvalidOperation, "shift count must be non-negative").into());
    }
    Ok(count.min(i64::from(u32::MAX)) as u32)
}

/// Shifts a big-endian bit string left within its own length, zero-filling
/// on the right.
fn shl_bytes(src: &[u8], count: usize) -> Vec<u8> {
    let len = src.len();
    let byte_shift = count / 8;
    let bit_shift = (count % 8) as u32;
    let mut out = vec![0u8; len];
    for (i, slot) in out.iter_mut().enumerate() {
        let j = i + byte_shift;
        let hi = if j < len { src[j] << bit_shift } else { 0 };
        let lo = if bit_shift > 0 && j + 1 < len {
            src[j + 1] >> (8 - bit_shift)
        } else {
            0
        };
        *slot = hi | lo;
    }
    out
}

/// Shifts a big-endian bit string right within its own length, zero-filling
/// on the left.
fn shr_bytes(src: &[u8], count: usize) -> Vec<u8> {
    let len = src.len();
    let byte_shift = count / 8;
    let bit_shift = (count % 8) as u32;
    let mut out = vec![0u8; len];
    for (i, slot) in out.iter_mut().enumerate() {
        if i < byte_shift {
            continue;
        }
        let j = i - byte_shift;
        let hi = src[j] >> bit_shift;
        let lo = if bit_shift > 0 && j > 0 {
            src[j - 1] << (8 - bit_shift)
        } else {
            0
        };
        *slot = hi | lo;
    }
    out
}

fn bit_shl(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let count = shift_count(ev, &inv)?;
    match inv.arg(0) {
        Value::Int(n) => {
            let shifted = if count >= 64 { 0 } else { ((*n as u64) << count) as i64 };
            Ok(Value::Int(shifted))
        }
        Value::Binary(b) => Ok(Value::Binary(BinarySeries::new(shl_bytes(
            &b.tail_bytes(),
            count as usize,
        )))),
        _ => Err(same_type_error(ev, &inv)),
    }
}

fn bit_shr(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let count = shift_count(ev, &inv)?;
    match inv.arg(0) {
        Value::Int(n) => {
            let shifted = if count >= 64 {
                if *n < 0 { -1 } else { 0 }
            } else {
                n >> count
            };
            Ok(Value::Int(shifted))
        }
        Value::Binary(b) => Ok(Value::Binary(BinarySeries::new(shr_bytes(
            &b.tail_bytes(),
            count as usize,
        )))),
        _ => Err(same_type_error(ev, &inv)),
    }
}

fn bit_position(ev: &Evaluator, inv: &Invocation) -> Result<(i64, u32), Unwind> {
    let value = inv.int(ev, 0)?;
    let position = inv.int(ev, 1)?;
    if !(0..=63).contains(&position) {
        return Err(Error::script(
            ErrorId::InvalidOperation,
            format!("Bit position out of range: {position}"),
        )
        .into());
    }
    Ok((value, position as u32))
}

fn bit_on(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (value, position) = bit_position(ev, &inv)?;
    Ok(Value::Int(value | (1i64 << position)))
}

fn bit_off(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let (value, position) = bit_position(ev, &inv)?;
    Ok(Value::Int(value & !(1i64 << position)))
}

fn bit_count(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match inv.arg(0) {
        Value::Int(n) => Ok(Value::Int(i64::from((*n as u64).count_ones()))),
        Value::Binary(b) => {
            let total: u32 = b.tail_bytes().iter().map(|byte| byte.count_ones()).sum();
            Ok(Value::Int(i64::from(total)))
        }
        _ => Err(same_type_error(ev, &inv)),
    }
}
