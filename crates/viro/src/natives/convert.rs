//! Conversion natives (`to-integer`, `to-decimal`, `to-string`, `to-block`,
//! `to-binary`). Failed conversions are type mismatches.

use crate::{
    error::{Error, ErrorId, EvalResult, Unwind},
    eval::{Evaluator, Invocation},
    types::{BinarySeries, BlockSeries, StringSeries},
    value::Value,
};

use super::{DEF, NativeDef};

pub(crate) fn register(ev: &mut Evaluator) {
    for def in DEFS {
        super::register(ev, def);
    }
}

const DEFS: &[NativeDef] = &[
    NativeDef {
        name: "to-integer",
        doc: "Converts a value to an integer. Decimals truncate; binaries read big-endian.",
        params: &["value"],
        f: to_integer,
        ..DEF
    },
    NativeDef {
        name: "to-decimal",
        doc: "Converts a value to a decimal.",
        params: &["value"],
        f: to_decimal,
        ..DEF
    },
    NativeDef {
        name: "to-string",
        doc: "The formed text of a value as a new string series.",
        params: &["value"],
        f: to_string,
        ..DEF
    },
    NativeDef {
        name: "to-block",
        doc: "Converts a value to a block; strings parse, other values wrap.",
        params: &["value"],
        f: to_block,
        ..DEF
    },
    NativeDef {
        name: "to-binary",
        doc: "Converts a value to a binary: string bytes, big-endian integer, or a block of bytes.",
        params: &["value"],
        f: to_binary,
        ..DEF
    },
];

fn cannot(ev: &Evaluator, inv: &Invocation, value: &Value) -> Unwind {
    Error::script(
        ErrorId::TypeMismatch,
        format!(
            "Type mismatch for '{}': cannot convert {}",
            inv.op_name(ev),
            value.ty()
        ),
    )
    .into()
}

fn to_integer(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match inv.arg(0) {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Decimal(d) => {
            if d.is_finite() && (i64::MIN as f64..=i64::MAX as f64).contains(d) {
                Ok(Value::Int(*d as i64))
            } else {
                Err(Error::script(
                    ErrorId::InvalidOperation,
                    format!("Decimal out of integer range: {d}"),
                )
                .into())
            }
        }
        Value::Str(s) => {
            let text = s.tail_text();
            text.trim().parse().map(Value::Int).map_err(|_| {
                Unwind::from(Error::script(
                    ErrorId::TypeMismatch,
                    format!("Type mismatch for 'to-integer': cannot convert \"{text}\""),
                ))
            })
        }
        Value::Binary(b) => {
            let bytes = b.tail_bytes();
            if bytes.len() > 8 {
                return Err(Error::script(
                    ErrorId::InvalidOperation,
                    format!("Binary too long for an integer: {} bytes", bytes.len()),
                )
                .into());
            }
            let mut n: i64 = 0;
            for byte in bytes {
                n = (n << 8) | i64::from(byte);
            }
            Ok(Value::Int(n))
        }
        Value::Logic(b) => Ok(Value::Int(i64::from(*b))),
        other => Err(cannot(ev, &inv, other)),
    }
}

fn to_decimal(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match inv.arg(0) {
        Value::Decimal(d) => Ok(Value::Decimal(*d)),
        Value::Int(n) => Ok(Value::Decimal(*n as f64)),
        Value::Str(s) => {
            let text = s.tail_text();
            text.trim().parse().map(Value::Decimal).map_err(|_| {
                Unwind::from(Error::script(
                    ErrorId::TypeMismatch,
                    format!("Type mismatch for 'to-decimal': cannot convert \"{text}\""),
                ))
            })
        }
        other => Err(cannot(ev, &inv, other)),
    }
}

fn to_string(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Str(StringSeries::new(&ev.form_value(inv.arg(0)))))
}

fn to_block(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    match inv.take_arg(0) {
        Value::Block(b) => Ok(Value::Block(b)),
        Value::Paren(p) => Ok(Value::Block(p)),
        Value::Str(s) => {
            let parsed = ev.parse(&s.tail_text(), "to-block")?;
            Ok(Value::Block(parsed.block))
        }
        single => Ok(Value::Block(BlockSeries::new(vec![single]))),
    }
}

fn to_binary(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match inv.arg(0) {
        Value::Binary(b) => Ok(Value::Binary(b.clone())),
        Value::Str(s) => Ok(Value::Binary(BinarySeries::new(s.tail_text().into_bytes()))),
        Value::Int(n) => Ok(Value::Binary(BinarySeries::new(n.to_be_bytes().to_vec()))),
        Value::Block(b) => {
            let mut bytes = Vec::with_capacity(b.len());
            for v in b.tail_values() {
                match v {
                    Value::Int(n) if (0..=255).contains(&n) => bytes.push(n as u8),
                    other => {
                        return Err(Error::script(
                            ErrorId::TypeMismatch,
                            format!(
                                "Type mismatch for 'to-binary': blocks must hold bytes, got {}",
                                other.ty()
                            ),
                        )
                        .into());
                    }
                }
            }
            Ok(Value::Binary(BinarySeries::new(bytes)))
        }
        other => Err(cannot(ev, &inv, other)),
    }
}
