//! Arithmetic and comparison natives.
//!
//! The operators are registered infix-capable: `x + 1` and `(+ x 1)` both
//! work, left to right with no precedence. Integer arithmetic is checked;
//! overflow is a Math error, not a wrap.

use std::cmp::Ordering;

use crate::{
    error::{Error, ErrorId, EvalResult, Unwind},
    eval::{Evaluator, Invocation},
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
        name: "+",
        doc: "Adds two numbers.",
        params: &["value1", "value2"],
        infix: true,
        f: add,
        ..DEF
    },
    NativeDef {
        name: "-",
        doc: "Subtracts the second number from the first.",
        params: &["value1", "value2"],
        infix: true,
        f: subtract,
        ..DEF
    },
    NativeDef {
        name: "*",
        doc: "Multiplies two numbers.",
        params: &["value1", "value2"],
        infix: true,
        f: multiply,
        ..DEF
    },
    NativeDef {
        name: "/",
        doc: "Divides the first number by the second. Two integers that divide evenly yield an integer.",
        params: &["value1", "value2"],
        infix: true,
        f: divide,
        ..DEF
    },
    NativeDef {
        name: "mod",
        doc: "Remainder of dividing the first number by the second.",
        params: &["value1", "value2"],
        infix: true,
        f: modulo,
        ..DEF
    },
    NativeDef {
        name: "=",
        doc: "True when the two values are equal.",
        params: &["value1", "value2"],
        infix: true,
        f: equal,
        ..DEF
    },
    NativeDef {
        name: "equal?",
        doc: "True when the two values are equal.",
        params: &["value1", "value2"],
        f: equal,
        ..DEF
    },
    NativeDef {
        name: "<>",
        doc: "True when the two values are not equal.",
        params: &["value1", "value2"],
        infix: true,
        f: not_equal,
        ..DEF
    },
    NativeDef {
        name: "<",
        doc: "True when the first value sorts before the second.",
        params: &["value1", "value2"],
        infix: true,
        f: less,
        ..DEF
    },
    NativeDef {
        name: ">",
        doc: "True when the first value sorts after the second.",
        params: &["value1", "value2"],
        infix: true,
        f: greater,
        ..DEF
    },
    NativeDef {
        name: "<=",
        doc: "True when the first value does not sort after the second.",
        params: &["value1", "value2"],
        infix: true,
        f: less_or_equal,
        ..DEF
    },
    NativeDef {
        name: ">=",
        doc: "True when the first value does not sort before the second.",
        params: &["value1", "value2"],
        infix: true,
        f: greater_or_equal,
        ..DEF
    },
    NativeDef {
        name: "negate",
        doc: "Negates a number.",
        params: &["value"],
        f: negate,
        ..DEF
    },
    NativeDef {
        name: "not",
        doc: "Logical complement of a value's truthiness.",
        params: &["value"],
        f: not,
        ..DEF
    },
];

enum Pair {
    Ints(i64, i64),
    Decimals(f64, f64),
}

fn numeric_pair(ev: &Evaluator, inv: &Invocation) -> Result<Pair, Unwind> {
    match (inv.arg(0), inv.arg(1)) {
        (Value::Int(a), Value::Int(b)) => Ok(Pair::Ints(*a, *b)),
        (a, b) => {
            let (Some(a), Some(b)) = (a.as_number(), b.as_number()) else {
                let got = if a.as_number().is_none() { a.ty() } else { b.ty() };
                return Err(Error::script(
                    ErrorId::TypeMismatch,
                    format!(
                        "Type mismatch for '{}': expected integer! or decimal!, got {got}",
                        inv.op_name(ev)
                    ),
                )
                .into());
            };
            Ok(Pair::Decimals(a, b))
        }
    }
}

fn overflow(ev: &Evaluator, inv: &Invocation) -> Unwind {
    Error::math(
        ErrorId::InvalidOperation,
        format!("Integer overflow in '{}'", inv.op_name(ev)),
    )
    .into()
}

fn div_zero() -> Unwind {
    Error::math(ErrorId::DivZero, "Division by zero").into()
}

fn add(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match numeric_pair(ev, &inv)? {
        Pair::Ints(a, b) => a.checked_add(b).map(Value::Int).ok_or_else(|| overflow(ev, &inv)),
        Pair::Decimals(a, b) => Ok(Value::Decimal(a + b)),
    }
}

fn subtract(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match numeric_pair(ev, &inv)? {
        Pair::Ints(a, b) => a.checked_sub(b).map(Value::Int).ok_or_else(|| overflow(ev, &inv)),
        Pair::Decimals(a, b) => Ok(Value::Decimal(a - b)),
    }
}

fn multiply(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match numeric_pair(ev, &inv)? {
        Pair::Ints(a, b) => a.checked_mul(b).map(Value::Int).ok_or_else(|| overflow(ev, &inv)),
        Pair::Decimals(a, b) => Ok(Value::Decimal(a * b)),
    }
}

fn divide(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match numeric_pair(ev, &inv)? {
        Pair::Ints(_, 0) => Err(div_zero()),
        // checked_rem also covers the i64::MIN / -1 overflow
        Pair::Ints(a, b) => match a.checked_rem(b) {
            Some(0) => a.checked_div(b).map(Value::Int).ok_or_else(|| overflow(ev, &inv)),
            _ => Ok(Value::Decimal(a as f64 / b as f64)),
        },
        Pair::Decimals(_, b) if b == 0.0 => Err(div_zero()),
        Pair::Decimals(a, b) => Ok(Value::Decimal(a / b)),
    }
}

fn modulo(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match numeric_pair(ev, &inv)? {
        Pair::Ints(_, 0) => Err(div_zero()),
        Pair::Ints(a, b) => a.checked_rem(b).map(Value::Int).ok_or_else(|| overflow(ev, &inv)),
        Pair::Decimals(_, b) if b == 0.0 => Err(div_zero()),
        Pair::Decimals(a, b) => Ok(Value::Decimal(a % b)),
    }
}

fn equal(_ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Logic(inv.arg(0).equals(inv.arg(1))))
}

fn not_equal(_ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Logic(!inv.arg(0).equals(inv.arg(1))))
}

fn compare(ev: &Evaluator, inv: &Invocation) -> Result<Ordering, Unwind> {
    inv.arg(0).order(inv.arg(1)).ok_or_else(|| {
        Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for '{}': cannot compare {} and {}",
                inv.op_name(ev),
                inv.arg(0).ty(),
                inv.arg(1).ty()
            ),
        )
        .into()
    })
}

fn less(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Logic(compare(ev, &inv)? == Ordering::Less))
}

fn greater(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Logic(compare(ev, &inv)? == Ordering::Greater))
}

fn less_or_equal(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Logic(compare(ev, &inv)? != Ordering::Greater))
}

fn greater_or_equal(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Logic(compare(ev, &inv)? != Ordering::Less))
}

fn negate(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    match inv.arg(0) {
        Value::Int(n) => n.checked_neg().map(Value::Int).ok_or_else(|| overflow(ev, &inv)),
        Value::Decimal(d) => Ok(Value::Decimal(-d)),
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for 'negate': expected integer! or decimal!, got {}",
                other.ty()
            ),
        )
        .into()),
    }
}

fn not(_ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Logic(!inv.arg(0).is_truthy()))
}
