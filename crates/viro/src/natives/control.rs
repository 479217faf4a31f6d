//! Control-flow natives.
//!
//! All of these are boundary-transparent: break/continue/return raised in a
//! body they evaluate pass through untouched unless the native is a loop
//! catching its own break/continue.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    error::{Error, ErrorId, EvalResult, Unwind},
    eval::{Evaluator, Invocation},
    intern::Symbol,
    types::{BlockSeries, Func, FuncBody, RefinementSpec, StringSeries},
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
        name: "when",
        doc: "Evaluates the block only when the condition is truthy; none otherwise.",
        params: &["condition", "body"],
        transparent: true,
        f: when,
        ..DEF
    },
    NativeDef {
        name: "if",
        doc: "Evaluates the first block when the condition is truthy, the second otherwise.",
        params: &["condition", "then-block", "else-block"],
        transparent: true,
        f: if_else,
        ..DEF
    },
    NativeDef {
        name: "loop",
        doc: "Evaluates the body a fixed number of times.",
        params: &["count", "body"],
        refinements: &[("with-index", true)],
        transparent: true,
        f: loop_times,
        ..DEF
    },
    NativeDef {
        name: "while",
        doc: "Re-evaluates the body while the condition holds. A block condition is re-evaluated before each pass.",
        params: &["condition", "body"],
        transparent: true,
        f: while_loop,
        ..DEF
    },
    NativeDef {
        name: "foreach",
        doc: "Evaluates the body once per element group of a series.",
        params: &["series", "vars", "body"],
        refinements: &[("with-index", true)],
        transparent: true,
        f: foreach,
        ..DEF
    },
    NativeDef {
        name: "break",
        doc: "Terminates the enclosing loop; --levels exits that many nested loops.",
        params: &[],
        refinements: &[("levels", true)],
        transparent: true,
        f: break_loop,
        ..DEF
    },
    NativeDef {
        name: "continue",
        doc: "Re-enters the enclosing loop's next iteration; --levels skips out that many loops first.",
        params: &[],
        refinements: &[("levels", true)],
        transparent: true,
        f: continue_loop,
        ..DEF
    },
    NativeDef {
        name: "return",
        doc: "Exits the enclosing function with a value (none when omitted).",
        params: &["value"],
        optional_tail: 1,
        transparent: true,
        f: return_value,
        ..DEF
    },
    NativeDef {
        name: "do",
        doc: "Evaluates a block or a source string. Raises error values.",
        params: &["code"],
        transparent: true,
        f: do_code,
        ..DEF
    },
    NativeDef {
        name: "reduce",
        doc: "Evaluates each expression in a block, collecting the results into a new block.",
        params: &["block"],
        transparent: true,
        f: reduce,
        ..DEF
    },
    NativeDef {
        name: "compose",
        doc: "Copies a block, replacing each paren with its evaluated value.",
        params: &["block"],
        transparent: true,
        f: compose,
        ..DEF
    },
    NativeDef {
        name: "fn",
        doc: "Creates a function from a parameter spec block and a body block, closing over the current frame.",
        params: &["spec", "body"],
        f: make_fn,
        ..DEF
    },
];

/// One body pass of a loop native, with break/continue caught at this level.
enum LoopStep {
    Value(Value),
    Continue,
    Break,
}

fn run_loop_body(ev: &mut Evaluator, body: &BlockSeries) -> EvalResult<LoopStep> {
    match ev.eval_block(body) {
        Ok(v) => Ok(LoopStep::Value(v)),
        Err(Unwind::Break { levels }) => {
            if levels > 1 {
                Err(Unwind::Break { levels: levels - 1 })
            } else {
                Ok(LoopStep::Break)
            }
        }
        Err(Unwind::Continue { levels }) => {
            if levels > 1 {
                Err(Unwind::Continue { levels: levels - 1 })
            } else {
                Ok(LoopStep::Continue)
            }
        }
        Err(other) => Err(other),
    }
}

/// Optional `--with-index 'var` binding target.
fn index_var(ev: &Evaluator, inv: &Invocation) -> Result<Option<Symbol>, Unwind> {
    match inv.refinement(ev.wk.with_index) {
        None => Ok(None),
        Some(Value::Word(sym) | Value::LitWord(sym)) => Ok(Some(*sym)),
        Some(other) => Err(Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for '{}': expected word!, got {}",
                inv.op_name(ev),
                other.ty()
            ),
        )
        .into()),
    }
}

fn when(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let body = inv.block(ev, 1)?;
    if inv.arg(0).is_truthy() {
        ev.eval_block(&body)
    } else {
        Ok(Value::None)
    }
}

fn if_else(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let then_block = inv.block(ev, 1)?;
    let else_block = inv.block(ev, 2)?;
    if inv.arg(0).is_truthy() {
        ev.eval_block(&then_block)
    } else {
        ev.eval_block(&else_block)
    }
}

fn loop_times(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let count = inv.int(ev, 0)?;
    if count < 0 {
        return Err(Error::script(ErrorId::InvalidOperation, "loop count must be non-negative").into());
    }
    let body = inv.block(ev, 1)?;
    let var = index_var(ev, &inv)?;
    let mut last = Value::None;
    for i in 0..count {
        if let Some(sym) = var {
            ev.frames.bind(ev.current, sym, Value::Int(i));
        }
        match run_loop_body(ev, &body)? {
            LoopStep::Value(v) => last = v,
            LoopStep::Continue => {}
            LoopStep::Break => return Ok(Value::None),
        }
    }
    Ok(last)
}

fn while_loop(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let body = inv.block(ev, 1)?;
    let condition = inv.arg(0).clone();
    let mut last = Value::None;
    loop {
        let holds = match &condition {
            Value::Block(b) => ev.eval_block(b)?.is_truthy(),
            constant => constant.is_truthy(),
        };
        if !holds {
            return Ok(last);
        }
        match run_loop_body(ev, &body)? {
            LoopStep::Value(v) => last = v,
            LoopStep::Continue => {}
            LoopStep::Break => return Ok(Value::None),
        }
    }
}

fn foreach(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let elements: Vec<Value> = match inv.arg(0) {
        Value::Block(b) | Value::Paren(b) => b.tail_values(),
        Value::Str(s) => s
            .tail_chars()
            .into_iter()
            .map(|c| Value::Str(StringSeries::from_chars(vec![c])))
            .collect(),
        Value::Binary(b) => b.tail_bytes().into_iter().map(|byte| Value::Int(i64::from(byte))).collect(),
        other => {
            return Err(Error::script(
                ErrorId::TypeMismatch,
                format!("Type mismatch for 'foreach': expected a series, got {}", other.ty()),
            )
            .into());
        }
    };
    let vars: Vec<Symbol> = match inv.arg(1) {
        Value::Word(sym) | Value::LitWord(sym) => vec![*sym],
        Value::Block(b) => {
            let mut vars = Vec::new();
            for v in b.tail_values() {
                match v {
                    Value::Word(sym) | Value::LitWord(sym) => vars.push(sym),
                    other => {
                        return Err(Error::script(
                            ErrorId::TypeMismatch,
                            format!(
                                "Type mismatch for 'foreach': expected lit-word vars, got {}",
                                other.ty()
                            ),
                        )
                        .into());
                    }
                }
            }
            vars
        }
        other => {
            return Err(Error::script(
                ErrorId::TypeMismatch,
                format!(
                    "Type mismatch for 'foreach': expected word! or block!, got {}",
                    other.ty()
                ),
            )
            .into());
        }
    };
    if vars.is_empty() {
        return Err(Error::script(ErrorId::InvalidOperation, "foreach needs at least one variable").into());
    }
    let body = inv.block(ev, 2)?;
    let index_sym = index_var(ev, &inv)?;
    let mut last = Value::None;
    let mut start = 0;
    let mut group = 0i64;
    while start < elements.len() {
        for (j, sym) in vars.iter().enumerate() {
            let element = elements.get(start + j).cloned().unwrap_or(Value::None);
            ev.frames.bind(ev.current, *sym, element);
        }
        if let Some(sym) = index_sym {
            ev.frames.bind(ev.current, sym, Value::Int(group));
        }
        match run_loop_body(ev, &body)? {
            LoopStep::Value(v) => last = v,
            LoopStep::Continue => {}
            LoopStep::Break => return Ok(Value::None),
        }
        start += vars.len();
        group += 1;
    }
    Ok(last)
}

fn unwind_levels(ev: &Evaluator, inv: &Invocation) -> Result<i64, Unwind> {
    let levels = match inv.refinement(ev.wk.levels) {
        None => 1,
        Some(Value::Int(n)) => *n,
        Some(other) => {
            return Err(Error::script(
                ErrorId::TypeMismatch,
                format!(
                    "Type mismatch for '{}': expected integer!, got {}",
                    inv.op_name(ev),
                    other.ty()
                ),
            )
            .into());
        }
    };
    if levels < 1 {
        return Err(Error::script(ErrorId::InvalidOperation, "levels must be a positive integer").into());
    }
    Ok(levels)
}

fn break_loop(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let levels = unwind_levels(ev, &inv)?;
    Err(Unwind::Break { levels })
}

fn continue_loop(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let levels = unwind_levels(ev, &inv)?;
    Err(Unwind::Continue { levels })
}

fn return_value(_ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    Err(Unwind::Return(inv.take_arg(0)))
}

fn do_code(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    match inv.take_arg(0) {
        Value::Block(b) => ev.eval_block(&b),
        Value::Paren(p) => ev.eval_block(&p),
        Value::Str(s) => {
            let parsed = ev.parse(&s.tail_text(), "do")?;
            ev.eval_block(&parsed.block)
        }
        Value::Error(e) => Err(Unwind::Error(e)),
        other => Ok(other),
    }
}

fn reduce(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let block = inv.block(ev, 0)?;
    let mut values = Vec::new();
    let mut pos = block.index;
    while pos < block.buf_len() {
        let (v, next) = ev.eval_expr(&block, pos)?;
        values.push(v);
        pos = next;
    }
    Ok(Value::Block(BlockSeries::new(values)))
}

fn compose(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let block = inv.block(ev, 0)?;
    let mut values = Vec::new();
    for element in block.tail_values() {
        match element {
            Value::Paren(p) => values.push(ev.eval_block(&p)?),
            inert => values.push(inert),
        }
    }
    Ok(Value::Block(BlockSeries::new(values)))
}

/// `fn [spec] [body]`: spec is an optional leading doc string, parameter
/// words, and `--refinement` tokens each optionally followed by a
/// value-parameter word.
fn make_fn(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let spec = inv.block(ev, 0)?;
    let body = inv.block(ev, 1)?;
    let mut doc = None;
    let mut params: Vec<Symbol> = Vec::new();
    let mut refinements: Vec<RefinementSpec> = Vec::new();
    for v in spec.tail_values() {
        match v {
            Value::Str(s) if doc.is_none() && params.is_empty() && refinements.is_empty() => {
                doc = Some(s.tail_text().into_boxed_str());
            }
            Value::Word(sym) | Value::LitWord(sym) => {
                if let Some(last) = refinements.last_mut() {
                    if last.value_param.is_some() {
                        return Err(Error::script(
                            ErrorId::InvalidOperation,
                            "Invalid parameter spec: refinement takes at most one value",
                        )
                        .into());
                    }
                    last.value_param = Some(sym);
                } else {
                    params.push(sym);
                }
            }
            Value::Refinement(sym) => refinements.push(RefinementSpec {
                name: sym,
                value_param: None,
            }),
            other => {
                return Err(Error::script(
                    ErrorId::InvalidOperation,
                    format!("Invalid parameter spec: unexpected {}", other.ty()),
                )
                .into());
            }
        }
    }
    // the created closure keeps the defining chain alive
    ev.frames.pin_chain(ev.current);
    let min_args = params.len();
    Ok(Value::Func(Rc::new(Func {
        name: RefCell::new(None),
        doc,
        params,
        min_args,
        refinements,
        body: FuncBody::Block(body),
        captured: ev.current,
        infix: false,
        transparent: false,
    })))
}
