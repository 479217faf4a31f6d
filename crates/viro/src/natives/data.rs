//! Data natives: binding, objects, `make`, type reflection, and output.

use std::str::FromStr;

use crate::{
    error::{Error, ErrorCategory, ErrorId, EvalResult, Unwind},
    eval::{Evaluator, Invocation},
    frame::{Frame, FrameKind},
    types::{BlockSeries, StringSeries},
    value::{ObjRef, Value},
};

use super::{DEF, NativeDef};

pub(crate) fn register(ev: &mut Evaluator) {
    for def in DEFS {
        super::register(ev, def);
    }
}

const DEFS: &[NativeDef] = &[
    NativeDef {
        name: "set",
        doc: "Binds a word to a value in the current frame.",
        params: &["word", "value"],
        f: set,
        ..DEF
    },
    NativeDef {
        name: "get",
        doc: "The value a word is bound to, resolved along the frame chain.",
        params: &["word"],
        f: get,
        ..DEF
    },
    NativeDef {
        name: "object",
        doc: "Evaluates a spec block in a fresh frame and returns it as an object.",
        params: &["spec"],
        f: object,
        ..DEF
    },
    NativeDef {
        name: "make",
        doc: "Constructs a value: make object! [...], make error! [...], or make <object> [...] for prototype extension.",
        params: &["type", "spec"],
        f: make,
        ..DEF
    },
    NativeDef {
        name: "type?",
        doc: "The type word of a value (integer!, block!, ...).",
        params: &["value"],
        f: type_of,
        ..DEF
    },
    NativeDef {
        name: "print",
        doc: "Writes the formed value and a newline to the output writer.",
        params: &["value"],
        f: print,
        ..DEF
    },
    NativeDef {
        name: "probe",
        doc: "Writes the molded value and a newline, returning the value.",
        params: &["value"],
        f: probe,
        ..DEF
    },
    NativeDef {
        name: "mold",
        doc: "The code-readable text of a value.",
        params: &["value"],
        f: mold,
        ..DEF
    },
    NativeDef {
        name: "form",
        doc: "The human-readable text of a value.",
        params: &["value"],
        f: form,
        ..DEF
    },
];

fn set(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    let sym = inv.word(ev, 0)?;
    let value = inv.take_arg(1);
    ev.frames.bind(ev.current, sym, value.clone());
    Ok(value)
}

fn get(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let sym = inv.word(ev, 0)?;
    ev.frames.resolve(ev.current, sym).ok_or_else(|| {
        Error::script(
            ErrorId::NoValue,
            format!("{} has no value", ev.interns.resolve(sym)),
        )
        .into()
    })
}

/// Evaluates a spec block inside a fresh object frame. The frame chains to
/// the current frame for the duration of construction, so outer words
/// resolve; afterwards the object's fields are only reachable through the
/// object value.
pub(crate) fn construct_object(
    ev: &mut Evaluator,
    proto: Option<ObjRef>,
    spec: &BlockSeries,
) -> EvalResult<Value> {
    let mut frame = Frame::new(FrameKind::Object, Some(ev.current));
    if let Some(proto) = proto {
        frame.bindings = ev.frames.get(proto.frame).bindings.clone();
    }
    let fid = ev.frames.alloc(frame);
    // the object value outlives the constructing call; keep its chain alive
    ev.frames.pin_chain(fid);
    let saved = ev.current;
    ev.current = fid;
    let result = ev.eval_block(spec);
    ev.current = saved;
    result?;
    Ok(Value::Object(ObjRef { frame: fid }))
}

fn object(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let spec = inv.block(ev, 0)?;
    construct_object(ev, None, &spec)
}

fn make(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    match inv.take_arg(0) {
        Value::Word(sym) if sym == ev.wk.object_type => {
            let spec = inv.block(ev, 1)?;
            construct_object(ev, None, &spec)
        }
        Value::Word(sym) if sym == ev.wk.error_type => make_error(ev, &mut inv),
        Value::Object(proto) => {
            let spec = inv.block(ev, 1)?;
            construct_object(ev, Some(proto), &spec)
        }
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for 'make': expected object!, error!, or an object, got {}",
                other.ty()
            ),
        )
        .into()),
    }
}

/// `make error! "msg"` or `make error! [category: 'Script id: 'my-id
/// message: "..."]`. Omitted fields default to User/user-error/"".
fn make_error(ev: &mut Evaluator, inv: &mut Invocation) -> EvalResult<Value> {
    match inv.take_arg(1) {
        Value::Str(s) => Ok(Value::Error(Box::new(Error::user(
            ErrorId::Custom("user-error".to_owned()),
            s.tail_text(),
        )))),
        Value::Block(spec) => {
            let Value::Object(obj) = construct_object(ev, None, &spec)? else {
                unreachable!("construct_object returns an object")
            };
            let frame = ev.frames.get(obj.frame);
            let category = match frame.bindings.get(&ev.wk.category) {
                Some(Value::Word(sym)) => {
                    let spelling = ev.interns.resolve(*sym);
                    ErrorCategory::from_str(spelling).map_err(|_| {
                        Unwind::from(Error::script(
                            ErrorId::InvalidOperation,
                            format!("Unknown error category '{spelling}'"),
                        ))
                    })?
                }
                _ => ErrorCategory::User,
            };
            let id = match frame.bindings.get(&ev.wk.id) {
                Some(Value::Word(sym)) => ev
                    .interns
                    .resolve(*sym)
                    .parse()
                    .unwrap_or_else(|_| ErrorId::Custom(ev.interns.resolve(*sym).to_owned())),
                _ => ErrorId::Custom("user-error".to_owned()),
            };
            let message = match frame.bindings.get(&ev.wk.message) {
                Some(Value::Str(s)) => s.tail_text(),
                _ => String::new(),
            };
            Ok(Value::Error(Box::new(Error::new(category, id, message))))
        }
        other => Err(Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for 'make': error! takes a string or block spec, got {}",
                other.ty()
            ),
        )
        .into()),
    }
}

fn type_of(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let sym = ev.interns.intern(&inv.arg(0).ty().to_string());
    Ok(Value::Word(sym))
}

fn print(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let text = ev.form_value(inv.arg(0));
    ev.print.write(&text);
    ev.print.push('\n');
    Ok(Value::None)
}

fn probe(ev: &mut Evaluator, mut inv: Invocation) -> EvalResult<Value> {
    let text = ev.mold_value(inv.arg(0));
    ev.print.write(&text);
    ev.print.push('\n');
    Ok(inv.take_arg(0))
}

fn mold(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Str(StringSeries::new(&ev.mold_value(inv.arg(0)))))
}

fn form(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    Ok(Value::Str(StringSeries::new(&ev.form_value(inv.arg(0)))))
}
