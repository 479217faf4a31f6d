//! Native function registration.
//!
//! Natives are ordinary function values: a parameter spec, a documentation
//! record, and a callback, inserted into the root frame before user code
//! runs. Series actions register as dispatchers whose per-type
//! implementations live in the type-frames.

pub(crate) mod bitwise;
pub(crate) mod control;
pub(crate) mod convert;
pub(crate) mod data;
pub(crate) mod help;
pub(crate) mod math;
pub(crate) mod series;

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::EvalResult,
    eval::{Evaluator, Invocation},
    frame::{FrameId, ROOT_FRAME},
    types::{Func, FuncBody, NativeFn, RefinementSpec, Type},
    value::Value,
};

/// Declarative description of one native.
pub(crate) struct NativeDef {
    pub name: &'static str,
    pub doc: &'static str,
    pub params: &'static [&'static str],
    /// Trailing positional slots that default to `none` when the stream
    /// ends (`return` is the only user).
    pub optional_tail: usize,
    /// `(name, takes_value)` pairs.
    pub refinements: &'static [(&'static str, bool)],
    pub infix: bool,
    pub transparent: bool,
    pub f: NativeFn,
}

fn placeholder(_: &mut Evaluator, _: Invocation) -> EvalResult<Value> {
    unreachable!("placeholder native body")
}

/// Spread base for `NativeDef` literals.
pub(crate) const DEF: NativeDef = NativeDef {
    name: "",
    doc: "",
    params: &[],
    optional_tail: 0,
    refinements: &[],
    infix: false,
    transparent: false,
    f: placeholder,
};

pub(crate) fn register_all(ev: &mut Evaluator) {
    math::register(ev);
    series::register(ev);
    bitwise::register(ev);
    control::register(ev);
    data::register(ev);
    convert::register(ev);
    help::register(ev);
}

fn build(ev: &mut Evaluator, def: &NativeDef, body: FuncBody) -> Value {
    let name = ev.interns.intern(def.name);
    let params: Vec<_> = def.params.iter().map(|p| ev.interns.intern(p)).collect();
    let refinements = def
        .refinements
        .iter()
        .map(|(rname, takes_value)| {
            let rsym = ev.interns.intern(rname);
            RefinementSpec {
                name: rsym,
                value_param: takes_value.then_some(rsym),
            }
        })
        .collect();
    let min_args = params.len() - def.optional_tail;
    Value::Func(Rc::new(Func {
        name: RefCell::new(Some(name)),
        doc: Some(def.doc.into()),
        params,
        min_args,
        refinements,
        body,
        captured: ROOT_FRAME,
        infix: def.infix,
        transparent: def.transparent,
    }))
}

/// Registers a native in the root frame.
pub(crate) fn register(ev: &mut Evaluator, def: &NativeDef) {
    let value = build(ev, def, FuncBody::Native(def.f));
    let sym = ev.interns.intern(def.name);
    ev.frames.bind(ROOT_FRAME, sym, value);
}

/// Registers a native inside a specific frame (module objects like `bit`).
pub(crate) fn register_in(ev: &mut Evaluator, frame: FrameId, def: &NativeDef) {
    let value = build(ev, def, FuncBody::Native(def.f));
    let sym = ev.interns.intern(def.name);
    ev.frames.bind(frame, sym, value);
}

/// Registers an action dispatcher in the root frame; the per-type
/// implementations are bound into type-frames separately.
pub(crate) fn register_action(ev: &mut Evaluator, def: &NativeDef) {
    let sym = ev.interns.intern(def.name);
    let value = build(ev, def, FuncBody::Action(sym));
    ev.frames.bind(ROOT_FRAME, sym, value);
}

/// Binds one action implementation into a type-frame.
pub(crate) fn register_type_impl(ev: &mut Evaluator, ty: Type, action: &str, f: NativeFn) {
    let sym = ev.interns.intern(action);
    let func = Func {
        name: RefCell::new(Some(sym)),
        doc: None,
        params: Vec::new(),
        min_args: 0,
        refinements: Vec::new(),
        body: FuncBody::Native(f),
        captured: ROOT_FRAME,
        infix: false,
        transparent: false,
    };
    ev.frames.bind_action(ty, sym, Value::Func(Rc::new(func)));
}
