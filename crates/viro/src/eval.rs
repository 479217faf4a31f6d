//! The tree-walking evaluator.
//!
//! Evaluation walks a block as a cursor over its values. Words resolve along
//! the frame chain; words bound to functions apply, consuming argument
//! expressions (and `--refinements`) from the stream. Infix operators take
//! their left argument from the just-completed expression, left to right
//! with no precedence. Non-local control (break/continue/return) travels as
//! [`Unwind`] variants and is caught at loop and function boundaries.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
    datum::Datum,
    error::{Error, ErrorId, EvalResult, Unwind},
    frame::{Frame, FrameId, FrameKind, Frames, ROOT_FRAME},
    intern::{Interns, Symbol, WellKnown},
    io::{PrintWriter, StdPrint},
    mold::{self, MoldCtx},
    natives,
    parse::{self, Parsed},
    resource::ResourceLimits,
    tracer::{EvalTracer, NoopTracer},
    types::{BlockSeries, Func, FuncBody, StringSeries, Type},
    value::{self, ObjRef, PathData, PathSeg, Value},
};

/// Arguments collected for one function call: positional values plus
/// supplied refinements.
#[derive(Debug)]
pub(crate) struct Invocation {
    pub name: Option<Symbol>,
    pub args: SmallVec<[Value; 4]>,
    pub refs: SmallVec<[(Symbol, Value); 2]>,
}

impl Invocation {
    /// The call's display name for error messages.
    pub fn op_name<'a>(&self, ev: &'a Evaluator) -> &'a str {
        self.name.map_or("(anonymous)", |sym| ev.interns.resolve(sym))
    }

    pub fn arg(&self, i: usize) -> &Value {
        &self.args[i]
    }

    /// Moves an argument out, leaving `none` in its slot.
    pub fn take_arg(&mut self, i: usize) -> Value {
        std::mem::replace(&mut self.args[i], Value::None)
    }

    pub fn refinement(&self, name: Symbol) -> Option<&Value> {
        self.refs.iter().find(|(sym, _)| *sym == name).map(|(_, v)| v)
    }

    pub fn has_refinement(&self, name: Symbol) -> bool {
        self.refinement(name).is_some()
    }

    fn mismatch(&self, ev: &Evaluator, expected: &str, got: Type) -> Unwind {
        Error::script(
            ErrorId::TypeMismatch,
            format!(
                "Type mismatch for '{}': expected {expected}, got {got}",
                self.op_name(ev)
            ),
        )
        .into()
    }

    pub fn int(&self, ev: &Evaluator, i: usize) -> Result<i64, Unwind> {
        match self.arg(i) {
            Value::Int(n) => Ok(*n),
            other => Err(self.mismatch(ev, "integer!", other.ty())),
        }
    }

    pub fn block(&self, ev: &Evaluator, i: usize) -> Result<BlockSeries, Unwind> {
        match self.arg(i) {
            Value::Block(b) => Ok(b.clone()),
            other => Err(self.mismatch(ev, "block!", other.ty())),
        }
    }

    /// A word argument; lit-words have already evaluated to plain words.
    pub fn word(&self, ev: &Evaluator, i: usize) -> Result<Symbol, Unwind> {
        match self.arg(i) {
            Value::Word(sym) | Value::LitWord(sym) => Ok(*sym),
            other => Err(self.mismatch(ev, "word!", other.ty())),
        }
    }

    /// Integer value of a refinement, when supplied.
    pub fn refinement_int(&self, ev: &Evaluator, name: Symbol) -> Result<Option<i64>, Unwind> {
        match self.refinement(name) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(self.mismatch(ev, "integer!", other.ty())),
        }
    }
}

/// The interpreter: frame store, interner, and the ambient hooks, with
/// natives registered into the root frame.
pub struct Evaluator {
    pub(crate) frames: Frames,
    pub(crate) interns: Interns,
    pub(crate) wk: WellKnown,
    /// Frame new bindings land in; resolution starts here.
    pub(crate) current: FrameId,
    /// Combined function-call and block-nesting depth.
    pub(crate) depth: usize,
    pub(crate) limits: ResourceLimits,
    pub(crate) print: Box<dyn PrintWriter>,
    pub(crate) tracer: Box<dyn EvalTracer>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator with the full native library registered.
    pub fn new() -> Self {
        let mut interns = Interns::new();
        let wk = WellKnown::new(&mut interns);
        let mut ev = Self {
            frames: Frames::new(),
            interns,
            wk,
            current: ROOT_FRAME,
            depth: 0,
            limits: ResourceLimits::default(),
            print: Box::new(StdPrint),
            tracer: Box::new(NoopTracer),
        };
        ev.register_root_values();
        natives::register_all(&mut ev);
        ev
    }

    pub fn with_limits(limits: ResourceLimits) -> Self {
        let mut ev = Self::new();
        ev.limits = limits;
        ev
    }

    /// The root frame all natives and globals live in.
    pub fn root_frame(&self) -> FrameId {
        ROOT_FRAME
    }

    /// Replaces the output writer, returning the previous one.
    pub fn set_print(&mut self, print: Box<dyn PrintWriter>) -> Box<dyn PrintWriter> {
        std::mem::replace(&mut self.print, print)
    }

    /// Replaces the tracer, returning the previous one.
    pub fn set_tracer(&mut self, tracer: Box<dyn EvalTracer>) -> Box<dyn EvalTracer> {
        std::mem::replace(&mut self.tracer, tracer)
    }

    pub fn set_limits(&mut self, limits: ResourceLimits) {
        self.limits = limits;
    }

    /// Parses source into a value sequence plus its location table.
    pub fn parse(&mut self, src: &str, source_name: &str) -> Result<Parsed, Error> {
        parse::parse(src, source_name, &mut self.interns)
    }

    /// Evaluates a parsed sequence to completion.
    ///
    /// A top-level `return` terminates evaluation with its value; an escaped
    /// `break`/`continue` becomes the corresponding Script error. Errors get
    /// `(top level)` appended to their call stack.
    pub fn do_block(&mut self, parsed: &Parsed) -> Result<Datum, Error> {
        match self.eval_block(&parsed.block) {
            Ok(v) | Err(Unwind::Return(v)) => Ok(self.datum(&v)),
            Err(other) => {
                let mut e = other.into_boundary_error();
                e.where_.push("(top level)".to_owned());
                self.tracer.on_error(&e.id.to_string());
                // unwinding never leaves a stale frame selected
                self.current = ROOT_FRAME;
                self.depth = 0;
                Err(*e)
            }
        }
    }

    /// Parses and evaluates in one step.
    pub fn do_source(&mut self, src: &str, source_name: &str) -> Result<Datum, Error> {
        let parsed = self.parse(src, source_name)?;
        self.do_block(&parsed)
    }

    /// Looks up a root-frame binding by name.
    pub fn get_global(&mut self, name: &str) -> Option<Datum> {
        let sym = self.interns.intern(name);
        let value = self.frames.resolve(ROOT_FRAME, sym)?;
        Some(self.datum(&value))
    }

    /// Creates or updates a root-frame binding.
    pub fn set_global(&mut self, name: &str, value: &Datum) -> Result<(), Error> {
        let sym = self.interns.intern(name);
        let value = self.value_from_datum(value)?;
        self.frames.bind(ROOT_FRAME, sym, value);
        Ok(())
    }

    /// Registers a host callback as an ordinary function in the root frame.
    ///
    /// Arguments and results cross the boundary as [`Datum`]; an `Err` from
    /// the hook surfaces as a Script error. This is the registration hook
    /// for external collaborators (I/O ports, debuggers).
    pub fn register_host_fn(
        &mut self,
        name: &str,
        params: &[&str],
        hook: impl Fn(&[Datum]) -> Result<Datum, String> + 'static,
    ) {
        let sym = self.interns.intern(name);
        let params: Vec<Symbol> = params.iter().map(|p| self.interns.intern(p)).collect();
        let min_args = params.len();
        let func = Func {
            name: std::cell::RefCell::new(Some(sym)),
            doc: None,
            params,
            min_args,
            refinements: Vec::new(),
            body: FuncBody::Host(Rc::new(hook)),
            captured: ROOT_FRAME,
            infix: false,
            transparent: false,
        };
        self.frames.bind(ROOT_FRAME, sym, Value::Func(Rc::new(func)));
    }

    fn register_root_values(&mut self) {
        let entries = [
            ("true", Value::Logic(true)),
            ("false", Value::Logic(false)),
            ("none", Value::None),
        ];
        for (name, value) in entries {
            let sym = self.interns.intern(name);
            self.frames.bind(ROOT_FRAME, sym, value);
        }
        // datatype words evaluate to themselves; `make` dispatches on them
        self.frames
            .bind(ROOT_FRAME, self.wk.object_type, Value::Word(self.wk.object_type));
        self.frames
            .bind(ROOT_FRAME, self.wk.error_type, Value::Word(self.wk.error_type));
    }

    pub(crate) fn mold_ctx(&self) -> MoldCtx<'_> {
        MoldCtx {
            interns: &self.interns,
            frames: &self.frames,
        }
    }

    pub(crate) fn mold_value(&self, value: &Value) -> String {
        mold::mold(value, &self.mold_ctx())
    }

    pub(crate) fn form_value(&self, value: &Value) -> String {
        mold::form(value, &self.mold_ctx())
    }

    // --- core walk ---------------------------------------------------------

    /// Evaluates a block from its index to the end, returning the last
    /// expression's value (`none` for an empty block).
    pub(crate) fn eval_block(&mut self, blk: &BlockSeries) -> EvalResult<Value> {
        self.limits.check_depth(self.depth)?;
        self.depth += 1;
        let result = self.eval_block_inner(blk);
        self.depth -= 1;
        result
    }

    fn eval_block_inner(&mut self, blk: &BlockSeries) -> EvalResult<Value> {
        let mut pos = blk.index;
        let mut last = Value::None;
        while pos < blk.buf_len() {
            match self.eval_expr(blk, pos) {
                Ok((value, next)) => {
                    last = value;
                    pos = next;
                }
                Err(unwind) => return Err(self.fill_near(unwind, blk, pos)),
            }
        }
        Ok(last)
    }

    /// Populates `near` with a molded window around the failing position,
    /// innermost block wins.
    fn fill_near(&mut self, unwind: Unwind, blk: &BlockSeries, pos: usize) -> Unwind {
        if let Unwind::Error(mut e) = unwind {
            if e.near.is_empty() {
                let values = blk.buf.borrow();
                let window = &values[pos.min(values.len())..(pos + 5).min(values.len())];
                let ctx = self.mold_ctx();
                let mut near = String::new();
                for (i, v) in window.iter().enumerate() {
                    if i > 0 {
                        near.push(' ');
                    }
                    near.push_str(&mold::mold(v, &ctx));
                }
                e.near = near;
            }
            Unwind::Error(e)
        } else {
            unwind
        }
    }

    fn at(blk: &BlockSeries, pos: usize) -> Option<Value> {
        blk.buf.borrow().get(pos).cloned()
    }

    /// Evaluates one full expression starting at `pos`, including infix
    /// continuation. Returns the value and the position after it.
    pub(crate) fn eval_expr(&mut self, blk: &BlockSeries, pos: usize) -> EvalResult<(Value, usize)> {
        let (mut value, mut pos) = self.eval_once(blk, pos)?;
        // infix lookahead: a word bound to an infix function takes the
        // completed expression as its left argument; left-associative
        loop {
            let Some(Value::Word(sym)) = Self::at(blk, pos) else {
                break;
            };
            let Some(Value::Func(func)) = self.frames.resolve(self.current, sym) else {
                break;
            };
            if !func.infix {
                break;
            }
            pos += 1;
            if pos >= blk.buf_len() {
                return Err(Error::script(
                    ErrorId::ArgCount,
                    format!(
                        "Wrong argument count for '{}': expected 2, got 1",
                        self.interns.resolve(sym)
                    ),
                )
                .into());
            }
            let (right, next) = self.eval_once(blk, pos)?;
            pos = next;
            let inv = Invocation {
                name: Some(sym),
                args: SmallVec::from_vec(vec![value, right]),
                refs: SmallVec::new(),
            };
            value = self.invoke(&func, inv)?;
        }
        Ok((value, pos))
    }

    /// Evaluates a single unit (no infix continuation).
    fn eval_once(&mut self, blk: &BlockSeries, pos: usize) -> EvalResult<(Value, usize)> {
        let value = Self::at(blk, pos).expect("eval_once past end of block");
        self.tracer.on_eval(value.ty(), self.depth);
        match value {
            Value::Word(sym) => {
                let Some(bound) = self.frames.resolve(self.current, sym) else {
                    return Err(self.no_value(sym));
                };
                if let Value::Func(func) = bound {
                    self.apply(&func, Some(sym), blk, pos + 1)
                } else {
                    Ok((bound, pos + 1))
                }
            }
            Value::SetWord(sym) => {
                if pos + 1 >= blk.buf_len() {
                    return Err(Error::script(
                        ErrorId::NoValue,
                        format!("{}: needs a value", self.interns.resolve(sym)),
                    )
                    .into());
                }
                let (v, next) = self.eval_expr(blk, pos + 1)?;
                if let Value::Func(func) = &v
                    && func.name.borrow().is_none()
                {
                    *func.name.borrow_mut() = Some(sym);
                }
                self.frames.bind(self.current, sym, v.clone());
                Ok((v, next))
            }
            Value::GetWord(sym) => {
                let Some(bound) = self.frames.resolve(self.current, sym) else {
                    return Err(self.no_value(sym));
                };
                Ok((bound, pos + 1))
            }
            Value::LitWord(sym) => Ok((Value::Word(sym), pos + 1)),
            Value::Paren(p) => {
                let v = self.eval_block(&p)?;
                Ok((v, pos + 1))
            }
            Value::Path(data) => self.eval_path(&data, blk, pos),
            Value::SetPath(data) => self.eval_set_path(&data, blk, pos),
            Value::GetPath(data) => {
                let v = self.walk_path(&data, data.segments.len())?;
                Ok((v, pos + 1))
            }
            Value::Refinement(_) => {
                Err(Error::script(ErrorId::InvalidOperation, "Misplaced refinement").into())
            }
            literal => Ok((literal, pos + 1)),
        }
    }

    fn no_value(&self, sym: Symbol) -> Unwind {
        Error::script(
            ErrorId::NoValue,
            format!("{} has no value", self.interns.resolve(sym)),
        )
        .into()
    }

    // --- function application ---------------------------------------------

    /// Collects arguments and refinements from the stream, then invokes.
    /// Returns the result and the position after the consumed arguments.
    fn apply(
        &mut self,
        func: &Rc<Func>,
        name: Option<Symbol>,
        blk: &BlockSeries,
        argpos: usize,
    ) -> EvalResult<(Value, usize)> {
        let display = name.or(*func.name.borrow());
        let total = func.params.len();
        let mut args: SmallVec<[Value; 4]> = SmallVec::new();
        let mut refs: SmallVec<[(Symbol, Value); 2]> = SmallVec::new();
        let mut pos = argpos;
        loop {
            let next_is_refinement = matches!(Self::at(blk, pos), Some(Value::Refinement(_)));
            if args.len() >= total && !next_is_refinement {
                break;
            }
            if pos >= blk.buf_len() {
                if args.len() >= func.min_args {
                    while args.len() < total {
                        args.push(Value::None);
                    }
                    break;
                }
                return Err(Error::script(
                    ErrorId::ArgCount,
                    format!(
                        "Wrong argument count for '{}': expected {total}, got {}",
                        self.display_name(display),
                        args.len()
                    ),
                )
                .into());
            }
            if next_is_refinement {
                let Some(Value::Refinement(rsym)) = Self::at(blk, pos) else {
                    unreachable!("peeked refinement vanished");
                };
                pos += 1;
                let Some(spec) = func.refinement(rsym).copied() else {
                    return Err(Error::script(
                        ErrorId::UnknownRefinement,
                        format!(
                            "Unknown refinement --{} for '{}'",
                            self.interns.resolve(rsym),
                            self.display_name(display)
                        ),
                    )
                    .into());
                };
                if refs.iter().any(|(sym, _)| *sym == rsym) {
                    return Err(Error::script(
                        ErrorId::DuplicateRefinement,
                        format!(
                            "Duplicate refinement --{} for '{}'",
                            self.interns.resolve(rsym),
                            self.display_name(display)
                        ),
                    )
                    .into());
                }
                if spec.takes_value() {
                    let next_missing = pos >= blk.buf_len()
                        || matches!(Self::at(blk, pos), Some(Value::Refinement(_)));
                    if next_missing {
                        return Err(Error::script(
                            ErrorId::RefinementNeedsValue,
                            format!(
                                "Refinement --{} for '{}' requires a value",
                                self.interns.resolve(rsym),
                                self.display_name(display)
                            ),
                        )
                        .into());
                    }
                    let (v, next) = self.eval_expr(blk, pos)?;
                    refs.push((rsym, v));
                    pos = next;
                } else {
                    refs.push((rsym, Value::Logic(true)));
                }
                continue;
            }
            let (v, next) = self.eval_expr(blk, pos)?;
            args.push(v);
            pos = next;
        }
        let inv = Invocation {
            name: display,
            args,
            refs,
        };
        let value = self.invoke(func, inv)?;
        Ok((value, pos))
    }

    fn display_name(&self, name: Option<Symbol>) -> &str {
        name.map_or("(anonymous)", |sym| self.interns.resolve(sym))
    }

    /// Invokes a function whose arguments are already collected.
    ///
    /// A failing call pushes its name onto the error's call stack unless the
    /// function is transparent (control-flow natives stay invisible).
    pub(crate) fn invoke(&mut self, func: &Rc<Func>, inv: Invocation) -> EvalResult<Value> {
        let name = inv.name;
        let result = self.invoke_body(func, inv);
        match result {
            Err(Unwind::Error(mut e)) if !func.transparent => {
                e.where_.push(self.display_name(name).to_owned());
                Err(Unwind::Error(e))
            }
            other => other,
        }
    }

    fn invoke_body(&mut self, func: &Rc<Func>, inv: Invocation) -> EvalResult<Value> {
        match &func.body {
            FuncBody::Native(native) => native(self, inv),
            FuncBody::Action(action) => {
                let action = *action;
                let ty = inv.args.first().map_or(Type::None, Value::ty);
                match self.frames.action_impl(ty, action) {
                    Some(Value::Func(imp)) => {
                        let FuncBody::Native(native) = &imp.body else {
                            unreachable!("type-frame entries are native implementations")
                        };
                        native(self, inv)
                    }
                    _ => Err(Error::script(
                        ErrorId::ActionNoImpl,
                        format!(
                            "Action '{}' has no implementation for {ty}",
                            self.interns.resolve(action)
                        ),
                    )
                    .into()),
                }
            }
            FuncBody::Host(hook) => {
                let hook = Rc::clone(hook);
                let args: Vec<Datum> = inv.args.iter().map(|v| self.datum(v)).collect();
                match hook(&args) {
                    Ok(result) => Ok(self.value_from_datum(&result)?),
                    Err(message) => Err(Error::script(ErrorId::InvalidOperation, message).into()),
                }
            }
            FuncBody::Block(body) => self.call_user_func(func, inv, &body.clone()),
        }
    }

    fn call_user_func(
        &mut self,
        func: &Rc<Func>,
        inv: Invocation,
        body: &BlockSeries,
    ) -> EvalResult<Value> {
        self.limits.check_depth(self.depth)?;
        let mut frame = Frame::new(FrameKind::FunctionArgs, Some(func.captured));
        frame.name = inv.name;
        let fid = self.frames.alloc(frame);
        for (param, arg) in func.params.iter().zip(inv.args) {
            self.frames.bind(fid, *param, arg);
        }
        for spec in &func.refinements {
            let supplied = inv.refs.iter().find(|(sym, _)| *sym == spec.name).map(|(_, v)| v);
            match spec.value_param {
                Some(vp) => {
                    let flag = if supplied.is_some() { Value::Logic(true) } else { Value::None };
                    self.frames.bind(fid, spec.name, flag);
                    self.frames.bind(fid, vp, supplied.cloned().unwrap_or(Value::None));
                }
                None => {
                    let flag = supplied.cloned().unwrap_or(Value::None);
                    self.frames.bind(fid, spec.name, flag);
                }
            }
        }
        let saved = self.current;
        self.current = fid;
        self.depth += 1;
        let name_str = inv.name.map(|sym| self.interns.resolve(sym).to_owned());
        self.tracer.on_call(name_str.as_deref(), self.depth);
        // literal series in the body denote a fresh buffer per call
        let fresh = value::fresh_block(body);
        let result = self.eval_block_inner(&fresh);
        self.depth -= 1;
        self.tracer.on_return(self.depth);
        self.current = saved;
        self.frames.release(fid);
        // the caller (invoke) adds this frame's name to the call stack
        match result {
            Ok(v) | Err(Unwind::Return(v)) => Ok(v),
            Err(Unwind::Break { .. }) => Err(Error::script(
                ErrorId::BreakOutsideLoop,
                "break crossed a function boundary",
            )
            .into()),
            Err(Unwind::Continue { .. }) => Err(Error::script(
                ErrorId::ContinueOutsideLoop,
                "continue crossed a function boundary",
            )
            .into()),
            Err(other) => Err(other),
        }
    }

    // --- paths -------------------------------------------------------------

    /// A resolved path segment key, after eval-segment evaluation.
    fn segment_key(&mut self, seg: &PathSeg) -> EvalResult<Key> {
        match seg {
            PathSeg::Word(sym) => Ok(Key::Word(*sym)),
            PathSeg::Int(n) => Ok(Key::Int(*n)),
            PathSeg::Str(s) => Ok(Key::Str(s.to_string())),
            PathSeg::Paren(p) => {
                let v = self.eval_block(p)?;
                match v {
                    Value::Word(sym) | Value::LitWord(sym) => Ok(Key::Word(sym)),
                    Value::Int(n) => Ok(Key::Int(n)),
                    Value::Str(s) => Ok(Key::Str(s.tail_text())),
                    other => Err(Error::script(
                        ErrorId::InvalidPath,
                        format!("Invalid path segment of type {}", other.ty()),
                    )
                    .into()),
                }
            }
        }
    }

    /// Resolves the head of a path.
    fn path_head(&mut self, seg: &PathSeg) -> EvalResult<Value> {
        match seg {
            PathSeg::Word(sym) => self
                .frames
                .resolve(self.current, *sym)
                .ok_or_else(|| self.no_value(*sym)),
            PathSeg::Int(n) => Ok(Value::Int(*n)),
            PathSeg::Str(s) => Ok(Value::Str(StringSeries::new(s))),
            PathSeg::Paren(_) => Err(Error::syntax(
                ErrorId::PathEvalBase,
                "Path may not begin with an eval segment",
            )
            .into()),
        }
    }

    /// Walks the first `upto` segments of a path, descending step by step.
    /// Each eval segment is evaluated exactly once.
    fn walk_path(&mut self, data: &PathData, upto: usize) -> EvalResult<Value> {
        let mut current = self.path_head(&data.segments[0])?;
        for seg in &data.segments[1..upto] {
            let key = self.segment_key(seg)?;
            current = self.descend(current, &key)?;
        }
        Ok(current)
    }

    /// Plain path evaluation: walks to the leaf; a function at the leaf is
    /// applied, consuming arguments from the stream.
    fn eval_path(
        &mut self,
        data: &Rc<PathData>,
        blk: &BlockSeries,
        pos: usize,
    ) -> EvalResult<(Value, usize)> {
        let leaf = self.walk_path(data, data.segments.len())?;
        if let Value::Func(func) = leaf {
            let name = match data.segments.last() {
                Some(PathSeg::Word(sym)) => Some(*sym),
                _ => None,
            };
            self.apply(&func, name, blk, pos + 1)
        } else {
            Ok((leaf, pos + 1))
        }
    }

    /// Set-path: walk to the parent, resolve the final key, then evaluate
    /// the stored expression once and assign.
    fn eval_set_path(
        &mut self,
        data: &Rc<PathData>,
        blk: &BlockSeries,
        pos: usize,
    ) -> EvalResult<(Value, usize)> {
        let count = data.segments.len();
        let base = self.walk_path(data, count - 1)?;
        let key = self.segment_key(&data.segments[count - 1])?;
        if pos + 1 >= blk.buf_len() {
            return Err(Error::script(ErrorId::NoValue, "set-path needs a value").into());
        }
        let (value, next) = self.eval_expr(blk, pos + 1)?;
        self.assign(&base, &key, value.clone())?;
        Ok((value, next))
    }

    fn descend(&mut self, base: Value, key: &Key) -> EvalResult<Value> {
        match base {
            Value::None => {
                Err(Error::script(ErrorId::NonePath, "Cannot descend into none").into())
            }
            Value::Object(obj) => self.object_field(obj, key),
            Value::Block(b) | Value::Paren(b) => match key {
                Key::Int(n) => self.block_index(&b, *n),
                Key::Word(sym) => Ok(assoc_lookup(&b, &Value::Word(*sym)).unwrap_or(Value::None)),
                Key::Str(s) => {
                    let needle = Value::Str(StringSeries::new(s));
                    Ok(assoc_lookup(&b, &needle).unwrap_or(Value::None))
                }
            },
            Value::Str(s) => match key {
                Key::Int(n) => {
                    let idx = self.check_index(*n, s.len())?;
                    let c = s.get(idx).expect("checked index");
                    Ok(Value::Str(StringSeries::from_chars(vec![c])))
                }
                _ => Err(Error::script(
                    ErrorId::InvalidPath,
                    "Strings are indexed with integers",
                )
                .into()),
            },
            Value::Binary(b) => match key {
                Key::Int(n) => {
                    let idx = self.check_index(*n, b.len())?;
                    Ok(Value::Int(i64::from(b.get(idx).expect("checked index"))))
                }
                _ => Err(Error::script(
                    ErrorId::InvalidPath,
                    "Binaries are indexed with integers",
                )
                .into()),
            },
            Value::Error(e) => self.error_field(&e, key),
            other => Err(Error::script(
                ErrorId::InvalidPath,
                format!("Cannot access {} with a path", other.ty()),
            )
            .into()),
        }
    }

    fn object_field(&mut self, obj: ObjRef, key: &Key) -> EvalResult<Value> {
        let frame = self.frames.get(obj.frame);
        match key {
            Key::Word(sym) => frame.bindings.get(sym).cloned().ok_or_else(|| {
                Error::script(
                    ErrorId::NoSuchField,
                    format!("Object has no field '{}'", self.interns.resolve(*sym)),
                )
                .into()
            }),
            Key::Str(s) => frame
                .bindings
                .iter()
                .find(|(sym, _)| self.interns.resolve(**sym) == s.as_str())
                .map(|(_, v)| v.clone())
                .ok_or_else(|| {
                    Error::script(ErrorId::NoSuchField, format!("Object has no field '{s}'")).into()
                }),
            Key::Int(_) => Err(Error::script(
                ErrorId::InvalidPath,
                "Cannot index an object with an integer",
            )
            .into()),
        }
    }

    /// Errors expose their parts as read-only fields.
    fn error_field(&mut self, e: &Error, key: &Key) -> EvalResult<Value> {
        let Key::Word(sym) = key else {
            return Err(Error::script(
                ErrorId::InvalidPath,
                "Errors are accessed with word fields",
            )
            .into());
        };
        let field = self.interns.resolve(*sym);
        match field {
            "category" => {
                let sym = self.interns.intern(&e.category.to_string());
                Ok(Value::Word(sym))
            }
            "id" => {
                let sym = self.interns.intern(&e.id.to_string());
                Ok(Value::Word(sym))
            }
            "message" => Ok(Value::Str(StringSeries::new(&e.message))),
            "near" => Ok(Value::Str(StringSeries::new(&e.near))),
            "where" => {
                let frames = e
                    .where_
                    .iter()
                    .map(|name| Value::Str(StringSeries::new(name)))
                    .collect();
                Ok(Value::Block(BlockSeries::new(frames)))
            }
            _ => Err(Error::script(
                ErrorId::NoSuchField,
                format!("Error has no field '{field}'"),
            )
            .into()),
        }
    }

    fn check_index(&self, n: i64, len: usize) -> EvalResult<usize> {
        if n >= 1 && (n as usize) <= len {
            Ok(n as usize - 1)
        } else {
            Err(Error::script(
                ErrorId::OutOfBounds,
                format!("Index {n} out of bounds (length {len})"),
            )
            .into())
        }
    }

    fn block_index(&self, b: &BlockSeries, n: i64) -> EvalResult<Value> {
        let idx = self.check_index(n, b.len())?;
        Ok(b.get(idx).expect("checked index"))
    }

    fn assign(&mut self, base: &Value, key: &Key, value: Value) -> EvalResult<()> {
        match base {
            Value::None => {
                Err(Error::script(ErrorId::NonePath, "Cannot descend into none").into())
            }
            Value::Object(obj) => {
                match key {
                    Key::Word(sym) => self.frames.bind(obj.frame, *sym, value),
                    Key::Str(s) => {
                        let sym = self.interns.intern(s);
                        self.frames.bind(obj.frame, sym, value);
                    }
                    Key::Int(_) => {
                        return Err(Error::script(
                            ErrorId::InvalidPath,
                            "Cannot index an object with an integer",
                        )
                        .into());
                    }
                }
                Ok(())
            }
            Value::Block(b) | Value::Paren(b) => match key {
                Key::Int(n) => {
                    let idx = self.check_index(*n, b.len())?;
                    b.buf.borrow_mut()[b.index + idx] = value;
                    Ok(())
                }
                Key::Word(sym) => {
                    assoc_store(b, Value::Word(*sym), value);
                    Ok(())
                }
                Key::Str(s) => {
                    assoc_store(b, Value::Str(StringSeries::new(s)), value);
                    Ok(())
                }
            },
            Value::Str(s) => {
                let Key::Int(n) = key else {
                    return Err(Error::script(
                        ErrorId::InvalidPath,
                        "Strings are indexed with integers",
                    )
                    .into());
                };
                let idx = self.check_index(*n, s.len())?;
                let Value::Str(replacement) = &value else {
                    return Err(Error::script(
                        ErrorId::TypeMismatch,
                        format!(
                            "Type mismatch for set-path: expected string!, got {}",
                            value.ty()
                        ),
                    )
                    .into());
                };
                let chars = replacement.tail_chars();
                if chars.len() != 1 {
                    return Err(Error::script(
                        ErrorId::TypeMismatch,
                        "Set-path on a string requires a single-character string",
                    )
                    .into());
                }
                s.buf.borrow_mut()[s.index + idx] = chars[0];
                Ok(())
            }
            Value::Binary(b) => {
                let Key::Int(n) = key else {
                    return Err(Error::script(
                        ErrorId::InvalidPath,
                        "Binaries are indexed with integers",
                    )
                    .into());
                };
                let idx = self.check_index(*n, b.len())?;
                let Value::Int(byte) = value else {
                    return Err(Error::script(
                        ErrorId::TypeMismatch,
                        format!(
                            "Type mismatch for set-path: expected integer!, got {}",
                            value.ty()
                        ),
                    )
                    .into());
                };
                if !(0..=255).contains(&byte) {
                    return Err(Error::script(
                        ErrorId::InvalidOperation,
                        format!("Byte value out of range: {byte}"),
                    )
                    .into());
                }
                b.buf.borrow_mut()[b.index + idx] = byte as u8;
                Ok(())
            }
            other => Err(Error::script(
                ErrorId::InvalidPath,
                format!("Cannot access {} with a path", other.ty()),
            )
            .into()),
        }
    }
}

/// A resolved path segment key.
enum Key {
    Word(Symbol),
    Int(i64),
    Str(String),
}

/// First-occurrence association lookup in a block, pair-aligned from the
/// block's index: `[key1 val1 key2 val2 ...]`.
pub(crate) fn assoc_lookup(b: &BlockSeries, needle: &Value) -> Option<Value> {
    let values = b.tail_values();
    let mut i = 0;
    while i < values.len() {
        if values[i].equals(needle) {
            return Some(values.get(i + 1).cloned().unwrap_or(Value::None));
        }
        i += 2;
    }
    None
}

/// Pair-aligned association store: replaces the value slot of the first
/// matching key, or appends the pair at the tail. An odd-length tail is
/// extended with the value.
pub(crate) fn assoc_store(b: &BlockSeries, key: Value, value: Value) {
    let len = b.len();
    let start = b.index;
    let mut i = 0;
    while i < len {
        let matches = b.buf.borrow()[start + i].equals(&key);
        if matches {
            let mut buf = b.buf.borrow_mut();
            if start + i + 1 < buf.len() {
                buf[start + i + 1] = value;
            } else {
                buf.push(value);
            }
            return;
        }
        i += 2;
    }
    let mut buf = b.buf.borrow_mut();
    buf.push(key);
    buf.push(value);
}
