//! Function values: user closures, natives, type-frame actions, and host
//! callbacks share one callable representation.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    datum::Datum,
    error::EvalResult,
    eval::{Evaluator, Invocation},
    frame::FrameId,
    intern::Symbol,
    types::BlockSeries,
    value::Value,
};

/// Signature of a native implementation.
pub(crate) type NativeFn = fn(&mut Evaluator, Invocation) -> EvalResult<Value>;

/// Signature of a host-registered callback; crosses the boundary as [`Datum`].
pub(crate) type HostFn = Rc<dyn Fn(&[Datum]) -> Result<Datum, String>>;

/// A refinement slot in a function signature: `--flag` or `--name value`.
///
/// For user functions, `value_param` is the word the refinement's value is
/// bound to in the call frame (`fn [s --part n] [...]` binds `n`); the
/// refinement word itself is bound to `true`/`none`. Natives read refinement
/// values straight off the invocation and use `value_param` only as the
/// takes-a-value marker.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RefinementSpec {
    pub name: Symbol,
    pub value_param: Option<Symbol>,
}

impl RefinementSpec {
    pub fn takes_value(&self) -> bool {
        self.value_param.is_some()
    }
}

/// The callable body of a function value.
pub(crate) enum FuncBody {
    /// User function: the body block evaluated per call with fresh literal
    /// buffers.
    Block(BlockSeries),
    /// Built-in implementation.
    Native(NativeFn),
    /// Polymorphic action; the implementation is resolved through the
    /// type-frame of the first argument. Carries the action's own name.
    Action(Symbol),
    /// Host-registered callback.
    Host(HostFn),
}

impl fmt::Debug for FuncBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(b) => f.debug_tuple("Block").field(b).finish(),
            Self::Native(_) => f.write_str("Native(..)"),
            Self::Action(sym) => f.debug_tuple("Action").field(sym).finish(),
            Self::Host(_) => f.write_str("Host(..)"),
        }
    }
}

/// A callable value: parameter spec, body, and the captured frame forming
/// the lexical closure.
#[derive(Debug)]
pub(crate) struct Func {
    /// Filled in by the first set-word that binds this function, so error
    /// call stacks can name it.
    pub name: RefCell<Option<Symbol>>,
    /// Documentation summary from the spec block (or the native's doc record).
    pub doc: Option<Box<str>>,
    pub params: Vec<Symbol>,
    /// Positional slots that must be supplied; trailing slots beyond this
    /// count default to `none` when the stream ends (used by `return`).
    pub min_args: usize,
    pub refinements: Vec<RefinementSpec>,
    pub body: FuncBody,
    /// Lexical parent frame for calls; natives capture the root frame.
    pub captured: FrameId,
    /// Infix operators take their left argument from the preceding
    /// expression.
    pub infix: bool,
    /// Transparent natives (control flow) stay invisible while an error
    /// unwinds: the evaluator skips them when building the error call
    /// stack. They also pass break/continue/return through untouched.
    pub transparent: bool,
}

impl Func {
    /// Looks up a refinement spec by name.
    pub fn refinement(&self, name: Symbol) -> Option<&RefinementSpec> {
        self.refinements.iter().find(|r| r.name == name)
    }
}
