//! Viro: an embeddable, homoiconic, REBOL-family scripting language core.
//!
//! Programs are sequences of values the evaluator walks left to right:
//!
//! ```
//! use viro::{Datum, Evaluator};
//!
//! let mut ev = Evaluator::new();
//! let result = ev.do_source("fact: fn [n] [if (= n 0) [1] [(* n (fact (- n 1)))]]\nfact 5", "doc");
//! assert_eq!(result.unwrap(), Datum::Integer(120));
//! ```
//!
//! The crate covers the language core: the parser (values plus source
//! locations), the value model with shared-buffer series semantics, frames
//! and binding, the tree-walking evaluator with paths/refinements/closures,
//! the native libraries, and mold/form serialization. The REPL line loop,
//! error pretty-printing, and I/O ports are external collaborators driven
//! through [`ReplSession`], [`PrintWriter`], [`EvalTracer`], and
//! [`Evaluator::register_host_fn`].

mod datum;
mod error;
mod eval;
mod frame;
mod intern;
mod io;
mod mold;
mod natives;
mod parse;
mod repl;
mod resource;
mod tracer;
mod types;
mod value;

pub use crate::{
    datum::Datum,
    error::{Error, ErrorCategory, ErrorId},
    eval::Evaluator,
    frame::FrameId,
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    parse::{Loc, Parsed, SourceMap},
    repl::ReplSession,
    resource::{DEFAULT_MAX_DEPTH, ResourceLimits},
    tracer::{EvalTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
    types::Type,
};
