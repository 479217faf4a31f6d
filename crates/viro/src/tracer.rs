//! Evaluation tracing infrastructure.
//!
//! Provides the trace/step boundary for external debugger and REPL trace
//! sessions. All [`EvalTracer`] methods have default no-op implementations,
//! so the default [`NoopTracer`] costs nothing beyond a virtual call and
//! implementations only override the hooks they care about.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No-op (production default) |
//! | [`StderrTracer`] | Human-readable execution log to stderr |
//! | [`RecordingTracer`] | Full event recording for inspection |

use std::{cell::RefCell, rc::Rc};

use crate::types::Type;

/// Trace event emitted during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// An expression was about to be evaluated.
    Eval {
        /// Type tag of the value heading the expression.
        ty: Type,
        /// Evaluation depth (function calls plus nested blocks).
        depth: usize,
    },
    /// A function call pushed a new frame.
    Call {
        /// Function name, when known.
        name: Option<String>,
        /// Call depth after the push.
        depth: usize,
    },
    /// A function call returned.
    Return { depth: usize },
    /// An error began to unwind.
    Error {
        /// The error id, in its kebab-case spelling.
        id: String,
    },
}

/// Trait for evaluation tracing.
pub trait EvalTracer {
    /// Called before each expression is evaluated.
    #[inline]
    fn on_eval(&mut self, _ty: Type, _depth: usize) {}

    /// Called when a function call pushes a frame.
    #[inline]
    fn on_call(&mut self, _name: Option<&str>, _depth: usize) {}

    /// Called when a function call returns.
    #[inline]
    fn on_return(&mut self, _depth: usize) {}

    /// Called when an error starts unwinding.
    #[inline]
    fn on_error(&mut self, _id: &str) {}
}

/// Zero-cost default tracer.
#[derive(Debug, Default)]
pub struct NoopTracer;

impl EvalTracer for NoopTracer {}

/// Tracer that logs readable lines to stderr.
#[derive(Debug, Default)]
pub struct StderrTracer;

impl EvalTracer for StderrTracer {
    fn on_eval(&mut self, ty: Type, depth: usize) {
        eprintln!("{:depth$}eval {ty}", "");
    }

    fn on_call(&mut self, name: Option<&str>, depth: usize) {
        eprintln!("{:depth$}call {}", "", name.unwrap_or("(anonymous)"));
    }

    fn on_return(&mut self, depth: usize) {
        eprintln!("{:depth$}return", "");
    }

    fn on_error(&mut self, id: &str) {
        eprintln!("error: {id}");
    }
}

/// Tracer that records every event for later inspection.
///
/// Clones share the same event buffer, so a caller can keep one handle while
/// the evaluator owns the other (same pattern as
/// [`CollectStringPrint`](crate::io::CollectStringPrint)).
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    events: Rc<RefCell<Vec<TraceEvent>>>,
}

impl RecordingTracer {
    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.borrow().clone()
    }

    /// Returns the recorded events, clearing the buffer.
    pub fn take(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.events.borrow_mut())
    }
}

impl EvalTracer for RecordingTracer {
    fn on_eval(&mut self, ty: Type, depth: usize) {
        self.events.borrow_mut().push(TraceEvent::Eval { ty, depth });
    }

    fn on_call(&mut self, name: Option<&str>, depth: usize) {
        self.events.borrow_mut().push(TraceEvent::Call {
            name: name.map(str::to_owned),
            depth,
        });
    }

    fn on_return(&mut self, depth: usize) {
        self.events.borrow_mut().push(TraceEvent::Return { depth });
    }

    fn on_error(&mut self, id: &str) {
        self.events.borrow_mut().push(TraceEvent::Error { id: id.to_owned() });
    }
}
