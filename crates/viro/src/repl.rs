//! Persistent session support for interactive hosts.
//!
//! [`ReplSession`] keeps one evaluator alive across `execute()` calls so
//! interactive snippets share bindings, functions, objects, and series
//! buffers. Errors are returned as values; they never tear down the session.
//! The REPL line loop, prompt handling, and error pretty-printing live in
//! the host — this type is the boundary they drive.

use crate::{datum::Datum, error::Error, eval::Evaluator};

/// A persistent evaluation session.
pub struct ReplSession {
    evaluator: Evaluator,
    line: usize,
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplSession {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            line: 0,
        }
    }

    /// Direct access to the underlying evaluator (host registration,
    /// print/tracer installation, globals).
    pub fn evaluator(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// Parses and evaluates one snippet against the session state.
    ///
    /// Snippets are named `repl:N` in source locations, N counting from 1.
    pub fn execute(&mut self, code: &str) -> Result<Datum, Error> {
        self.line += 1;
        let name = format!("repl:{}", self.line);
        self.evaluator.do_source(code, &name)
    }

    /// Molded form of a root-frame binding, mostly for prompt echo.
    pub fn mold_global(&mut self, name: &str) -> Option<String> {
        let sym = self.evaluator.interns.intern(name);
        let value = self
            .evaluator
            .frames
            .resolve(self.evaluator.root_frame(), sym)?;
        Some(self.evaluator.mold_value(&value))
    }
}
