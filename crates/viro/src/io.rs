//! Output handling for the `print`, `probe`, and `help` natives.
//!
//! Implement [`PrintWriter`] to capture or redirect output from evaluated
//! code. The default writer is [`StdPrint`]; tests use
//! [`CollectStringPrint`].

use std::{
    cell::RefCell,
    io::{self, Write as _},
    rc::Rc,
};

/// Trait for handling textual output from evaluated code.
pub trait PrintWriter {
    /// Writes one formed/molded chunk. Must not add separators or newlines;
    /// those arrive via [`PrintWriter::push`].
    fn write(&mut self, output: &str);

    /// Writes a single separator character (space or newline).
    fn push(&mut self, end: char);
}

/// Default writer: straight to stdout, failures ignored.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write(&mut self, output: &str) {
        let _ = io::stdout().write_all(output.as_bytes());
    }

    fn push(&mut self, end: char) {
        let mut buf = [0u8; 4];
        let _ = io::stdout().write_all(end.encode_utf8(&mut buf).as_bytes());
        if end == '\n' {
            let _ = io::stdout().flush();
        }
    }
}

/// Writer that discards everything.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write(&mut self, _output: &str) {}

    fn push(&mut self, _end: char) {}
}

/// Writer that collects all output into a shared string.
///
/// Clones share the same buffer, so a test can keep one handle while the
/// evaluator owns the other:
///
/// ```
/// use viro::{CollectStringPrint, Evaluator};
///
/// let collect = CollectStringPrint::default();
/// let mut ev = Evaluator::new();
/// ev.set_print(Box::new(collect.clone()));
/// ev.do_source("print \"hi\"", "doc").unwrap();
/// assert_eq!(collect.take(), "hi\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollectStringPrint {
    buf: Rc<RefCell<String>>,
}

impl CollectStringPrint {
    /// Returns the collected output, clearing the buffer.
    pub fn take(&self) -> String {
        std::mem::take(&mut self.buf.borrow_mut())
    }

    /// Returns a copy of the collected output without clearing.
    pub fn contents(&self) -> String {
        self.buf.borrow().clone()
    }
}

impl PrintWriter for CollectStringPrint {
    fn write(&mut self, output: &str) {
        self.buf.borrow_mut().push_str(output);
    }

    fn push(&mut self, end: char) {
        self.buf.borrow_mut().push(end);
    }
}
