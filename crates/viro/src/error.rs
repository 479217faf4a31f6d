//! Error model: categorized, identified errors plus the evaluator's
//! non-local unwind channel.
//!
//! Runtime failures are [`Error`] values (also the payload of the first-class
//! `error!` type). Break/continue/return travel the same `Result` channel as
//! errors via [`Unwind`], keeping the happy path allocation-free and making
//! every loop/function boundary check explicit.

use std::fmt::{self, Write as _};

use strum::{Display, EnumString, IntoStaticStr};

use crate::value::Value;

/// Result type alias for evaluation steps that can unwind.
pub(crate) type EvalResult<T> = Result<T, Unwind>;

/// Error categories, matching the headers the REPL boundary prints
/// (`** Script Error`, `** Math Error`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorCategory {
    /// Malformed source rejected by the parser.
    Syntax,
    /// Runtime evaluation failures (unbound words, bad arguments, paths).
    Script,
    /// Arithmetic failures.
    Math,
    /// Reserved for the sandboxed I/O collaborators.
    Access,
    /// Errors raised by user code via `make error!`.
    User,
    /// Internal control-flow signals; converted to Script errors when they
    /// escape their catching boundary.
    Throw,
}

/// Error identifiers.
///
/// The fixed set mirrors the documented taxonomy; ids render in kebab-case
/// (`NoValue` -> "no-value"). User code may raise errors with arbitrary ids,
/// which parse into [`ErrorId::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
pub enum ErrorId {
    // Syntax
    #[strum(serialize = "unclosed-block")]
    UnclosedBlock,
    #[strum(serialize = "invalid-character")]
    InvalidCharacter,
    #[strum(serialize = "invalid-binary-length")]
    InvalidBinaryLength,
    #[strum(serialize = "invalid-binary-digit")]
    InvalidBinaryDigit,
    #[strum(serialize = "path-eval-base")]
    PathEvalBase,

    // Script
    #[strum(serialize = "no-value")]
    NoValue,
    #[strum(serialize = "type-mismatch")]
    TypeMismatch,
    #[strum(serialize = "arg-count")]
    ArgCount,
    #[strum(serialize = "action-no-impl")]
    ActionNoImpl,
    #[strum(serialize = "out-of-bounds")]
    OutOfBounds,
    #[strum(serialize = "invalid-path")]
    InvalidPath,
    #[strum(serialize = "no-such-field")]
    NoSuchField,
    #[strum(serialize = "none-path")]
    NonePath,
    #[strum(serialize = "invalid-operation")]
    InvalidOperation,
    #[strum(serialize = "break-outside-loop")]
    BreakOutsideLoop,
    #[strum(serialize = "continue-outside-loop")]
    ContinueOutsideLoop,
    #[strum(serialize = "unknown-refinement")]
    UnknownRefinement,
    #[strum(serialize = "duplicate-refinement")]
    DuplicateRefinement,
    #[strum(serialize = "refinement-needs-value")]
    RefinementNeedsValue,

    // Math
    #[strum(serialize = "div-zero")]
    DivZero,

    // Throw (internal; surfaces only when rethrown as Script errors above)
    #[strum(serialize = "break")]
    Break,
    #[strum(serialize = "continue")]
    Continue,
    #[strum(serialize = "return")]
    Return,

    /// User-defined error ids from `make error!`.
    #[strum(default, to_string = "{0}")]
    Custom(String),
}

/// A structured runtime or parse error.
///
/// `near` holds a molded snippet of the source around the fault (parser
/// errors carry the offending source line instead). `where_` is the call
/// stack, innermost first; top-level evaluation appends `(top level)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub category: ErrorCategory,
    pub id: ErrorId,
    pub message: String,
    pub near: String,
    pub where_: Vec<String>,
}

impl Error {
    pub fn new(category: ErrorCategory, id: ErrorId, message: impl Into<String>) -> Self {
        Self {
            category,
            id,
            message: message.into(),
            near: String::new(),
            where_: Vec::new(),
        }
    }

    pub fn syntax(id: ErrorId, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Syntax, id, message)
    }

    pub fn script(id: ErrorId, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Script, id, message)
    }

    pub fn math(id: ErrorId, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Math, id, message)
    }

    pub fn user(id: ErrorId, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::User, id, message)
    }

    pub(crate) fn with_near(mut self, near: impl Into<String>) -> Self {
        self.near = near.into();
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "** {} Error: {}", self.category, self.message)?;
        if !self.near.is_empty() {
            write!(f, "\nnear: {}", self.near)?;
        }
        if !self.where_.is_empty() {
            let mut joined = String::new();
            for (i, frame) in self.where_.iter().enumerate() {
                if i > 0 {
                    joined.push(' ');
                }
                let _ = write!(joined, "{frame}");
            }
            write!(f, "\nwhere: {joined}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Non-local exit channel of the evaluator.
///
/// Loop natives catch `Break`/`Continue`, function application catches
/// `Return`; everything else propagates `Err` until `do_block` surfaces it.
#[derive(Debug)]
pub(crate) enum Unwind {
    Error(Box<Error>),
    /// `break --levels n`: terminates `levels` nested loops.
    Break { levels: i64 },
    /// `continue --levels n`: re-enters the `levels`-th enclosing loop.
    Continue { levels: i64 },
    /// `return v`: unwinds to the nearest function-args boundary.
    Return(Value),
}

impl Unwind {
    /// Converts an escaped control-flow signal into its permanent Script
    /// error at a function or top-level boundary.
    pub fn into_boundary_error(self) -> Box<Error> {
        match self {
            Self::Error(e) => e,
            Self::Break { .. } => Box::new(Error::script(
                ErrorId::BreakOutsideLoop,
                "break used outside of a loop",
            )),
            Self::Continue { .. } => Box::new(Error::script(
                ErrorId::ContinueOutsideLoop,
                "continue used outside of a loop",
            )),
            Self::Return(_) => Box::new(Error::script(ErrorId::InvalidOperation, "misplaced return")),
        }
    }
}

impl From<Error> for Unwind {
    fn from(e: Error) -> Self {
        Self::Error(Box::new(e))
    }
}

impl From<Box<Error>> for Unwind {
    fn from(e: Box<Error>) -> Self {
        Self::Error(e)
    }
}
