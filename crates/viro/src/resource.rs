//! Execution limits.
//!
//! The evaluator checks the call-depth limit before every function-frame
//! push and every nested block descent, so runaway recursion raises a
//! Script error instead of overflowing the host stack.

use crate::error::{Error, ErrorId};

/// Default maximum evaluation depth (function calls plus nested blocks).
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Limits enforced by the evaluator.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    /// Maximum combined depth of function calls and nested block evaluation.
    pub max_depth: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResourceLimits {
    /// Fails when `depth` has reached the limit. The resulting error unwinds
    /// like any other Script error and must not corrupt evaluator state.
    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), Error> {
        if depth >= self.max_depth {
            Err(Error::script(
                ErrorId::InvalidOperation,
                format!("Call depth limit exceeded ({} frames)", self.max_depth),
            ))
        } else {
            Ok(())
        }
    }
}
