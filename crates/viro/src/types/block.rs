//! Block and paren series: a shared, mutable value buffer plus an index.
//!
//! Every block value is a `(buffer, index)` pair. Cloning a block value
//! clones the handle, not the buffer, so mutation through one handle is
//! visible through all of them. `copy` is the only operation that produces
//! an independent buffer.

use std::{cell::RefCell, rc::Rc};

use crate::value::Value;

#[derive(Debug, Clone)]
pub(crate) struct BlockSeries {
    pub buf: Rc<RefCell<Vec<Value>>>,
    pub index: usize,
}

impl BlockSeries {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            buf: Rc::new(RefCell::new(values)),
            index: 0,
        }
    }

    /// Absolute buffer length, ignoring the index.
    pub fn buf_len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// `length?` semantics: remaining elements from the index, never negative.
    pub fn len(&self) -> usize {
        self.buf_len().saturating_sub(self.index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the nth element relative to the index (0-based), if in range.
    pub fn get(&self, n: usize) -> Option<Value> {
        self.buf.borrow().get(self.index + n).cloned()
    }

    /// Same buffer test (shared mutation visibility).
    pub fn same_buffer(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.buf, &other.buf)
    }

    /// A new handle advanced by `n`, clamped to `[0, buffer length]`.
    pub fn skip(&self, n: i64) -> Self {
        let len = self.buf_len();
        let target = if n.is_negative() {
            self.index.saturating_sub(n.unsigned_abs() as usize)
        } else {
            self.index.saturating_add(n.unsigned_abs() as usize)
        };
        Self {
            buf: Rc::clone(&self.buf),
            index: target.min(len),
        }
    }

    /// The remaining elements from the index, as an owned vector.
    pub fn tail_values(&self) -> Vec<Value> {
        self.buf.borrow()[self.index.min(self.buf_len())..].to_vec()
    }

    /// An independent copy of the remaining elements.
    pub fn copy_tail(&self) -> Self {
        Self::new(self.tail_values())
    }
}
