//! String series: shared mutable text buffer plus an index.
//!
//! The buffer is kept as a char vector so positional operations (`first`,
//! `skip`, `length?`) are character-based, matching the language's view of
//! strings as character series.

use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Clone)]
pub(crate) struct StringSeries {
    pub buf: Rc<RefCell<Vec<char>>>,
    pub index: usize,
}

impl StringSeries {
    pub fn new(text: &str) -> Self {
        Self {
            buf: Rc::new(RefCell::new(text.chars().collect())),
            index: 0,
        }
    }

    pub fn from_chars(chars: Vec<char>) -> Self {
        Self {
            buf: Rc::new(RefCell::new(chars)),
            index: 0,
        }
    }

    pub fn buf_len(&self) -> usize {
        self.buf.borrow().len()
    }

    pub fn len(&self) -> usize {
        self.buf_len().saturating_sub(self.index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, n: usize) -> Option<char> {
        self.buf.borrow().get(self.index + n).copied()
    }

    pub fn same_buffer(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.buf, &other.buf)
    }

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

    /// The remaining text from the index, as an owned `String`.
    pub fn tail_text(&self) -> String {
        self.buf.borrow()[self.index.min(self.buf_len())..].iter().collect()
    }

    pub fn tail_chars(&self) -> Vec<char> {
        self.buf.borrow()[self.index.min(self.buf_len())..].to_vec()
    }

    pub fn copy_tail(&self) -> Self {
        Self::from_chars(self.tail_chars())
    }
}
