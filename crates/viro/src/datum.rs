//! Public value representation.
//!
//! Internal values are reference-counted and interner-dependent, so the
//! public API mirrors them with [`Datum`]: a plain, self-contained enum.
//! Series lose their buffer identity at the boundary (a `Datum::Block` is a
//! snapshot from the series' index).

use crate::{
    error::{Error, ErrorId},
    eval::Evaluator,
    types::{BinarySeries, BlockSeries, StringSeries},
    value::{PathSeg, Value},
};

/// A plain value crossing the public boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    None,
    Logic(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Binary(Vec<u8>),
    Block(Vec<Datum>),
    Paren(Vec<Datum>),
    Word(String),
    SetWord(String),
    GetWord(String),
    LitWord(String),
    Refinement(String),
    /// Path segments in molded form (`a.(b).2` -> `["a", "(b)", "2"]`).
    Path(Vec<String>),
    SetPath(Vec<String>),
    GetPath(Vec<String>),
    Function {
        name: Option<String>,
    },
    /// Ordered field list.
    Object(Vec<(String, Datum)>),
    Error(Error),
}

impl Evaluator {
    /// Converts an internal value into its public snapshot.
    pub(crate) fn datum(&self, value: &Value) -> Datum {
        match value {
            Value::None => Datum::None,
            Value::Logic(b) => Datum::Logic(*b),
            Value::Int(n) => Datum::Integer(*n),
            Value::Decimal(d) => Datum::Decimal(*d),
            Value::Str(s) => Datum::String(s.tail_text()),
            Value::Binary(b) => Datum::Binary(b.tail_bytes()),
            Value::Block(b) => Datum::Block(b.tail_values().iter().map(|v| self.datum(v)).collect()),
            Value::Paren(p) => Datum::Paren(p.tail_values().iter().map(|v| self.datum(v)).collect()),
            Value::Word(sym) => Datum::Word(self.interns.resolve(*sym).to_owned()),
            Value::SetWord(sym) => Datum::SetWord(self.interns.resolve(*sym).to_owned()),
            Value::GetWord(sym) => Datum::GetWord(self.interns.resolve(*sym).to_owned()),
            Value::LitWord(sym) => Datum::LitWord(self.interns.resolve(*sym).to_owned()),
            Value::Refinement(sym) => Datum::Refinement(self.interns.resolve(*sym).to_owned()),
            Value::Path(data) => Datum::Path(self.path_segments(&data.segments)),
            Value::SetPath(data) => Datum::SetPath(self.path_segments(&data.segments)),
            Value::GetPath(data) => Datum::GetPath(self.path_segments(&data.segments)),
            Value::Func(f) => Datum::Function {
                name: f.name.borrow().map(|sym| self.interns.resolve(sym).to_owned()),
            },
            Value::Object(obj) => {
                let frame = self.frames.get(obj.frame);
                Datum::Object(
                    frame
                        .bindings
                        .iter()
                        .map(|(sym, v)| (self.interns.resolve(*sym).to_owned(), self.datum(v)))
                        .collect(),
                )
            }
            Value::Error(e) => Datum::Error((**e).clone()),
        }
    }

    fn path_segments(&self, segments: &[PathSeg]) -> Vec<String> {
        segments
            .iter()
            .map(|seg| match seg {
                PathSeg::Word(sym) => self.interns.resolve(*sym).to_owned(),
                PathSeg::Int(n) => n.to_string(),
                PathSeg::Str(s) => format!("\"{s}\""),
                PathSeg::Paren(p) => {
                    crate::mold::mold(&Value::Paren(p.clone()), &self.mold_ctx())
                }
            })
            .collect()
    }

    /// Converts a public datum into an internal value.
    ///
    /// Used for host-function results and `set_global`. Functions, paths,
    /// and objects cannot be constructed from outside the evaluator.
    pub(crate) fn value_from_datum(&mut self, datum: &Datum) -> Result<Value, Error> {
        Ok(match datum {
            Datum::None => Value::None,
            Datum::Logic(b) => Value::Logic(*b),
            Datum::Integer(n) => Value::Int(*n),
            Datum::Decimal(d) => Value::Decimal(*d),
            Datum::String(s) => Value::Str(StringSeries::new(s)),
            Datum::Binary(bytes) => Value::Binary(BinarySeries::new(bytes.clone())),
            Datum::Block(items) => Value::Block(self.block_from_data(items)?),
            Datum::Paren(items) => Value::Paren(self.block_from_data(items)?),
            Datum::Word(s) => Value::Word(self.interns.intern(s)),
            Datum::SetWord(s) => Value::SetWord(self.interns.intern(s)),
            Datum::GetWord(s) => Value::GetWord(self.interns.intern(s)),
            Datum::LitWord(s) => Value::LitWord(self.interns.intern(s)),
            Datum::Refinement(s) => Value::Refinement(self.interns.intern(s)),
            Datum::Error(e) => Value::Error(Box::new(e.clone())),
            Datum::Path(_) | Datum::SetPath(_) | Datum::GetPath(_) | Datum::Function { .. } | Datum::Object(_) => {
                return Err(Error::script(
                    ErrorId::InvalidOperation,
                    "Host values of this type cannot enter the evaluator",
                ));
            }
        })
    }

    fn block_from_data(&mut self, items: &[Datum]) -> Result<BlockSeries, Error> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.value_from_datum(item)?);
        }
        Ok(BlockSeries::new(values))
    }
}
