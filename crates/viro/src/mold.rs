//! Value serialization: `mold` (code-readable) and `form` (human-readable).
//!
//! `mold` round-trips through `parse` for canonical literals; `form` drops
//! the syntax (unquoted strings, bracketless blocks, bare hex binaries).
//! Series are rendered from their index, so `mold next [1 2 3]` is `[2 3]`.

use std::fmt::Write as _;

use crate::{
    frame::Frames,
    intern::Interns,
    types::FuncBody,
    value::{PathSeg, Value},
};

/// Borrowed rendering context: molding words needs the interner, molding
/// objects needs the frame store.
pub(crate) struct MoldCtx<'a> {
    pub interns: &'a Interns,
    pub frames: &'a Frames,
}

pub(crate) fn mold(value: &Value, ctx: &MoldCtx<'_>) -> String {
    let mut out = String::new();
    mold_into(&mut out, value, ctx);
    out
}

pub(crate) fn form(value: &Value, ctx: &MoldCtx<'_>) -> String {
    let mut out = String::new();
    form_into(&mut out, value, ctx);
    out
}

pub(crate) fn mold_into(out: &mut String, value: &Value, ctx: &MoldCtx<'_>) {
    match value {
        Value::None => out.push_str("none"),
        Value::Logic(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Decimal(d) => mold_decimal(out, *d),
        Value::Str(s) => {
            out.push('"');
            for c in s.tail_chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    other => out.push(other),
                }
            }
            out.push('"');
        }
        Value::Binary(b) => {
            out.push_str("#{");
            for (i, byte) in b.tail_bytes().iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{byte:02X}");
            }
            out.push('}');
        }
        Value::Block(b) => {
            out.push('[');
            mold_elements(out, &b.tail_values(), ctx);
            out.push(']');
        }
        Value::Paren(p) => {
            out.push('(');
            mold_elements(out, &p.tail_values(), ctx);
            out.push(')');
        }
        Value::Word(sym) => out.push_str(ctx.interns.resolve(*sym)),
        Value::SetWord(sym) => {
            out.push_str(ctx.interns.resolve(*sym));
            out.push(':');
        }
        Value::GetWord(sym) => {
            out.push(':');
            out.push_str(ctx.interns.resolve(*sym));
        }
        Value::LitWord(sym) => {
            out.push('\'');
            out.push_str(ctx.interns.resolve(*sym));
        }
        Value::Refinement(sym) => {
            out.push_str("--");
            out.push_str(ctx.interns.resolve(*sym));
        }
        Value::Path(data) => mold_path(out, &data.segments, ctx),
        Value::SetPath(data) => {
            mold_path(out, &data.segments, ctx);
            out.push(':');
        }
        Value::GetPath(data) => {
            out.push(':');
            mold_path(out, &data.segments, ctx);
        }
        Value::Func(f) => match &f.body {
            FuncBody::Block(body) => {
                out.push_str("fn [");
                let mut first = true;
                for param in &f.params {
                    if !first {
                        out.push(' ');
                    }
                    first = false;
                    out.push_str(ctx.interns.resolve(*param));
                }
                for refinement in &f.refinements {
                    if !first {
                        out.push(' ');
                    }
                    first = false;
                    out.push_str("--");
                    out.push_str(ctx.interns.resolve(refinement.name));
                    if let Some(vp) = refinement.value_param {
                        out.push(' ');
                        out.push_str(ctx.interns.resolve(vp));
                    }
                }
                out.push_str("] [");
                mold_elements(out, &body.tail_values(), ctx);
                out.push(']');
            }
            FuncBody::Native(_) | FuncBody::Action(_) | FuncBody::Host(_) => {
                let name = f.name.borrow().map_or("(anonymous)", |sym| ctx.interns.resolve(sym));
                let _ = write!(out, "make native! [{name}]");
            }
        },
        Value::Object(obj) => {
            out.push_str("make object! [");
            let frame = ctx.frames.get(obj.frame);
            let mut first = true;
            for (sym, field) in &frame.bindings {
                if !first {
                    out.push(' ');
                }
                first = false;
                out.push_str(ctx.interns.resolve(*sym));
                out.push_str(": ");
                mold_into(out, field, ctx);
            }
            out.push(']');
        }
        Value::Error(e) => {
            let _ = write!(
                out,
                "make error! [category: '{} id: '{} message: ",
                e.category, e.id
            );
            mold_into(out, &Value::Str(crate::types::StringSeries::new(&e.message)), ctx);
            out.push(']');
        }
    }
}

pub(crate) fn form_into(out: &mut String, value: &Value, ctx: &MoldCtx<'_>) {
    match value {
        Value::Str(s) => out.push_str(&s.tail_text()),
        Value::Binary(b) => {
            for byte in b.tail_bytes() {
                let _ = write!(out, "{byte:02X}");
            }
        }
        Value::Block(b) | Value::Paren(b) => {
            for (i, element) in b.tail_values().iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                form_into(out, element, ctx);
            }
        }
        Value::LitWord(sym) => out.push_str(ctx.interns.resolve(*sym)),
        Value::Object(obj) => {
            let frame = ctx.frames.get(obj.frame);
            for (i, (sym, field)) in frame.bindings.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(ctx.interns.resolve(*sym));
                out.push_str(": ");
                form_into(out, field, ctx);
            }
        }
        Value::Error(e) => {
            let _ = write!(out, "{e}");
        }
        other => mold_into(out, other, ctx),
    }
}

fn mold_elements(out: &mut String, values: &[Value], ctx: &MoldCtx<'_>) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        mold_into(out, value, ctx);
    }
}

fn mold_path(out: &mut String, segments: &[PathSeg], ctx: &MoldCtx<'_>) {
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        match seg {
            PathSeg::Word(sym) => out.push_str(ctx.interns.resolve(*sym)),
            PathSeg::Int(n) => {
                let _ = write!(out, "{n}");
            }
            PathSeg::Str(s) => {
                let _ = write!(out, "\"{s}\"");
            }
            PathSeg::Paren(p) => {
                out.push('(');
                mold_elements(out, &p.tail_values(), ctx);
                out.push(')');
            }
        }
    }
}

/// Shortest round-trip decimal rendering. Non-finite values have no literal
/// syntax and render as Rust's debug form.
fn mold_decimal(out: &mut String, d: f64) {
    if d.is_finite() {
        let mut buffer = ryu::Buffer::new();
        out.push_str(buffer.format(d));
    } else {
        let _ = write!(out, "{d}");
    }
}
