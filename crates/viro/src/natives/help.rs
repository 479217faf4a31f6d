//! The `help` native: writes a function's documentation record through the
//! output writer. Formatting beyond this plain record belongs to the host.

use crate::{
    error::EvalResult,
    eval::{Evaluator, Invocation},
    value::Value,
};

use super::{DEF, NativeDef};

pub(crate) fn register(ev: &mut Evaluator) {
    super::register(ev, &NativeDef {
        name: "help",
        doc: "Writes the documentation record of a function (or the type of any other value).",
        params: &["topic"],
        f: help,
        ..DEF
    });
}

fn help(ev: &mut Evaluator, inv: Invocation) -> EvalResult<Value> {
    let resolved = match inv.arg(0) {
        Value::Word(sym) | Value::LitWord(sym) => match ev.frames.resolve(ev.current, *sym) {
            Some(v) => v,
            None => {
                let line = format!("{} has no value", ev.interns.resolve(*sym));
                ev.print.write(&line);
                ev.print.push('\n');
                return Ok(Value::None);
            }
        },
        other => other.clone(),
    };
    match &resolved {
        Value::Func(f) => {
            let name = f
                .name
                .borrow()
                .map_or_else(|| "(anonymous)".to_owned(), |sym| ev.interns.resolve(sym).to_owned());
            ev.print.write(&format!("{name} is a function."));
            ev.print.push('\n');
            if let Some(doc) = &f.doc {
                ev.print.write(doc);
                ev.print.push('\n');
            }
            if !f.params.is_empty() {
                let params: Vec<&str> = f.params.iter().map(|p| ev.interns.resolve(*p)).collect();
                ev.print.write(&format!("params: {}", params.join(" ")));
                ev.print.push('\n');
            }
            if !f.refinements.is_empty() {
                let refinements: Vec<String> = f
                    .refinements
                    .iter()
                    .map(|r| {
                        let mut text = format!("--{}", ev.interns.resolve(r.name));
                        if let Some(vp) = r.value_param {
                            text.push(' ');
                            text.push_str(ev.interns.resolve(vp));
                        }
                        text
                    })
                    .collect();
                ev.print.write(&format!("refinements: {}", refinements.join(" ")));
                ev.print.push('\n');
            }
        }
        other => {
            let line = format!("{}: {}", other.ty(), ev.mold_value(other));
            ev.print.write(&line);
            ev.print.push('\n');
        }
    }
    Ok(Value::None)
}
