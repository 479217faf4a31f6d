//! Minimal script runner and line loop over the viro core.
//!
//! `viro script.viro` evaluates a file and prints the molded result;
//! with no argument, lines are read from stdin against one persistent
//! session. Errors print as `** <Category> Error` reports with their
//! `near:` and `where:` context.

use std::{
    env, fs,
    io::{self, BufRead, Write},
    process::ExitCode,
};

use viro::{Datum, Error, ReplSession};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match args.get(1) {
        Some(path) => run_file(path),
        None => run_lines(),
    }
}

fn run_file(path: &str) -> ExitCode {
    let code = match fs::read_to_string(path) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut session = ReplSession::new();
    match session.evaluator().do_source(&code, path) {
        Ok(value) => {
            println!("{}", display(&value));
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run_lines() -> ExitCode {
    let mut session = ReplSession::new();
    let stdin = io::stdin();
    loop {
        print!("viro> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return ExitCode::SUCCESS,
            Ok(_) => {}
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
        if line.trim().is_empty() {
            continue;
        }
        match session.execute(&line) {
            Ok(value) => println!("== {}", display(&value)),
            Err(err) => report(&err),
        }
    }
}

fn report(err: &Error) {
    eprintln!("{err}");
}

fn display(value: &Datum) -> String {
    match value {
        Datum::None => "none".to_owned(),
        Datum::Logic(b) => b.to_string(),
        Datum::Integer(n) => n.to_string(),
        Datum::Decimal(d) => d.to_string(),
        Datum::String(s) => format!("\"{s}\""),
        Datum::Binary(bytes) => {
            let pairs: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("#{{{}}}", pairs.join(" "))
        }
        Datum::Block(items) => {
            let parts: Vec<String> = items.iter().map(display).collect();
            format!("[{}]", parts.join(" "))
        }
        Datum::Paren(items) => {
            let parts: Vec<String> = items.iter().map(display).collect();
            format!("({})", parts.join(" "))
        }
        Datum::Word(w) => w.clone(),
        Datum::SetWord(w) => format!("{w}:"),
        Datum::GetWord(w) => format!(":{w}"),
        Datum::LitWord(w) => format!("'{w}"),
        Datum::Refinement(w) => format!("--{w}"),
        Datum::Path(segs) | Datum::SetPath(segs) | Datum::GetPath(segs) => segs.join("."),
        Datum::Function { name } => {
            format!("fn {}", name.clone().unwrap_or_else(|| "(anonymous)".to_owned()))
        }
        Datum::Object(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(name, v)| format!("{name}: {}", display(v)))
                .collect();
            format!("make object! [{}]", parts.join(" "))
        }
        Datum::Error(e) => e.to_string(),
    }
}
