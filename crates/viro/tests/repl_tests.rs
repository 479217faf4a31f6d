//! Session persistence and the host-facing hooks: print capture, tracing,
//! globals, and host function registration.

use viro::{
    CollectStringPrint, Datum, ErrorId, Evaluator, RecordingTracer, ReplSession, TraceEvent,
};

// =============================================================================
// 1. Session persistence
// =============================================================================

#[test]
fn variables_persist_across_lines() {
    let mut session = ReplSession::new();
    session.execute("x: 42").unwrap();
    assert_eq!(session.execute("x + 1").unwrap(), Datum::Integer(43));
}

#[test]
fn functions_persist_across_lines() {
    let mut session = ReplSession::new();
    session.execute("double: fn [n] [n * 2]").unwrap();
    assert_eq!(session.execute("double 21").unwrap(), Datum::Integer(42));
}

#[test]
fn series_buffers_persist_across_lines() {
    let mut session = ReplSession::new();
    session.execute("s: [1]").unwrap();
    session.execute("append s 2").unwrap();
    assert_eq!(session.execute("length? s").unwrap(), Datum::Integer(2));
}

#[test]
fn errors_do_not_tear_down_the_session() {
    let mut session = ReplSession::new();
    session.execute("x: 7").unwrap();
    let err = session.execute("10 / 0").unwrap_err();
    assert_eq!(err.id, ErrorId::DivZero);
    assert_eq!(session.execute("x").unwrap(), Datum::Integer(7));
}

#[test]
fn closures_survive_across_lines() {
    let mut session = ReplSession::new();
    session.execute("adder: fn [n] [fn [m] [m + n]]").unwrap();
    session.execute("add3: adder 3").unwrap();
    assert_eq!(session.execute("add3 4").unwrap(), Datum::Integer(7));
}

// =============================================================================
// 2. Print capture
// =============================================================================

#[test]
fn print_and_probe_write_through_the_installed_writer() {
    let collect = CollectStringPrint::default();
    let mut ev = Evaluator::new();
    ev.set_print(Box::new(collect.clone()));
    ev.do_source("print \"hello\"", "test").unwrap();
    assert_eq!(collect.take(), "hello\n");
    let result = ev.do_source("probe [1 2]", "test").unwrap();
    assert_eq!(collect.take(), "[1 2]\n");
    assert_eq!(
        result,
        Datum::Block(vec![Datum::Integer(1), Datum::Integer(2)]),
        "probe returns its value"
    );
}

#[test]
fn print_forms_its_argument() {
    let collect = CollectStringPrint::default();
    let mut ev = Evaluator::new();
    ev.set_print(Box::new(collect.clone()));
    ev.do_source("print [1 \"a\" #{FF}]", "test").unwrap();
    assert_eq!(collect.take(), "1 a FF\n");
}

// =============================================================================
// 3. Tracing
// =============================================================================

#[test]
fn the_tracer_sees_calls_and_returns() {
    let tracer = RecordingTracer::default();
    let mut ev = Evaluator::new();
    ev.set_tracer(Box::new(tracer.clone()));
    ev.do_source("f: fn [] [1]\nf", "test").unwrap();
    let events = tracer.events();
    assert!(
        events.iter().any(|e| matches!(e, TraceEvent::Call { name: Some(n), .. } if n == "f")),
        "expected a call event for f, got: {events:?}"
    );
    assert!(
        events.iter().any(|e| matches!(e, TraceEvent::Return { .. })),
        "expected a return event"
    );
}

#[test]
fn the_tracer_sees_errors() {
    let tracer = RecordingTracer::default();
    let mut ev = Evaluator::new();
    ev.set_tracer(Box::new(tracer.clone()));
    ev.do_source("1 / 0", "test").unwrap_err();
    assert!(
        tracer
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::Error { id } if id == "div-zero")),
        "expected an error event"
    );
}

// =============================================================================
// 4. Globals and host functions
// =============================================================================

#[test]
fn globals_cross_the_boundary_as_data() {
    let mut ev = Evaluator::new();
    ev.set_global("answer", &Datum::Integer(42)).unwrap();
    assert_eq!(ev.do_source("answer", "test").unwrap(), Datum::Integer(42));
    ev.do_source("greeting: \"hi\"", "test").unwrap();
    assert_eq!(ev.get_global("greeting"), Some(Datum::String("hi".to_owned())));
    assert_eq!(ev.get_global("nothing-bound-here"), None);
}

#[test]
fn host_functions_are_callable_like_natives() {
    let mut ev = Evaluator::new();
    ev.register_host_fn("add-ints", &["a", "b"], |args| {
        match (&args[0], &args[1]) {
            (Datum::Integer(a), Datum::Integer(b)) => Ok(Datum::Integer(a + b)),
            _ => Err("add-ints needs integers".to_owned()),
        }
    });
    assert_eq!(ev.do_source("add-ints 2 3", "test").unwrap(), Datum::Integer(5));
    assert_eq!(
        ev.do_source("add-ints 2 add-ints 3 4", "test").unwrap(),
        Datum::Integer(9),
        "host functions compose with the stream evaluator"
    );
}

#[test]
fn host_function_errors_surface_as_script_errors() {
    let mut ev = Evaluator::new();
    ev.register_host_fn("fail", &[], |_| Err("host failure".to_owned()));
    let err = ev.do_source("fail", "test").unwrap_err();
    assert_eq!(err.id, ErrorId::InvalidOperation);
    assert!(err.message.contains("host failure"), "message: {}", err.message);
}
