//! Missing-block resolver tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::helpers::Trace;
use crate::interpreter::{Block, BlockMap, Engine, EngineError, Instr, Stop};

#[test]
fn test_default_resolver_aborts_on_unknown_entry_block() {
    let program = BlockMap::<Instr>::new();

    let mut engine = Engine::new(program);
    let err = engine.run("ghost", (), 0).unwrap_err();

    assert_eq!(
        err,
        EngineError::MissingBlock {
            name: "ghost".to_string()
        }
    );
    assert_eq!(err.to_string(), "failed to find block named 'ghost'");
}

#[test]
fn test_default_resolver_aborts_on_unknown_call_target() {
    let trace = Trace::new();
    let program = BlockMap::new().with_block(
        "main",
        vec![trace.emit("before"), Instr::call("nowhere"), trace.emit("after")],
    );

    let mut engine = Engine::new(program);
    let err = engine.run("main", (), 0).unwrap_err();

    assert!(matches!(err, EngineError::MissingBlock { ref name } if name == "nowhere"));
    assert_eq!(trace.lines(), vec!["before"]);
}

#[test]
fn test_custom_resolver_substitutes_block() {
    let trace = Trace::new();
    let log = trace.clone();
    let program = BlockMap::<Instr>::new();

    let mut engine = Engine::new(program).with_missing_block_resolver(
        move |name: &str| -> Result<Block<Instr>, EngineError> {
            Ok(Arc::from(vec![log.emit(&format!("missing:{}", name))]))
        },
    );
    let report = engine.run("ghost", (), 0).unwrap();

    assert_eq!(trace.lines(), vec!["missing:ghost"]);
    assert_eq!(report.stop, Stop::Exhausted);
}

#[test]
fn test_custom_resolver_empty_block_returns_to_caller() {
    let trace = Trace::new();
    let program = BlockMap::new().with_block(
        "main",
        vec![Instr::call("optional"), trace.emit("after")],
    );

    let mut engine = Engine::new(program)
        .with_missing_block_resolver(|_: &str| -> Result<Block<Instr>, EngineError> {
            Ok(Arc::from(Vec::new()))
        });
    let report = engine.run("main", (), 0).unwrap();

    assert_eq!(trace.lines(), vec!["after"]);
    assert_eq!(report.steps, 2);
}

#[test]
fn test_custom_resolver_can_raise_its_own_error() {
    let program = BlockMap::new().with_block("main", vec![Instr::call("plugin")]);

    let mut engine = Engine::new(program).with_missing_block_resolver(
        |name: &str| -> Result<Block<Instr>, EngineError> {
            Err(EngineError::resolver(name, "plugins are disabled"))
        },
    );
    let err = engine.run("main", (), 0).unwrap_err();

    assert_eq!(
        err.to_string(),
        "resolver aborted on block 'plugin': plugins are disabled"
    );
}

#[test]
fn test_resolver_only_consulted_for_missing_blocks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let program = BlockMap::new()
        .with_block("main", vec![Instr::call("known"), Instr::call("unknown")])
        .with_block("known", vec![]);

    let mut engine = Engine::new(program).with_missing_block_resolver(
        move |_: &str| -> Result<Block<Instr>, EngineError> {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::from(Vec::new()))
        },
    );
    engine.run("main", (), 0).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_substitute_block_can_call_back_into_program() {
    let trace = Trace::new();
    let program = BlockMap::new().with_block("fallback", vec![trace.emit("fallback")]);

    let mut engine = Engine::new(program).with_missing_block_resolver(
        |_: &str| -> Result<Block<Instr>, EngineError> {
            Ok(Arc::from(vec![Instr::call("fallback")]))
        },
    );
    engine.run("anything", (), 0).unwrap();

    assert_eq!(trace.lines(), vec!["fallback"]);
}

#[test]
fn test_aborted_nested_call_leaves_no_frames() {
    let program = BlockMap::new()
        .with_block("main", vec![Instr::call("outer"), Instr::jump(0)])
        .with_block("outer", vec![Instr::call("inner"), Instr::jump(0)])
        .with_block("inner", vec![Instr::call("ghost")]);

    let mut engine = Engine::new(program);
    let err = engine.run("main", (), 0).unwrap_err();

    assert!(matches!(err, EngineError::MissingBlock { ref name } if name == "ghost"));
    assert_eq!(engine.depth(), 0);
}
