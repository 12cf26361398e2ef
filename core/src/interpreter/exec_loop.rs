//! Core execution loop
//!
//! ## Function Organization
//! 1. run() - Top-level driver (resolves the entry block, pops frames)
//! 2. dispatch() - Runs one frame until it is exhausted or the halt predicate fires
//! 3. split() - Launches a forked branch

use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use super::errors::EngineError;
use super::types::{Block, Frame, Instruction, Op, Program};
use super::vm::{Engine, RunReport, Step, Stop};

/* ===================== Public API ===================== */

impl<P: Program> Engine<P> {
    /// Run from `start_at` in block `block_name` until the frame stack empties
    /// or the halt predicate fires
    ///
    /// Blocks the calling thread. Branches forked along the way keep running
    /// after this returns. Frames left behind by an earlier halted run are
    /// discarded.
    pub fn run(
        &mut self,
        block_name: &str,
        args: P::Args,
        start_at: usize,
    ) -> Result<RunReport, EngineError> {
        let block = resolve_block(self, block_name, &args)?;
        run_frame(self, Frame::new(block_name, block, start_at), &args)
    }
}

/// Drive the engine starting from `frame`
///
/// Split branches enter here directly so they reuse the block already resolved
/// by their parent.
pub(crate) fn run_frame<P: Program>(
    engine: &mut Engine<P>,
    frame: Frame<P::Instr>,
    args: &P::Args,
) -> Result<RunReport, EngineError> {
    let span = tracing::debug_span!("run", branch = %engine.branch_id);
    let _guard = span.enter();

    let started_at = engine.steps;
    engine.frames.clear();
    debug!(block = %frame.block_name, start_at = frame.index, "run started");
    engine.frames.push(frame);

    let stop = loop {
        let Some(frame) = engine.frames.pop_live() else {
            break Stop::Exhausted;
        };

        match dispatch(engine, frame, args) {
            Ok(Step::Continue) => continue,
            Ok(Step::Halt) => break Stop::Halted,
            Err(err) => {
                // An aborted run leaves no return points behind
                engine.frames.clear();
                return Err(err);
            }
        }
    };

    let report = RunReport {
        steps: engine.steps - started_at,
        stop,
    };
    debug!(steps = report.steps, stop = ?report.stop, "run finished");

    Ok(report)
}

/* ===================== Dispatch ===================== */

/// Where control goes after an instruction
enum Transfer {
    Next,
    Call(String),
    Jump(usize),
    Split(usize),
}

/// Dispatch instructions of `frame` in order until its block is exhausted or
/// the halt predicate fires
///
/// Calls swap the current block in place after pushing a return frame, so the
/// callee's exhaustion falls back into the caller through the frame stack.
fn dispatch<P: Program>(
    engine: &mut Engine<P>,
    frame: Frame<P::Instr>,
    args: &P::Args,
) -> Result<Step, EngineError> {
    let Frame {
        mut block_name,
        mut block,
        mut index,
    } = frame;

    while index < block.len() {
        if engine.halt.should_halt(engine.steps) {
            // Keep the exact resume point on the stack
            engine.frames.push(Frame::new(block_name, block, index));
            return Ok(Step::Halt);
        }

        let instr = &block[index];
        engine.steps += 1;
        trace!(step = engine.steps, block = %block_name, index, instr = %instr, "dispatch");

        let transfer = match instr.op() {
            Op::Data(op) => {
                op.execute();
                Transfer::Next
            }
            Op::Call(target) => Transfer::Call(target.to_string()),
            Op::Jump(next_step) => Transfer::Jump(next_step),
            Op::Split(next_step) => Transfer::Split(next_step),
        };

        match transfer {
            Transfer::Next => index += 1,

            Transfer::Call(target) => {
                let callee = resolve_block(engine, &target, args)?;
                debug!(from = %block_name, to = %target, return_to = index + 1, "call");
                let caller_name = std::mem::replace(&mut block_name, target);
                let caller_block = std::mem::replace(&mut block, callee);
                engine
                    .frames
                    .push(Frame::new(caller_name, caller_block, index + 1));
                index = 0;
            }

            // Absolute target; past the end exhausts the frame
            Transfer::Jump(next_step) => {
                debug!(block = %block_name, from = index, to = next_step, "jump");
                index = next_step;
            }

            Transfer::Split(next_step) => {
                split(engine, &block_name, &block, next_step, args);
                index += 1;
            }
        }
    }

    Ok(Step::Continue)
}

/* ===================== Blocks ===================== */

/// Resolve a block through the program, falling back to the resolver
fn resolve_block<P: Program>(
    engine: &Engine<P>,
    block_name: &str,
    args: &P::Args,
) -> Result<Block<P::Instr>, EngineError> {
    if let Some(block) = engine.program.block(block_name, args) {
        return Ok(block);
    }

    warn!(block = %block_name, "block not found, consulting resolver");
    engine.resolver.resolve(block_name)
}

/* ===================== Split ===================== */

/// Start a detached branch at `start_at` of the current block
///
/// The branch's outcome is only ever logged: nothing flows back to the parent.
fn split<P: Program>(
    engine: &Engine<P>,
    block_name: &str,
    block: &Block<P::Instr>,
    start_at: usize,
    args: &P::Args,
) {
    let mut branch = engine.fork();
    let parent = engine.branch_id;
    let frame = Frame::new(block_name, Arc::clone(block), start_at);
    let args = args.clone();

    debug!(branch = %branch.branch_id, block = %block_name, start_at, "split");

    let launched = engine.spawner.spawn(move || {
        if let Err(err) = run_frame(&mut branch, frame, &args) {
            error!(branch = %branch.branch_id, %parent, error = %err, "branch aborted");
        }
    });

    if let Err(err) = launched {
        error!(%parent, error = %err, "split failed to launch branch");
    }
}
