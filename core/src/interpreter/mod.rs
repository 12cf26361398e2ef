//! # Flow-control engine
//!
//! Drives a caller-supplied [`Program`]: blocks of instructions are dispatched
//! in order, diverting on Call, Jump and Split. What Data instructions actually
//! do is entirely up to the program.
//!
//! ## Core Principles
//!
//! 1. **Stack-driven execution**: return points live in a [`FrameStack`], no recursion
//! 2. **Bounded runs**: a [`HaltPredicate`] is checked before every dispatch
//! 3. **Detached forks**: Split launches a sibling [`Engine`] that is never joined
//! 4. **Local failures**: an error aborts only the engine it occurred in
//!
//! ```no_run
//! use weave_core::interpreter::{BlockMap, Engine, Instr};
//!
//! let program = BlockMap::new()
//!     .with_block("main", vec![Instr::data("hello", || println!("hello")), Instr::call("sub")])
//!     .with_block("sub", vec![Instr::data("world", || println!("world"))]);
//!
//! let mut engine = Engine::new(program).with_max_steps(1000)?;
//! engine.run("main", (), 0)?;
//! # Ok::<(), weave_core::interpreter::EngineError>(())
//! ```

pub mod blocks;
pub mod errors;
pub mod exec_loop;
pub mod halt;
pub mod resolver;
pub mod spawn;
pub mod types;
pub mod vm;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use blocks::{BlockMap, Instr};
pub use errors::EngineError;
pub use halt::{HaltCondition, HaltPredicate};
pub use resolver::{FailOnMissing, MissingBlockResolver};
pub use spawn::{Spawner, SpawnerKind};
pub use types::{Block, Execute, Frame, FrameStack, Instruction, InstructionKind, Op, Program};
pub use vm::{Engine, RunReport, Stop};
