//! Type definitions for the engine
//!
//! - Instruction contract (Instruction, Op, InstructionKind)
//! - Program contract (Program, Block)
//! - Frames (Frame, FrameStack)

pub mod frame;
pub mod instruction;
pub mod program;

pub use frame::{Frame, FrameStack};
pub use instruction::{Execute, Instruction, InstructionKind, Op};
pub use program::{Block, Program};
