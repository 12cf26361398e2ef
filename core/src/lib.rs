pub mod cli;
pub mod config;
pub mod interpreter;
pub mod script;

// Re-export main types
pub use config::EngineConfig;
pub use interpreter::{
    Block, BlockMap, Engine, EngineError, Instr, Instruction, InstructionKind, Op, Program,
    RunReport, Stop,
};
