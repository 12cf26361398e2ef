//! Instruction contract
//!
//! Instructions are owned by the caller's program. The engine only ever looks at
//! them through [`Instruction::op`], which exposes one of the four control-flow
//! capabilities the engine understands.

use std::fmt;
use std::str::FromStr;

use super::super::errors::EngineError;

/* ===================== Tags ===================== */

/// Instruction tag
///
/// The closed set of instruction variants. Raw tags outside the set are
/// rejected with [`EngineError::UnknownInstruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InstructionKind {
    Data = 1,
    Call = 2,
    Jump = 3,
    Split = 4,
}

impl InstructionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionKind::Data => "data",
            InstructionKind::Call => "call",
            InstructionKind::Jump => "jump",
            InstructionKind::Split => "split",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for InstructionKind {
    type Error = EngineError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(InstructionKind::Data),
            2 => Ok(InstructionKind::Call),
            3 => Ok(InstructionKind::Jump),
            4 => Ok(InstructionKind::Split),
            other => Err(EngineError::UnknownInstruction(other.to_string())),
        }
    }
}

impl FromStr for InstructionKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" => Ok(InstructionKind::Data),
            "call" => Ok(InstructionKind::Call),
            "jump" => Ok(InstructionKind::Jump),
            "split" => Ok(InstructionKind::Split),
            other => Err(EngineError::UnknownInstruction(other.to_string())),
        }
    }
}

/* ===================== Data Operations ===================== */

/// A zero-argument side-effecting operation
///
/// Implemented for every `Fn()` closure that can be shared across threads.
pub trait Execute: Send + Sync {
    fn execute(&self);
}

impl<F> Execute for F
where
    F: Fn() + Send + Sync,
{
    fn execute(&self) {
        self()
    }
}

/* ===================== Instruction View ===================== */

/// What an instruction asks the engine to do
#[derive(Clone, Copy)]
pub enum Op<'a> {
    /// Run a domain operation, then advance to the next instruction
    Data(&'a dyn Execute),
    /// Push a return point and continue at index 0 of the named block
    Call(&'a str),
    /// Continue at this zero-based index of the current block
    Jump(usize),
    /// Fork a branch starting at this zero-based index of the current block
    Split(usize),
}

impl Op<'_> {
    pub fn kind(&self) -> InstructionKind {
        match self {
            Op::Data(_) => InstructionKind::Data,
            Op::Call(_) => InstructionKind::Call,
            Op::Jump(_) => InstructionKind::Jump,
            Op::Split(_) => InstructionKind::Split,
        }
    }
}

impl fmt::Debug for Op<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Data(_) => f.write_str("Data(..)"),
            Op::Call(name) => f.debug_tuple("Call").field(name).finish(),
            Op::Jump(step) => f.debug_tuple("Jump").field(step).finish(),
            Op::Split(step) => f.debug_tuple("Split").field(step).finish(),
        }
    }
}

/// Instruction contract
///
/// `Display` provides the human-readable description used in logs and by
/// `weave check`.
pub trait Instruction: fmt::Display + Send + Sync + 'static {
    fn op(&self) -> Op<'_>;

    fn kind(&self) -> InstructionKind {
        self.op().kind()
    }
}
