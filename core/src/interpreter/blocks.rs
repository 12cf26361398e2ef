//! In-memory programs
//!
//! [`BlockMap`] is a `HashMap`-backed [`Program`] and [`Instr`] a ready-made
//! instruction type whose Data variant wraps a closure.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::types::{Block, Execute, Instruction, Op, Program};

/* ===================== Instructions ===================== */

#[derive(Clone)]
pub enum Instr {
    Data { label: String, op: Arc<dyn Execute> },
    Call { block: String },
    Jump { next_step: usize },
    Split { next_step: usize },
}

impl Instr {
    pub fn data<F>(label: impl Into<String>, op: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Instr::Data {
            label: label.into(),
            op: Arc::new(op),
        }
    }

    pub fn call(block: impl Into<String>) -> Self {
        Instr::Call {
            block: block.into(),
        }
    }

    pub fn jump(next_step: usize) -> Self {
        Instr::Jump { next_step }
    }

    pub fn split(next_step: usize) -> Self {
        Instr::Split { next_step }
    }
}

impl Instruction for Instr {
    fn op(&self) -> Op<'_> {
        match self {
            Instr::Data { op, .. } => Op::Data(&**op),
            Instr::Call { block } => Op::Call(block),
            Instr::Jump { next_step } => Op::Jump(*next_step),
            Instr::Split { next_step } => Op::Split(*next_step),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Data { label, .. } => write!(f, "data {}", label),
            Instr::Call { block } => write!(f, "call {}", block),
            Instr::Jump { next_step } => write!(f, "jump {}", next_step),
            Instr::Split { next_step } => write!(f, "split {}", next_step),
        }
    }
}

impl fmt::Debug for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/* ===================== Program ===================== */

/// Named blocks held in memory
pub struct BlockMap<I> {
    blocks: HashMap<String, Block<I>>,
}

impl<I: Instruction> BlockMap<I> {
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
        }
    }

    /// Add or replace a block
    pub fn with_block(mut self, name: impl Into<String>, instructions: Vec<I>) -> Self {
        self.insert(name, instructions);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, instructions: Vec<I>) {
        self.blocks.insert(name.into(), Arc::from(instructions));
    }

    pub fn get(&self, name: &str) -> Option<&Block<I>> {
        self.blocks.get(name)
    }

    /// Block names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.blocks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl<I: Instruction> Default for BlockMap<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Instruction> From<HashMap<&str, Vec<I>>> for BlockMap<I> {
    fn from(blocks: HashMap<&str, Vec<I>>) -> Self {
        blocks
            .into_iter()
            .fold(BlockMap::new(), |map, (name, instructions)| {
                map.with_block(name, instructions)
            })
    }
}

impl<I: Instruction> Program for BlockMap<I> {
    type Args = ();
    type Instr = I;

    fn block(&self, name: &str, _args: &()) -> Option<Block<I>> {
        self.blocks.get(name).cloned()
    }
}
