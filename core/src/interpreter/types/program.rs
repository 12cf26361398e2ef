//! Program contract

use std::sync::Arc;

use super::instruction::Instruction;

/// An ordered, immutable instruction sequence
pub type Block<I> = Arc<[I]>;

/// Source of named blocks
///
/// Shared by reference between an engine and every branch it forks, so it must
/// be safe to call from several threads at once.
pub trait Program: Send + Sync + 'static {
    /// Call arguments, passed unexamined to every resolution of a run
    type Args: Clone + Send + Sync + 'static;

    type Instr: Instruction;

    /// Resolve `name`, returning `None` when the program has no such block
    fn block(&self, name: &str, args: &Self::Args) -> Option<Block<Self::Instr>>;
}
