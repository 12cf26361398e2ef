//! Engine state
//!
//! The engine holds everything one thread of control needs:
//! - frames: stack of resume points
//! - steps: dispatched instruction count
//! - halt / resolver / spawner: behaviour shared with forked branches

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::errors::EngineError;
use super::halt::HaltPredicate;
use super::resolver::{FailOnMissing, MissingBlockResolver};
use super::spawn::Spawner;
use super::types::{FrameStack, Program};
use crate::config::EngineConfig;

/* ===================== Engine ===================== */

/// Flow-control engine over a caller-supplied program
pub struct Engine<P: Program> {
    pub(crate) program: Arc<P>,

    pub(crate) frames: FrameStack<P::Instr>,

    /// Never decreases over the engine's lifetime
    pub(crate) steps: u64,

    pub(crate) halt: HaltPredicate,

    pub(crate) resolver: Arc<dyn MissingBlockResolver<P::Instr>>,

    pub(crate) spawner: Spawner,

    /// Identifies this engine in logs
    pub(crate) branch_id: Uuid,
}

impl<P: Program> Engine<P> {
    /// Create an engine with no step limit, no halt conditions and the
    /// fail-fast missing-block policy
    pub fn new(program: P) -> Self {
        Self::shared(Arc::new(program))
    }

    /// Create an engine over a program that is already shared
    pub fn shared(program: Arc<P>) -> Self {
        Engine {
            program,
            frames: FrameStack::new(),
            steps: 0,
            halt: HaltPredicate::new(),
            resolver: Arc::new(FailOnMissing),
            spawner: Spawner::default(),
            branch_id: Uuid::new_v4(),
        }
    }

    /// Create an engine configured from an [`EngineConfig`]
    ///
    /// A `tokio` spawner requires the caller to be inside a tokio runtime.
    pub fn from_config(program: P, config: &EngineConfig) -> Result<Self, EngineError> {
        let spawner = Spawner::from_kind(config.spawner, &config.thread_name)?;
        Ok(Self::new(program)
            .with_max_steps(config.max_steps)?
            .with_spawner(spawner))
    }

    /* ===================== Configuration ===================== */

    /// Limit the number of instructions this engine dispatches
    ///
    /// `0` means run until completion. Each forked branch gets its own budget
    /// of the same size.
    pub fn with_max_steps(mut self, max_steps: i64) -> Result<Self, EngineError> {
        self.halt.set_max_steps(max_steps)?;
        Ok(self)
    }

    /// Add a halt condition. May be called multiple times; any true condition
    /// stops the run
    pub fn with_halt_if<F>(mut self, halt_if: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.halt.push_condition(halt_if);
        self
    }

    /// Replace the policy for blocks the program cannot resolve
    pub fn with_missing_block_resolver<R>(mut self, resolver: R) -> Self
    where
        R: MissingBlockResolver<P::Instr> + 'static,
    {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replace how split branches are launched
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    /* ===================== Accessors ===================== */

    /// Instructions dispatched over this engine's lifetime
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn max_steps(&self) -> u64 {
        self.halt.max_steps()
    }

    pub fn branch_id(&self) -> Uuid {
        self.branch_id
    }

    /// Frames left on the stack (non-zero only after a halted run)
    pub fn depth(&self) -> usize {
        self.frames.depth()
    }

    /* ===================== Forking ===================== */

    /// Sibling engine for a split: shares program, halt conditions, resolver
    /// and spawner; starts with an empty stack and zero steps
    pub(crate) fn fork(&self) -> Self {
        Engine {
            program: Arc::clone(&self.program),
            frames: FrameStack::new(),
            steps: 0,
            halt: self.halt.clone(),
            resolver: Arc::clone(&self.resolver),
            spawner: self.spawner.clone(),
            branch_id: Uuid::new_v4(),
        }
    }
}

impl<P: Program> fmt::Debug for Engine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("branch_id", &self.branch_id)
            .field("steps", &self.steps)
            .field("halt", &self.halt)
            .field("frames", &self.frames)
            .field("spawner", &self.spawner)
            .finish()
    }
}

/* ===================== Run Result ===================== */

/// Result of one pass through the dispatch loop for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Frame exhausted, pop the next one
    Continue,
    /// Halt predicate fired
    Halt,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// Frame stack emptied
    Exhausted,
    /// Halt predicate became true before the next dispatch
    Halted,
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Instructions dispatched during this run
    pub steps: u64,
    pub stop: Stop,
}
