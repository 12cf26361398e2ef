//! Halt predicate composition
//!
//! The predicate has two parts:
//! - a step budget, private to each engine (0 = unlimited)
//! - caller conditions, composed with OR and shared by every forked branch
//!
//! Conditions are evaluated newest first, then the budget.

use std::fmt;
use std::sync::Arc;

use super::errors::EngineError;

/// A caller-supplied halt condition
pub type HaltCondition = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Clone, Default)]
pub struct HaltPredicate {
    max_steps: u64,
    conditions: Option<HaltCondition>,
}

impl HaltPredicate {
    /// Unlimited budget, no conditions
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the step budget. `0` means no limit
    pub fn set_max_steps(&mut self, max_steps: i64) -> Result<(), EngineError> {
        if max_steps < 0 {
            return Err(EngineError::InvalidMaxSteps(max_steps));
        }
        self.max_steps = max_steps as u64;
        Ok(())
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Compose `cond` in front of the existing conditions
    pub fn push_condition<F>(&mut self, cond: F)
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        let next: HaltCondition = match self.conditions.take() {
            Some(prev) => Arc::new(move || cond() || prev()),
            None => Arc::new(cond),
        };
        self.conditions = Some(next);
    }

    /// True when the engine must stop before dispatching its next step
    pub fn should_halt(&self, steps: u64) -> bool {
        if let Some(cond) = &self.conditions {
            if cond() {
                return true;
            }
        }
        self.max_steps > 0 && steps >= self.max_steps
    }
}

impl fmt::Debug for HaltPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HaltPredicate")
            .field("max_steps", &self.max_steps)
            .field("has_conditions", &self.conditions.is_some())
            .finish()
    }
}
