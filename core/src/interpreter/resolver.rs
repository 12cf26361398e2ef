//! Missing-block resolution

use super::errors::EngineError;
use super::types::Block;

/// Invoked when the program has no block for a requested name
///
/// Returns a substitute block to run in its place, or an error that aborts the
/// current branch. Shared by every branch forked from the engine.
pub trait MissingBlockResolver<I>: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Block<I>, EngineError>;
}

impl<I, F> MissingBlockResolver<I> for F
where
    F: Fn(&str) -> Result<Block<I>, EngineError> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Result<Block<I>, EngineError> {
        self(name)
    }
}

/// Default policy: abort the branch, naming the missing block
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnMissing;

impl<I> MissingBlockResolver<I> for FailOnMissing {
    fn resolve(&self, name: &str) -> Result<Block<I>, EngineError> {
        Err(EngineError::MissingBlock {
            name: name.to_string(),
        })
    }
}
