//! Engine errors
//!
//! Every error is local to the engine that produced it. A forked branch logs
//! its own failure and never hands it to its parent.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Step budget below zero
    #[error("max_steps must be >= 0 (0 means 'until completion'), got {0}")]
    InvalidMaxSteps(i64),

    /// Default resolver policy for an unknown block
    #[error("failed to find block named '{name}'")]
    MissingBlock { name: String },

    /// A custom resolver refused to supply a block
    #[error("resolver aborted on block '{name}': {reason}")]
    Resolver { name: String, reason: String },

    /// An instruction tag outside Data/Call/Jump/Split
    #[error("don't know how to handle instruction type '{0}'")]
    UnknownInstruction(String),

    /// Invalid or unreadable engine configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A forked branch could not be started
    #[error("failed to spawn branch: {0}")]
    Spawn(String),
}

impl EngineError {
    /// Convenience constructor for custom resolvers
    pub fn resolver(name: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Resolver {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}
