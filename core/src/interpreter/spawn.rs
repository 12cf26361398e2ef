//! Launching forked branches
//!
//! A split never waits on the branch it starts: join handles are dropped as
//! soon as the branch is launched.

use std::fmt;
use std::thread;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use super::errors::EngineError;

/// Which spawner a configuration asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnerKind {
    #[default]
    Thread,
    Tokio,
}

impl SpawnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnerKind::Thread => "thread",
            SpawnerKind::Tokio => "tokio",
        }
    }
}

/// How split branches are launched
#[derive(Clone)]
pub enum Spawner {
    /// One named OS thread per branch
    Thread { name: String },

    /// The blocking pool of a tokio runtime
    Tokio(Handle),
}

impl Spawner {
    pub fn thread(name: impl Into<String>) -> Self {
        Spawner::Thread { name: name.into() }
    }

    /// Spawner for the tokio runtime the caller is running in
    pub fn current_runtime() -> Result<Self, EngineError> {
        Handle::try_current()
            .map(Spawner::Tokio)
            .map_err(|e| EngineError::Config(format!("no tokio runtime available: {}", e)))
    }

    /// Build the spawner named by a configuration
    pub fn from_kind(kind: SpawnerKind, thread_name: &str) -> Result<Self, EngineError> {
        match kind {
            SpawnerKind::Thread => {
                check_thread_name(thread_name).map_err(EngineError::Config)?;
                Ok(Spawner::thread(thread_name))
            }
            SpawnerKind::Tokio => Spawner::current_runtime(),
        }
    }

    /// Launch `job` detached
    pub fn spawn<F>(&self, job: F) -> Result<(), EngineError>
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Spawner::Thread { name } => {
                check_thread_name(name).map_err(EngineError::Spawn)?;
                thread::Builder::new()
                    .name(name.clone())
                    .spawn(job)
                    .map_err(|e| EngineError::Spawn(e.to_string()))?;
            }
            Spawner::Tokio(handle) => {
                drop(handle.spawn_blocking(job));
            }
        }
        Ok(())
    }
}

/// OS thread names cannot carry NUL bytes; `thread::Builder` panics on them
pub(crate) fn check_thread_name(name: &str) -> Result<(), String> {
    if name.contains('\0') {
        return Err(format!("thread name {:?} contains a NUL byte", name));
    }
    Ok(())
}

impl Default for Spawner {
    fn default() -> Self {
        Spawner::thread("weave-branch")
    }
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spawner::Thread { name } => f.debug_struct("Thread").field("name", name).finish(),
            Spawner::Tokio(_) => f.write_str("Tokio"),
        }
    }
}
