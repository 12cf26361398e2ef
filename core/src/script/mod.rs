//! Reference program format
//!
//! A small declarative program, loaded from TOML or JSON, used to drive the
//! engine from the command line:
//!
//! ```toml
//! [[blocks.main]]
//! op = "emit"
//! text = "hello"
//!
//! [[blocks.main]]
//! op = "call"
//! block = "sub"
//! ```
//!
//! Supported ops: emit, sleep, call, jump, split.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interpreter::{BlockMap, Instr};


/* ===================== Errors ===================== */

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read program {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML program: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON program: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported program format for {} (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
}

/* ===================== Program Definition ===================== */

/// One instruction of a reference program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ScriptOp {
    /// Write a line to the output sink
    Emit { text: String },
    /// Block the branch for `ms` milliseconds
    Sleep { ms: u64 },
    Call { block: String },
    Jump { to: usize },
    Split { to: usize },
}

/// Destination for `emit` lines
pub type Sink = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub blocks: BTreeMap<String, Vec<ScriptOp>>,
}

/// A call to a block the script does not define
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedCall {
    pub block: String,
    pub index: usize,
    pub target: String,
}

impl Script {
    pub fn from_toml_str(source: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a script, choosing the format by file extension
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let extension = path.extension().and_then(|e| e.to_str());
        if !matches!(extension, Some("toml") | Some("json")) {
            return Err(ScriptError::UnsupportedFormat(path.to_path_buf()));
        }

        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }

    /// Calls whose target block is not defined in this script
    ///
    /// Not an error by itself: a custom resolver may supply those blocks.
    pub fn undefined_calls(&self) -> Vec<UndefinedCall> {
        let mut undefined = Vec::new();
        for (name, ops) in &self.blocks {
            for (index, op) in ops.iter().enumerate() {
                if let ScriptOp::Call { block } = op {
                    if !self.blocks.contains_key(block) {
                        undefined.push(UndefinedCall {
                            block: name.clone(),
                            index,
                            target: block.clone(),
                        });
                    }
                }
            }
        }
        undefined
    }

    /// Build an engine program, sending `emit` output to `sink`
    pub fn to_program(&self, sink: Sink) -> BlockMap<Instr> {
        self.blocks
            .iter()
            .fold(BlockMap::new(), |program, (name, ops)| {
                let instrs = ops.iter().map(|op| compile(op, &sink)).collect();
                program.with_block(name.as_str(), instrs)
            })
    }
}

fn compile(op: &ScriptOp, sink: &Sink) -> Instr {
    match op {
        ScriptOp::Emit { text } => {
            let sink = Arc::clone(sink);
            let text = text.clone();
            Instr::data(format!("emit {:?}", text), move || sink(text.as_str()))
        }
        ScriptOp::Sleep { ms } => {
            let pause = Duration::from_millis(*ms);
            Instr::data(format!("sleep {}ms", ms), move || std::thread::sleep(pause))
        }
        ScriptOp::Call { block } => Instr::call(block.as_str()),
        ScriptOp::Jump { to } => Instr::jump(*to),
        ScriptOp::Split { to } => Instr::split(*to),
    }
}
