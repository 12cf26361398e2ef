//! Test helpers for engine tests
//!
//! A shared trace records which Data instructions ran, in order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::interpreter::Instr;

/// Ordered record of emitted labels, shareable across branches
#[derive(Clone, Default)]
pub struct Trace {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data instruction that appends `label` to the trace
    pub fn emit(&self, label: &str) -> Instr {
        let lines = Arc::clone(&self.lines);
        let text = label.to_string();
        Instr::data(format!("emit {}", label), move || {
            lines.lock().unwrap().push(text.clone());
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.lines.lock().unwrap().iter().filter(|l| *l == label).count()
    }
}

/// Data instruction that increments `counter`
pub fn incr(counter: &Arc<AtomicUsize>) -> Instr {
    let counter = Arc::clone(counter);
    Instr::data("incr", move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

/// Data instruction that does nothing
pub fn noop() -> Instr {
    Instr::data("noop", || {})
}

/// Poll `cond` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
