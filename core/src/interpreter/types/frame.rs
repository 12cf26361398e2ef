//! Frames and the frame stack

use std::fmt;

use super::program::Block;

/* ===================== Frames ===================== */

/// Saved continuation point
///
/// The resolved block travels with the name so returning into a caller never
/// re-resolves it.
pub struct Frame<I> {
    /// Name of the block this frame resumes
    pub block_name: String,

    /// The block's instructions as resolved when the frame was pushed
    pub block: Block<I>,

    /// Next index to dispatch. May equal `block.len()` (exhausted)
    pub index: usize,
}

impl<I> Frame<I> {
    pub fn new(block_name: impl Into<String>, block: Block<I>, index: usize) -> Self {
        Self {
            block_name: block_name.into(),
            block,
            index,
        }
    }

    /// True once there is nothing left to dispatch in this frame
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.block.len()
    }
}

impl<I> fmt::Debug for Frame<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("block_name", &self.block_name)
            .field("len", &self.block.len())
            .field("index", &self.index)
            .finish()
    }
}

/* ===================== Frame Stack ===================== */

/// LIFO of resume points owned by a single engine
pub struct FrameStack<I> {
    frames: Vec<Frame<I>>,
}

impl<I> FrameStack<I> {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(10),
        }
    }

    pub fn push(&mut self, frame: Frame<I>) {
        self.frames.push(frame);
    }

    /// Remove the top frame. `None` means the stack is empty
    pub fn pop(&mut self) -> Option<Frame<I>> {
        self.frames.pop()
    }

    /// Pop until a frame with instructions left to dispatch is found
    pub fn pop_live(&mut self) -> Option<Frame<I>> {
        while let Some(frame) = self.pop() {
            if !frame.is_exhausted() {
                return Some(frame);
            }
        }
        None
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl<I> Default for FrameStack<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> fmt::Debug for FrameStack<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.frames.iter()).finish()
    }
}
