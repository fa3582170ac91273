//! Readiness buffer for frames that arrive before every track exists.
//!
//! Audio and video encoders start independently; either may deliver frames
//! before the other track has been registered. A segment writer needs every
//! track header before the first block, so early frames wait here and are
//! popped in arrival order once the registry is ready. After that the
//! buffer stays empty for the rest of the recording.
//!
//! The buffer is unbounded unless a capacity is configured. A producer that
//! never starts will make it grow without limit.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{MuxError, Result};
use crate::frame::EncodedFrame;

/// A frame waiting for the readiness gate, with its relative timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedFrame {
    pub frame: EncodedFrame,
    pub timestamp: Duration,
}

/// FIFO of [`BufferedFrame`]s.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: VecDeque<BufferedFrame>,
    capacity: Option<usize>,
}

impl FrameBuffer {
    /// `capacity` of `None` means unbounded.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            frames: VecDeque::new(),
            capacity,
        }
    }

    /// Fails when one more frame would exceed the capacity.
    pub fn ensure_room(&self) -> Result<()> {
        match self.capacity {
            Some(capacity) if self.frames.len() >= capacity => {
                Err(MuxError::BufferOverflow { capacity })
            }
            _ => Ok(()),
        }
    }

    /// Append a frame. Fails without storing it when the buffer is full.
    pub fn push(&mut self, frame: EncodedFrame, timestamp: Duration) -> Result<()> {
        self.ensure_room()?;
        self.frames.push_back(BufferedFrame { frame, timestamp });
        Ok(())
    }

    /// Remove the oldest frame.
    pub fn pop_front(&mut self) -> Option<BufferedFrame> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
