//! Halt line from the limit-switch interrupt to the step generators
//!
//! The interrupt cannot reach the axes, which are owned by the control
//! loop. Instead it bumps an epoch counter; each axis compares the epoch
//! with the last one it saw at the start of every `tick()` and stops on a
//! change. The interrupt is the only writer.

use portable_atomic::{AtomicU32, Ordering};

use spool_core::traits::AxisHalt;

/// Halt request counter written from interrupt context
#[derive(Debug)]
pub struct HaltLine {
    epoch: AtomicU32,
}

impl Default for HaltLine {
    fn default() -> Self {
        Self::new()
    }
}

impl HaltLine {
    /// Create a line with no halt requested
    pub const fn new() -> Self {
        Self {
            epoch: AtomicU32::new(0),
        }
    }

    /// Request a halt of every axis watching this line
    pub fn request(&self) {
        let next = self.epoch.load(Ordering::Relaxed).wrapping_add(1);
        self.epoch.store(next, Ordering::Release);
    }

    /// Current epoch
    pub fn epoch(&self) -> u32 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Start watching the line from its current epoch
    pub fn watch(&self) -> HaltWatch<'_> {
        HaltWatch {
            line: self,
            seen: self.epoch(),
        }
    }
}

impl AxisHalt for &HaltLine {
    fn halt(&mut self) {
        self.request();
    }
}

/// One axis' view of a [`HaltLine`]
#[derive(Debug, Clone, Copy)]
pub struct HaltWatch<'a> {
    line: &'a HaltLine,
    seen: u32,
}

impl HaltWatch<'_> {
    /// Check for a halt requested since the last call
    pub fn take(&mut self) -> bool {
        let epoch = self.line.epoch();
        if epoch == self.seen {
            return false;
        }
        self.seen = epoch;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_watch_sees_request_once() {
        let line = HaltLine::new();
        let mut traverse = line.watch();
        let mut spindle = line.watch();

        assert!(!traverse.take());

        let mut halt = &line;
        halt.halt();

        assert!(traverse.take());
        assert!(!traverse.take());
        assert!(spindle.take());
    }

    #[test]
    fn test_watch_starts_at_current_epoch() {
        let line = HaltLine::new();
        line.request();
        let mut watch = line.watch();
        assert!(!watch.take());
    }
}
