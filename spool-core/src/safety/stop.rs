//! Stop signal shared with the limit-switch interrupt
//!
//! Single-writer discipline per field:
//!
//! | Field             | Written by                     | Read by        |
//! |-------------------|--------------------------------|----------------|
//! | `requested`       | interrupt sets, loop clears    | both           |
//! | `last_trigger_ms` | interrupt                      | interrupt      |
//! | `armed`           | loop                           | interrupt      |
//! | `arm_epoch`       | loop                           | interrupt      |
//!
//! The interrupt never sets `requested` while it is already set, so the
//! loop's load-then-store in [`StopSignal::take`] cannot lose a trigger.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Stop request flag plus debounce timestamp
///
/// Lives in a `static` (firmware) or on the test stack and is handed by
/// reference to both the interrupt-side monitor and the polling side.
#[derive(Debug)]
pub struct StopSignal {
    requested: AtomicBool,
    last_trigger_ms: AtomicU32,
    armed: AtomicBool,
    arm_epoch: AtomicU32,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    /// Create an armed signal with no pending request
    pub const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            last_trigger_ms: AtomicU32::new(0),
            armed: AtomicBool::new(true),
            arm_epoch: AtomicU32::new(0),
        }
    }

    /// Record an accepted trigger (interrupt context)
    pub(crate) fn record_trigger(&self, now_ms: u32) {
        self.last_trigger_ms.store(now_ms, Ordering::Relaxed);
        self.requested.store(true, Ordering::Release);
    }

    /// Timestamp of the last accepted trigger
    pub fn last_trigger_ms(&self) -> u32 {
        self.last_trigger_ms.load(Ordering::Relaxed)
    }

    /// Check for an unconsumed trigger without consuming it
    pub fn is_pending(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Consume a pending trigger (loop context)
    ///
    /// Returns `true` exactly once per accepted trigger.
    pub fn take(&self) -> bool {
        if self.requested.load(Ordering::Acquire) {
            self.requested.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Drop any pending trigger (loop context)
    pub fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }

    /// Let the interrupt react to the switch again
    ///
    /// Every call starts a new arming epoch: a switch that is still held
    /// engaged is acted on again once the debounce window allows it.
    pub fn arm(&self) {
        let next = self.arm_epoch.load(Ordering::Relaxed).wrapping_add(1);
        self.arm_epoch.store(next, Ordering::Release);
        self.armed.store(true, Ordering::Release);
    }

    /// Number of `arm` calls so far, wrapping
    pub fn arm_epoch(&self) -> u32 {
        self.arm_epoch.load(Ordering::Acquire)
    }

    /// Make the interrupt ignore edges
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    /// Check whether edges are currently acted on
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}
