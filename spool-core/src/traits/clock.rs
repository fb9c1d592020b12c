//! Monotonic time source

/// Monotonic microsecond clock
///
/// Step generators need sub-millisecond timing; the process logic itself
/// works on millisecond timestamps handed in by the main loop.
pub trait Clock {
    /// Microseconds since an arbitrary fixed point
    fn now_us(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
