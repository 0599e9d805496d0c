//! Monotonic time source
//!
//! Reply windows on the bus are a few microseconds wide, so waiting is done
//! by spinning on a monotonic timestamp. A yielding sleep would hand the
//! core to a scheduler with unbounded wake-up latency.

/// Free-running microsecond clock
pub trait Monotonic {
    /// Microseconds since an arbitrary fixed point
    fn now_us(&self) -> u64;

    /// Timestamp `us` microseconds from now
    #[inline(always)]
    fn deadline_after(&self, us: u32) -> u64 {
        self.now_us() + us as u64
    }

    /// Spin until `deadline_us` has been reached
    ///
    /// Returns immediately if the deadline is already in the past.
    #[inline(always)]
    fn spin_until(&self, deadline_us: u64) {
        while self.now_us() < deadline_us {
            core::hint::spin_loop();
        }
    }

    /// Spin for `us` microseconds
    #[inline(always)]
    fn busy_wait_us(&self, us: u32) {
        let deadline = self.deadline_after(us);
        self.spin_until(deadline);
    }
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    #[inline(always)]
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
