//! Blocking delays against the shared counter.

use embedded_hal::delay::DelayNs;

use crate::mux::{AlarmBackend, MuxTicks, TimerMux};

/// A busy-wait [`DelayNs`] provider backed by the multiplexer's counter.
///
/// Spins on the counter instead of registering a deadline, so it is safe
/// to use before any ticker exists and never occupies a registry slot.
pub struct MuxDelay<'a, B: AlarmBackend, const N: usize> {
    mux: &'a TimerMux<B, N>,
}

impl<'a, B: AlarmBackend, const N: usize> MuxDelay<'a, B, N> {
    /// Make a delay provider bound to `mux`.
    pub fn new(mux: &'a TimerMux<B, N>) -> Self {
        Self { mux }
    }
}

impl<B: AlarmBackend, const N: usize> DelayNs for MuxDelay<'_, B, N> {
    fn delay_ns(&mut self, ns: u32) {
        // Round up, then wait one extra period: a delay of "at least" some
        // duration has to compensate for the timer's one-period uncertainty.
        let ticks = (ns as u128 * B::TICK_HZ as u128).div_ceil(1_000_000_000) as u64;
        let target = self
            .mux
            .now()
            .wrapping_add(B::Ticks::from_u64(ticks))
            .wrapping_add(B::Ticks::ONE_TICK);

        while !self.mux.now().is_at_least(target) {
            core::hint::spin_loop();
        }
    }
}
