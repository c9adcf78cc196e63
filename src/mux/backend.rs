use super::MuxTicks;
use crate::HardwareError;

/// The register-level contract between the multiplexer and the single
/// hardware counter/compare peripheral it drives.
///
/// One implementation exists per platform timer. The trait is object-shaped
/// on purpose: methods take `&self` so that a backend can be owned by a
/// [`TimerMux`](super::TimerMux) instance, which keeps independent
/// multiplexers (for example in tests) from sharing hidden state.
pub trait AlarmBackend {
    /// The type for ticks.
    type Ticks: MuxTicks;

    /// Rate of the hardware counter, in ticks per second.
    const TICK_HZ: u64;

    /// One-time hardware initialization: start the free-running counter and
    /// hook the compare interrupt up to the multiplexer's dispatch routine.
    ///
    /// Called exactly once, from [`TimerMux::start`](super::TimerMux::start).
    /// A failure here is fatal for the whole timing subsystem.
    fn configure(&self) -> Result<(), HardwareError>;

    /// Get the current counter value.
    ///
    /// The read must be atomic with respect to the compare interrupt.
    fn now(&self) -> Self::Ticks;

    /// Set the compare value of the timer interrupt.
    ///
    /// The match must be wrap-safe: the interrupt fires when the counter
    /// reaches `instant`, even when `instant` is numerically below the
    /// current counter value because the deadline lies past a counter
    /// wrap. A compare value that is already in the past may be missed
    /// entirely; the multiplexer detects that case and calls
    /// [`pend_alarm`](Self::pend_alarm) instead.
    fn set_compare(&self, instant: Self::Ticks);

    /// Force the compare interrupt pending from software.
    ///
    /// Called when a freshly programmed compare value turns out to be
    /// already in the past, so the missed match still produces a dispatch.
    /// While the alarm is disabled the pend must latch and be taken once
    /// the alarm is re-enabled.
    fn pend_alarm(&self);

    /// Clear the compare interrupt pending flag.
    fn clear_compare_flag(&self);

    /// Allow the compare match to generate interrupts.
    fn enable_alarm(&self);

    /// Stop the compare match from generating interrupts.
    ///
    /// Used as the mutual-exclusion bracket around normal-context
    /// reconfiguration of the pending set.
    fn disable_alarm(&self);

    /// Optional. Briefly stop the counter so a new compare value can be
    /// applied without tearing, on hardware that needs it.
    fn pause_counting(&self) {}

    /// Optional. Resume counting after [`pause_counting`](Self::pause_counting).
    fn resume_counting(&self) {}
}
