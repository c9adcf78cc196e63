//! The user-facing one-shot software timer.

use fugit::MicrosDurationU64;

use crate::callback::TickerFn;
use crate::mux::{AlarmBackend, MuxTicks, TickerId, TimerMux};

/// A logical one-shot timer multiplexed onto shared hardware.
///
/// Attaching registers a callback to fire once, after the given duration.
/// Periodic behavior is the callback's job: re-attach from inside it.
/// Dropping the handle detaches it.
pub struct Ticker<'a, B: AlarmBackend, const N: usize> {
    mux: &'a TimerMux<B, N>,
    id: Option<TickerId>,
    period: Option<B::Ticks>,
    label: Option<u32>,
}

impl<'a, B: AlarmBackend, const N: usize> Ticker<'a, B, N> {
    /// Make a detached ticker bound to `mux`.
    ///
    /// The multiplexer must have been [`start`](TimerMux::start)ed before
    /// the ticker is attached.
    pub fn new(mux: &'a TimerMux<B, N>) -> Self {
        Self {
            mux,
            id: None,
            period: None,
            label: None,
        }
    }

    /// Like [`new`](Self::new), with a caller-chosen diagnostic label.
    ///
    /// The label carries no semantics; it only shows up in `defmt` trace
    /// output on attach, to tell tickers apart in a log.
    pub fn labeled(mux: &'a TimerMux<B, N>, label: u32) -> Self {
        Self {
            mux,
            id: None,
            period: None,
            label: Some(label),
        }
    }

    /// Attach `callback` to fire once after `period` counter ticks.
    ///
    /// An already-attached ticker is detached first, so a handle never has
    /// more than one registration.
    pub fn attach_ticks(&mut self, callback: TickerFn, period: B::Ticks) {
        self.detach();
        self.period = Some(period);
        self.id = Some(self.mux.register(callback, period, self.label));
    }

    /// Attach `callback` to fire once after `period`, scaled from
    /// microseconds to counter ticks by the backend's tick rate.
    pub fn attach_us(&mut self, callback: TickerFn, period: MicrosDurationU64) {
        let ticks = (period.ticks() as u128 * B::TICK_HZ as u128 / 1_000_000) as u64;
        self.attach_ticks(callback, B::Ticks::from_u64(ticks));
    }

    /// Detach the ticker, guaranteeing its callback will not fire.
    ///
    /// Detaching a ticker that was never attached, or whose one-shot has
    /// already fired, is a no-op.
    pub fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.mux.deregister(id);
        }
    }

    /// True while this ticker has a pending deadline.
    ///
    /// Goes back to `false` once a one-shot has fired.
    pub fn is_attached(&self) -> bool {
        self.id.is_some_and(|id| self.mux.is_registered(id))
    }

    /// The interval requested by the most recent attach, in counter ticks.
    /// `None` for a freshly constructed, never-attached ticker.
    pub fn period_ticks(&self) -> Option<B::Ticks> {
        self.period
    }

    /// The diagnostic label given at construction, if any.
    pub fn label(&self) -> Option<u32> {
        self.label
    }
}

impl<B: AlarmBackend, const N: usize> Drop for Ticker<'_, B, N> {
    fn drop(&mut self) {
        self.detach();
    }
}
