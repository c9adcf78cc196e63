//! Stopwatch-style elapsed-time measurement on top of the shared counter.

use fugit::MicrosDurationU64;

use crate::mux::{AlarmBackend, MuxTicks, TimerMux};

/// Accumulates elapsed counter ticks between start/stop pairs.
///
/// Thin by design: this is just bookkeeping over [`TimerMux::now`], there
/// is no hardware or interrupt involvement.
pub struct Stopwatch<'a, B: AlarmBackend, const N: usize> {
    mux: &'a TimerMux<B, N>,
    started_at: B::Ticks,
    accumulated_ticks: u64,
    running: bool,
}

impl<'a, B: AlarmBackend, const N: usize> Stopwatch<'a, B, N> {
    /// Make a stopped, zeroed stopwatch.
    pub fn new(mux: &'a TimerMux<B, N>) -> Self {
        Self {
            mux,
            started_at: B::Ticks::from_u64(0),
            accumulated_ticks: 0,
            running: false,
        }
    }

    /// Start counting. No-op if already running.
    pub fn start(&mut self) {
        if !self.running {
            self.started_at = self.mux.now();
            self.running = true;
        }
    }

    /// Stop counting, banking the ticks elapsed since `start`.
    pub fn stop(&mut self) {
        if self.running {
            self.accumulated_ticks += self.current_run_ticks();
            self.running = false;
        }
    }

    /// Zero the reading. A running stopwatch keeps counting from zero.
    pub fn reset(&mut self) {
        self.accumulated_ticks = 0;
        if self.running {
            self.started_at = self.mux.now();
        }
    }

    /// Total elapsed ticks across all start/stop pairs so far.
    pub fn elapsed_ticks(&self) -> u64 {
        let mut total = self.accumulated_ticks;
        if self.running {
            total += self.current_run_ticks();
        }
        total
    }

    /// Total elapsed time; fugit gives seconds/millis/micros views.
    pub fn elapsed(&self) -> MicrosDurationU64 {
        let micros = (self.elapsed_ticks() as u128 * 1_000_000 / B::TICK_HZ as u128) as u64;
        MicrosDurationU64::from_ticks(micros)
    }

    fn current_run_ticks(&self) -> u64 {
        // Wrap-aware: valid as long as a single run is shorter than the
        // counter's full range.
        self.mux.now().wrapping_sub(self.started_at).as_u64()
    }
}
