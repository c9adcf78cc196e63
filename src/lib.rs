//! Software timer multiplexing over a single hardware compare timer.
//!
//! An unbounded-feeling number of logical one-shot timers ([`Ticker`]s)
//! share exactly one free-running hardware counter and one compare
//! interrupt line. The [`TimerMux`] keeps the set of pending deadlines,
//! always points the compare register at the earliest one, and dispatches
//! the matching callback from the interrupt handler.
//!
//! The hardware is abstracted behind [`AlarmBackend`], a small synchronous
//! register-level contract; platforms implement it once per timer
//! peripheral and tests implement it over a simulated clock.

#![no_std]
#![deny(missing_docs)]

pub mod callback;
pub mod delay;
pub mod mux;
pub mod stopwatch;
pub mod ticker;

pub use callback::TickerFn;
pub use delay::MuxDelay;
pub use mux::{AlarmBackend, MuxTicks, TickerId, TimerMux};
pub use stopwatch::Stopwatch;
pub use ticker::Ticker;

/// A timer/alarm peripheral failed to initialize.
///
/// Fatal: the timing subsystem cannot run without working hardware, so
/// this only ever surfaces from [`TimerMux::start`] and the caller is
/// expected to abort startup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareError {
    /// The free-running counter could not be configured or started.
    Clock,
    /// The compare/alarm unit rejected its configuration.
    Alarm,
    /// The compare interrupt handler could not be installed.
    Interrupt,
}
