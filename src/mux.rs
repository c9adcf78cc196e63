//! The timer multiplexer: many logical one-shot tickers sharing one
//! hardware counter and one compare interrupt.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;

use crate::callback::TickerFn;
use crate::HardwareError;

mod backend;
mod registry;
mod ticks;

pub use backend::AlarmBackend;
pub use registry::TickerId;
pub use ticks::MuxTicks;

use registry::{Record, Registry};

/// What the hardware compare register is currently tracking.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Armed {
    /// Nothing is pending and the compare register sits at the far-future
    /// sentinel (`Ticks::MAX`). This is also the state `start()` leaves
    /// the hardware in, so startup and an emptied-out registry are the
    /// same case.
    Parked,
    /// The record in this registry slot holds the earliest deadline and its
    /// deadline is in the compare register.
    Record(usize),
}

struct Inner<T, const N: usize> {
    registry: Registry<T, N>,
    armed: Armed,
    /// Offset added to the scaled counter by `timestamp_micros`, set by an
    /// external time-synchronization collaborator.
    offset_micros: u64,
}

/// Multiplexes up to `N` software tickers onto one hardware compare timer.
///
/// The multiplexer is an explicit instance rather than hidden global state;
/// platforms that want a process-wide singleton put one in a `static`
/// (`new` is `const`). All [`Ticker`](crate::Ticker) handles and the
/// platform's alarm interrupt handler share it by reference.
///
/// # Blocking
///
/// The pending set is guarded by global critical sections. Attach, detach
/// and dispatch each lock the system for an O(`N`) scan; `N` is expected to
/// be tens, not thousands.
pub struct TimerMux<B: AlarmBackend, const N: usize> {
    backend: B,
    inner: Mutex<RefCell<Inner<B::Ticks, N>>>,
    started: AtomicBool,
    /// Set for the duration of `on_alarm_interrupt`. Attach/detach calls
    /// made from dispatch context (i.e. from a firing callback) skip the
    /// alarm disable/enable bracket, since the alarm's own handler is
    /// already the critical section.
    dispatching: AtomicBool,
}

impl<B: AlarmBackend, const N: usize> TimerMux<B, N> {
    /// Make a new multiplexer owning `backend`.
    ///
    /// The hardware is untouched until [`start`](Self::start) is called.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            inner: Mutex::new(RefCell::new(Inner {
                registry: Registry::new(),
                armed: Armed::Parked,
                offset_micros: 0,
            })),
            started: AtomicBool::new(false),
            dispatching: AtomicBool::new(false),
        }
    }

    /// Idempotent hardware initialization.
    ///
    /// The first call configures the counter, parks the compare register at
    /// `Ticks::MAX` and enables the alarm; later calls are no-ops. A
    /// hardware failure is fatal for the timing subsystem and is returned
    /// to the caller; no ticker may be attached after a failed `start`.
    ///
    /// Must not be called from interrupt context.
    pub fn start(&self) -> Result<(), HardwareError> {
        critical_section::with(|_| {
            if self.started.load(Ordering::Relaxed) {
                return Ok(());
            }

            self.backend.configure()?;
            self.backend.set_compare(B::Ticks::MAX);
            self.backend.enable_alarm();

            self.started.store(true, Ordering::Relaxed);

            #[cfg(feature = "defmt")]
            defmt::debug!("timer multiplexer started, {} ticker slots", N);

            Ok(())
        })
    }

    /// The raw hardware counter value.
    pub fn now(&self) -> B::Ticks {
        self.backend.now()
    }

    /// Number of currently-registered tickers.
    pub fn pending(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).registry.len())
    }

    /// Microsecond-resolution absolute timestamp: the scaled counter plus
    /// the offset installed by [`set_timestamp_offset`](Self::set_timestamp_offset).
    pub fn timestamp_micros(&self) -> u64 {
        let ticks = self.backend.now().as_u64();
        let micros = (ticks as u128 * 1_000_000 / B::TICK_HZ as u128) as u64;
        self.timestamp_offset().wrapping_add(micros)
    }

    /// Align [`timestamp_micros`](Self::timestamp_micros) with an external
    /// wall-clock epoch.
    pub fn set_timestamp_offset(&self, offset_micros: u64) {
        critical_section::with(|cs| {
            self.inner.borrow_ref_mut(cs).offset_micros = offset_micros;
        });
    }

    /// The currently installed timestamp offset in microseconds.
    pub fn timestamp_offset(&self) -> u64 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).offset_micros)
    }

    /// Insert a deadline record and re-arm the alarm for the new earliest
    /// deadline. The deadline is computed here, once, as `now + period`;
    /// one-shot records are never recomputed.
    ///
    /// Panics if `start` has not succeeded, or if all `N` slots are taken:
    /// both are precondition violations of the caller, not runtime errors.
    pub(crate) fn register(
        &self,
        callback: TickerFn,
        period: B::Ticks,
        label: Option<u32>,
    ) -> TickerId {
        assert!(
            self.started.load(Ordering::Relaxed),
            "timer multiplexer used before start()"
        );

        let bracket = !self.dispatching.load(Ordering::Relaxed);
        if bracket {
            self.backend.disable_alarm();
        }

        let id = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let deadline = self.backend.now().wrapping_add(period);
            let id = match inner.registry.insert(Record { callback, deadline }) {
                Some(id) => id,
                None => panic!("ticker registry full"),
            };

            #[cfg(feature = "defmt")]
            defmt::trace!(
                "ticker attach: {} label {} deadline {=u64}",
                id,
                label,
                deadline.as_u64()
            );
            #[cfg(not(feature = "defmt"))]
            let _ = label;

            self.reprogram(&mut inner);
            id
        });

        if bracket {
            self.backend.enable_alarm();
        }
        id
    }

    /// Remove a deadline record and re-arm for the remaining earliest
    /// deadline. A stale or never-registered `id` is a defined no-op; the
    /// re-arm still runs so the armed-deadline invariant holds either way.
    pub(crate) fn deregister(&self, id: TickerId) {
        let bracket = !self.dispatching.load(Ordering::Relaxed);
        if bracket {
            self.backend.disable_alarm();
        }

        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            inner.registry.remove(id);
            self.reprogram(&mut inner);
        });

        if bracket {
            self.backend.enable_alarm();
        }
    }

    /// True if `id` still refers to a registered record.
    pub(crate) fn is_registered(&self, id: TickerId) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).registry.contains(id))
    }

    /// Point the compare register at the earliest pending deadline, or park
    /// it at `Ticks::MAX` when nothing is pending.
    ///
    /// A deadline that elapsed before (or while) the compare register was
    /// written would never match again until a full counter wrap, so that
    /// case is turned into a software pend and dispatched as usual.
    fn reprogram(&self, inner: &mut Inner<B::Ticks, N>) {
        match inner.registry.earliest() {
            Some((slot, deadline)) => {
                inner.armed = Armed::Record(slot);
                self.backend.set_compare(deadline);
                if self.backend.now().is_at_least(deadline) {
                    self.backend.pend_alarm();
                }
            }
            None => {
                inner.armed = Armed::Parked;
                self.backend.set_compare(B::Ticks::MAX);
            }
        }
    }

    /// The compare-match dispatch routine. Call this from the platform's
    /// alarm interrupt handler.
    ///
    /// Fires at most one callback per pass. When another record is already
    /// due (an equal deadline, or time that passed while the callback ran),
    /// the re-arm pends the alarm again and the handler re-enters back to
    /// back.
    ///
    /// # Safety
    ///
    /// Must only be called from the interrupt handler of the alarm driven
    /// by this multiplexer's backend. That handler is non-reentrant by
    /// construction; calling this from anywhere else breaks the
    /// dispatch-context bookkeeping.
    pub unsafe fn on_alarm_interrupt(&self) {
        self.backend.clear_compare_flag();
        self.dispatching.store(true, Ordering::Relaxed);

        let fired = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            match inner.armed {
                Armed::Record(slot) => {
                    // The pending flag can be stale (a match latched for a
                    // record that was detached and replaced since), so the
                    // armed deadline is re-checked against the counter
                    // before the record is consumed.
                    let due = inner
                        .registry
                        .deadline(slot)
                        .is_some_and(|deadline| self.backend.now().is_at_least(deadline));
                    if due {
                        // One-shot removal happens before the callback runs
                        // so the callback can re-attach its ticker.
                        let record = inner.registry.take(slot);
                        inner.armed = Armed::Parked;
                        record.map(|r| r.callback)
                    } else {
                        None
                    }
                }
                Armed::Parked => None,
            }
        });

        // Outside the critical section: the callback may call register or
        // deregister, which take their own short critical sections.
        if let Some(callback) = fired {
            callback.call();
        }

        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            self.backend.pause_counting();
            self.reprogram(&mut inner);
            self.backend.resume_counting();
        });

        // Hardware that disarms the comparator on a match needs it re-armed
        // before the handler returns.
        self.backend.enable_alarm();
        self.dispatching.store(false, Ordering::Relaxed);
    }
}
