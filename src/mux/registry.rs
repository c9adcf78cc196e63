use crate::callback::TickerFn;
use crate::mux::MuxTicks;

/// Stable identity of a registered deadline record.
///
/// Slot indices are recycled; the generation tag makes an id from a
/// previous occupant of the same slot fail to match, so stale handles
/// (for example from an already-fired one-shot) deregister as a no-op.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickerId {
    slot: usize,
    generation: u32,
}

/// One registered software timer: the callback to run and the absolute
/// counter value at which to run it.
pub(crate) struct Record<T> {
    pub callback: TickerFn,
    pub deadline: T,
}

struct Slot<T> {
    generation: u32,
    record: Option<Record<T>>,
}

impl<T> Slot<T> {
    const EMPTY: Self = Self {
        generation: 0,
        record: None,
    };
}

/// Fixed-capacity arena of deadline records.
///
/// The collection is expected to stay small (tens of records), so lookups
/// and minimum scans are linear.
pub(crate) struct Registry<T, const N: usize> {
    slots: [Slot<T>; N],
}

impl<T: MuxTicks, const N: usize> Registry<T, N> {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; N],
        }
    }

    /// Insert a record into the first vacant slot.
    ///
    /// Returns `None` if all `N` slots are occupied.
    pub fn insert(&mut self, record: Record<T>) -> Option<TickerId> {
        let (slot, vacant) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.record.is_none())?;

        vacant.generation = vacant.generation.wrapping_add(1);
        vacant.record = Some(record);
        Some(TickerId {
            slot,
            generation: vacant.generation,
        })
    }

    /// Remove the record behind `id`. Returns `false` if the id is stale or
    /// was never registered; that case is a defined no-op for callers.
    pub fn remove(&mut self, id: TickerId) -> bool {
        match self.slots.get_mut(id.slot) {
            Some(slot) if slot.generation == id.generation => slot.record.take().is_some(),
            _ => false,
        }
    }

    /// Take the record out of a slot by index, used by the dispatch routine
    /// for the armed record.
    pub fn take(&mut self, slot: usize) -> Option<Record<T>> {
        self.slots.get_mut(slot)?.record.take()
    }

    /// Deadline of the record in `slot`, if the slot is occupied.
    pub fn deadline(&self, slot: usize) -> Option<T> {
        self.slots.get(slot)?.record.as_ref().map(|r| r.deadline)
    }

    /// True if `id` refers to a currently-registered record.
    pub fn contains(&self, id: TickerId) -> bool {
        self.slots
            .get(id.slot)
            .is_some_and(|s| s.generation == id.generation && s.record.is_some())
    }

    /// Number of currently-registered records.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.record.is_some()).count()
    }

    /// Slot index and deadline of the record with the earliest deadline.
    ///
    /// Deadlines are compared wrap-aware. On a tie the record in the lower
    /// slot wins (first found in the scan); the loser is picked up on the
    /// next dispatch pass.
    pub fn earliest(&self) -> Option<(usize, T)> {
        let mut found: Option<(usize, T)> = None;
        for (slot, s) in self.slots.iter().enumerate() {
            if let Some(record) = &s.record {
                match found {
                    Some((_, best)) if record.deadline.compare(best).is_lt() => {
                        found = Some((slot, record.deadline));
                    }
                    None => found = Some((slot, record.deadline)),
                    _ => {}
                }
            }
        }
        found
    }
}
