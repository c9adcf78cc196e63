use core::cmp;

/// The ticks of a free-running hardware counter.
pub trait MuxTicks: Copy + PartialEq + Eq + Send {
    /// Represents a single tick.
    const ONE_TICK: Self;

    /// The largest representable tick value.
    ///
    /// Programmed into the compare register to park the alarm when no
    /// deadlines are pending.
    const MAX: Self;

    /// Compares to another tick count.
    ///
    /// Takes into account timer wrapping; if the difference is more than
    /// half the value range, the result will be flipped.
    fn compare(self, other: Self) -> cmp::Ordering;

    /// True if `self` is at the same time as `other` or later.
    ///
    /// Takes into account timer wrapping; if the difference is more than
    /// half the value range, the result will be negated.
    fn is_at_least(self, other: Self) -> bool {
        match self.compare(other) {
            cmp::Ordering::Less => false,
            cmp::Ordering::Equal => true,
            cmp::Ordering::Greater => true,
        }
    }

    /// Wrapping addition.
    fn wrapping_add(self, other: Self) -> Self;

    /// Wrapping subtraction.
    fn wrapping_sub(self, other: Self) -> Self;

    /// Widen to a `u64` tick count.
    fn as_u64(self) -> u64;

    /// Truncating conversion from a `u64` tick count.
    fn from_u64(ticks: u64) -> Self;
}

impl MuxTicks for u32 {
    const ONE_TICK: Self = 1;
    const MAX: Self = u32::MAX;

    fn compare(self, other: Self) -> cmp::Ordering {
        (self.wrapping_sub(other) as i32).cmp(&0)
    }
    fn wrapping_add(self, other: Self) -> Self {
        u32::wrapping_add(self, other)
    }
    fn wrapping_sub(self, other: Self) -> Self {
        u32::wrapping_sub(self, other)
    }
    fn as_u64(self) -> u64 {
        self as u64
    }
    fn from_u64(ticks: u64) -> Self {
        ticks as u32
    }
}

impl MuxTicks for u64 {
    const ONE_TICK: Self = 1;
    const MAX: Self = u64::MAX;

    fn compare(self, other: Self) -> cmp::Ordering {
        (self.wrapping_sub(other) as i64).cmp(&0)
    }
    fn wrapping_add(self, other: Self) -> Self {
        u64::wrapping_add(self, other)
    }
    fn wrapping_sub(self, other: Self) -> Self {
        u64::wrapping_sub(self, other)
    }
    fn as_u64(self) -> u64 {
        self
    }
    fn from_u64(ticks: u64) -> Self {
        ticks
    }
}
