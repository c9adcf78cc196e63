//! The callable attached to a ticker.
//!
//! Callbacks run synchronously inside the alarm interrupt handler, so the
//! representation has to be `Copy`, allocation-free and context-capable: a
//! plain function pointer plus an opaque context pointer, the same shape
//! hardware time drivers use for alarm callbacks.

use core::mem;
use core::ptr;

/// A zero-argument callable invoked when a ticker's deadline is crossed.
///
/// Runs on the interrupt path: it must complete quickly and must not block.
/// Re-attaching its own ticker from inside the callback is allowed and is
/// the intended way to get periodic behavior.
#[derive(Clone, Copy)]
pub struct TickerFn {
    f: fn(*mut ()),
    ctx: *mut (),
}

impl TickerFn {
    /// A callback that does nothing. Installed on detach.
    pub const fn noop() -> Self {
        Self {
            f: noop_shim,
            ctx: ptr::null_mut(),
        }
    }

    /// Wrap a plain `fn()` that needs no context.
    pub fn from_fn(f: fn()) -> Self {
        Self {
            f: fn_shim,
            // The context slot carries the target function pointer itself.
            ctx: f as *mut (),
        }
    }

    /// Build a callback from a function pointer and a context pointer.
    ///
    /// # Safety
    ///
    /// `ctx` must remain valid for the whole time the callback is attached
    /// to a multiplexer, and whatever it points to must be safe to access
    /// from the alarm interrupt context (the callback may run concurrently
    /// with the thread that owns `ctx`).
    pub unsafe fn from_raw(f: fn(*mut ()), ctx: *mut ()) -> Self {
        Self { f, ctx }
    }

    pub(crate) fn call(self) {
        (self.f)(self.ctx);
    }
}

// The from_raw contract makes the context pointer's referent interrupt-safe,
// and fn pointers are Send on their own.
unsafe impl Send for TickerFn {}

fn noop_shim(_: *mut ()) {}

fn fn_shim(ctx: *mut ()) {
    // Undoes the cast in `from_fn`.
    let f: fn() = unsafe { mem::transmute(ctx) };
    f();
}
