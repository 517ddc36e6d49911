use std::cell::Cell;
use std::time::Instant;

use crate::tick::TickRate;

/// Source of wall-clock time for a play session.
pub trait WallClock {
    /// Microseconds since an arbitrary, fixed origin.
    fn elapsed_us(&self) -> i64;
}

/// Monotonic clock backed by `Instant`, started on construction.
#[derive(Debug, Clone, Copy)]
pub struct SteadyClock {
    origin: Instant,
}

impl SteadyClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SteadyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SteadyClock {
    fn elapsed_us(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_micros()).unwrap_or(i64::MAX)
    }
}

/// Hand-driven clock for headless runs and tests. Shared by reference
/// with the session, so interior mutability keeps it `&self`-advanced.
#[derive(Debug, Default)]
pub struct SimulatedClock {
    us: Cell<i64>,
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_us(&self, us: i64) {
        self.us.set(us);
    }

    pub fn advance_us(&self, delta_us: i64) {
        self.us.set(self.us.get() + delta_us);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.advance_us(delta_ms * 1000);
    }

    /// Advance by the wall duration of `ticks` at `rate`.
    pub fn advance_ticks(&self, rate: TickRate, ticks: i64) {
        self.advance_us(ticks * 1_000_000 / i64::from(rate.tps()));
    }
}

impl WallClock for SimulatedClock {
    fn elapsed_us(&self) -> i64 {
        self.us.get()
    }
}

impl<C: WallClock + ?Sized> WallClock for &C {
    fn elapsed_us(&self) -> i64 {
        (**self).elapsed_us()
    }
}
