/// Default simulation rate: one tick per millisecond.
pub const DEFAULT_TPS: u32 = 1000;

/// Fixed simulation rate in ticks per second.
///
/// Conversions truncate toward zero, so for rates up to 1000 tps
/// `time_to_tick(tick_to_time(n))` lands within one tick of `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickRate(u32);

impl TickRate {
    /// Rates of zero are raised to one tick per second.
    pub fn new(tps: u32) -> Self {
        Self(tps.max(1))
    }

    pub fn tps(self) -> u32 {
        self.0
    }

    pub fn tick_to_time(self, tick: i64) -> i64 {
        (tick as i128 * 1000 / self.0 as i128) as i64
    }

    pub fn time_to_tick(self, ms: i64) -> i64 {
        (ms as i128 * self.0 as i128 / 1000) as i64
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self(DEFAULT_TPS)
    }
}
