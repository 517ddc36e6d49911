// Simulation timer: one tick per frame, resynchronized against the wall clock.
//
// Chart time starts at -lead_in so the player gets a wait before the first
// note. Corrections only ever move the tick forward.

use log::{debug, warn};
use thiserror::Error;

use crate::TickRate;

/// Construction parameters, taken from the session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub rate: TickRate,
    /// Time of the last hit-object in milliseconds
    pub duration_ms: i64,
    pub lead_in_ms: i64,
    pub lead_out_ms: i64,
    /// Audio latency offset in effect when the session starts
    pub offset_ms: i64,
    /// Corrections at or above this are reported as `ClockDriftExceeded`
    pub drift_warn_ms: i64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            rate: TickRate::default(),
            duration_ms: 0,
            lead_in_ms: 1800,
            lead_out_ms: 1800,
            offset_ms: 0,
            drift_warn_ms: 50,
        }
    }
}

/// A forward correction applied by [`Timer::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDrift {
    /// Chart time before the correction
    pub at_ms: i64,
    /// How far the simulation was behind the wall clock
    pub behind_ms: i64,
    /// Ticks added
    pub ticks: i64,
}

/// Diagnostic for large wall-clock corrections. Logged, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Clock drift at {at_ms} ms: simulation was {drift_ms} ms behind the wall clock")]
pub struct ClockDriftExceeded {
    pub at_ms: i64,
    pub drift_ms: i64,
}

#[derive(Debug, Clone)]
pub struct Timer {
    rate: TickRate,
    tick: i64,
    /// Tick at which the chart and its lead-out are over
    max_tick: i64,
    /// Chart time of `tick` in milliseconds
    now: i64,
    /// Offset already folded into `tick`
    offset: i64,
    /// Offset requested by the player, applied on the next `advance`
    pending_offset: i64,
    /// Sum of all offset changes since the session started
    offset_shift: i64,
    lead_in: i64,
    drift_warn_ms: i64,
    paused: bool,
}

impl Timer {
    pub fn new(config: &TimerConfig) -> Self {
        let rate = config.rate;
        let tick = rate.time_to_tick(-config.lead_in_ms);
        Self {
            rate,
            tick,
            max_tick: rate.time_to_tick(config.duration_ms + config.lead_out_ms),
            now: rate.tick_to_time(tick),
            offset: config.offset_ms,
            pending_offset: config.offset_ms,
            offset_shift: 0,
            lead_in: config.lead_in_ms,
            drift_warn_ms: config.drift_warn_ms,
            paused: false,
        }
    }

    /// One simulation step. No-op while paused.
    ///
    /// A changed latency offset is folded in as a single tick rebase so chart
    /// time stays aligned with the already-running audio.
    pub fn advance(&mut self) {
        if self.paused {
            return;
        }
        self.tick += 1;
        let delta = self.pending_offset - self.offset;
        if delta != 0 {
            self.offset = self.pending_offset;
            self.offset_shift += delta;
            self.tick += self.rate.time_to_tick(delta);
            debug!("Offset changed by {delta} ms to {} ms", self.offset);
        }
        self.now = self.rate.tick_to_time(self.tick);
    }

    /// Catch up with the wall clock. `wall_elapsed_ms` is the wall time since
    /// the session started; the expected chart time is that minus the lead-in,
    /// shifted by offset changes made since.
    ///
    /// Only moves forward, in whole ticks; a lag shorter than one tick is
    /// left for a later sync. No-op while paused, so the first sync after a
    /// resume absorbs the whole pause in one jump.
    pub fn sync(&mut self, wall_elapsed_ms: i64) -> Option<ClockDrift> {
        if self.paused {
            return None;
        }
        let expected = wall_elapsed_ms - self.lead_in + self.offset_shift;
        let behind = expected - self.now;
        if behind < 1 {
            return None;
        }

        let ticks = self.rate.time_to_tick(behind);
        if ticks == 0 {
            return None;
        }
        let at_ms = self.now;
        self.tick += ticks;
        self.now = self.rate.tick_to_time(self.tick);

        if behind >= self.drift_warn_ms {
            warn!(
                "{}",
                ClockDriftExceeded {
                    at_ms,
                    drift_ms: behind
                }
            );
        } else {
            debug!("Adjusting time error at {at_ms} ms: {behind} ms");
        }
        Some(ClockDrift {
            at_ms,
            behind_ms: behind,
            ticks,
        })
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        debug!(
            "Timer {} at {} ms",
            if self.paused { "paused" } else { "resumed" },
            self.now
        );
        self.paused
    }

    /// Request a new latency offset; applied by the next `advance`.
    pub fn set_offset(&mut self, offset_ms: i64) {
        self.pending_offset = offset_ms;
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn tick(&self) -> i64 {
        self.tick
    }

    pub fn max_tick(&self) -> i64 {
        self.max_tick
    }

    /// Current chart time in milliseconds.
    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn rate(&self) -> TickRate {
        self.rate
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the chart and its lead-out have fully played.
    pub fn is_finished(&self) -> bool {
        self.tick >= self.max_tick
    }

    pub fn tick_to_time(&self, tick: i64) -> i64 {
        self.rate.tick_to_time(tick)
    }

    pub fn time_to_tick(&self, ms: i64) -> i64 {
        self.rate.time_to_tick(ms)
    }
}
