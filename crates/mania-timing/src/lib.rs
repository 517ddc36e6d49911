// Simulation clock: tick/millisecond conversion, drift-corrected timer, wall-clock sources

mod clock;
mod tick;
mod timer;

pub use clock::{SimulatedClock, SteadyClock, WallClock};
pub use tick::{DEFAULT_TPS, TickRate};
pub use timer::{ClockDrift, ClockDriftExceeded, Timer, TimerConfig};
