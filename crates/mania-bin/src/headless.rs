// Headless playback: autoplay input against a simulated clock.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use mania_config::PlayConfig;
use mania_model::{Chart, ParsedChart, ScratchSide};
use mania_play::{Autoplay, PlaySession, PlaySummary, StepOutcome};
use mania_timing::SimulatedClock;

/// Scroll speed to switch to once chart time reaches `at_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedChange {
    pub at_ms: i64,
    pub speed: f64,
}

/// Parses `<ms>:<speed>`.
pub fn parse_speed_change(arg: &str) -> Result<SpeedChange, String> {
    let (at, speed) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected <ms>:<speed>, got '{arg}'"))?;
    let at_ms = at
        .trim()
        .parse()
        .map_err(|e| format!("bad time '{at}': {e}"))?;
    let speed: f64 = speed
        .trim()
        .parse()
        .map_err(|e| format!("bad speed '{speed}': {e}"))?;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(format!("speed must be positive, got {speed}"));
    }
    Ok(SpeedChange { at_ms, speed })
}

/// Keys of every lane, left to right, plus the scratch side if any.
pub fn layout_line(chart: &Chart) -> String {
    let keys: Vec<String> = chart.key_layout().iter().map(|k| format!("{k:?}")).collect();
    let keys = keys.join(" ");
    match chart.scratch() {
        ScratchSide::None => keys,
        side => format!("{keys} (scratch {side:?})"),
    }
}

pub fn load_chart(path: &Path) -> Result<ParsedChart> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading chart {}", path.display()))?;
    let chart = serde_json::from_str(&data)
        .with_context(|| format!("parsing chart {}", path.display()))?;
    Ok(chart)
}

/// Play the whole chart with autoplay and return the summary.
pub fn run(
    parsed: &ParsedChart,
    config: &PlayConfig,
    speed_changes: &[SpeedChange],
) -> Result<PlaySummary> {
    let clock = SimulatedClock::new();
    let mut session = match PlaySession::new(parsed, config, &clock) {
        Ok(session) => session,
        Err(e) => {
            warn!("Chart rejected: {e}");
            return Err(e.into());
        }
    };

    info!("Key layout: {}", layout_line(session.chart()));

    let mut changes = speed_changes.to_vec();
    changes.sort_by_key(|c| c.at_ms);
    let mut changes = changes.into_iter().peekable();

    let rate = session.timer().rate();
    let mut autoplay = Autoplay::new(session.chart().lane_count());
    loop {
        while let Some(change) = changes.next_if(|c| c.at_ms <= session.timer().now()) {
            info!("Speed {} at {} ms", change.speed, change.at_ms);
            session.set_speed(change.speed);
        }

        clock.advance_ticks(rate, 1);
        let timer = session.timer();
        let next_now = timer.tick_to_time(timer.tick() + 1);
        let keys = autoplay.pressed(session.chart(), next_now).to_vec();
        let report = session.step(&keys)?;
        if report.outcome != StepOutcome::Running {
            break;
        }
    }
    Ok(session.summary())
}
