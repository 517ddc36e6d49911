//! One play of one chart, stepped once per frame.
//!
//! Step order: timer, cursor, scroll windows, input and judgment, audio cues.
//! Everything is validated in `new`; a session either exists fully or not
//! at all.

use log::{debug, info};
use mania_config::PlayConfig;
use mania_config::play_config::{OFFSET_MAX, OFFSET_MIN, SPEED_MAX, SPEED_MIN};
use mania_model::{Chart, ParsedChart};
use mania_timing::{ClockDrift, TickRate, Timer, TimerConfig, WallClock};

use crate::PlayError;
use crate::input::KeyTracker;
use crate::judge_manager::{JudgeManager, JudgmentEvent};
use crate::judgment::JudgmentTable;
use crate::score::{Combo, PlaySummary, ScoreBoard};
use crate::scroll_window::{LaneView, ScrollWindow, VisibleRange};

/// Requests for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Chart time reached the audio offset: start the music
    Start,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    Running,
    /// Chart and lead-out fully played
    Finished,
    /// Stopped by `abort`; nothing was stepped
    Aborted,
}

/// Everything that happened in one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub tick: i64,
    pub now: i64,
    pub events: Vec<JudgmentEvent>,
    pub cues: Vec<AudioCue>,
    pub drift: Option<ClockDrift>,
    pub outcome: StepOutcome,
}

pub struct PlaySession<C: WallClock> {
    chart: Chart,
    timer: Timer,
    clock: C,
    /// Clock reading when the session was created
    start_us: i64,
    range: VisibleRange,
    reverse: bool,
    note_windows: Vec<ScrollWindow>,
    bar_windows: Vec<ScrollWindow>,
    judge: JudgeManager,
    keys: KeyTracker,
    combo: Combo,
    score: ScoreBoard,
    pending_cues: Vec<AudioCue>,
    music_started: bool,
    aborted: bool,
    finished: bool,
}

impl<C: WallClock> PlaySession<C> {
    pub fn new(parsed: &ParsedChart, config: &PlayConfig, clock: C) -> Result<Self, PlayError> {
        let mut config = config.clone();
        config.validate();

        let chart = Chart::build(parsed, config.speed)?;
        let table = JudgmentTable::from_tolerances(&config.judgment)?;
        let timer = Timer::new(&TimerConfig {
            rate: TickRate::new(config.ticks_per_second),
            duration_ms: chart.duration(),
            lead_in_ms: config.lead_in_ms,
            lead_out_ms: config.lead_out_ms,
            offset_ms: config.offset_ms,
            drift_warn_ms: config.drift_warn_ms,
        });

        let mut range = VisibleRange::from_layout(
            config.screen_height,
            config.hit_position,
            config.position_margin,
        );
        if config.reverse {
            range = range.reversed();
        }

        let lane_count = chart.lane_count();
        let note_windows = chart
            .lanes()
            .iter()
            .map(|l| ScrollWindow::new(l.notes()))
            .collect();
        let bar_windows = chart
            .lanes()
            .iter()
            .map(|l| ScrollWindow::new(l.bars()))
            .collect();

        info!(
            "Loaded {}: {} lanes, {} notes, {} ms",
            chart.header().display_title(),
            lane_count,
            chart.note_count(),
            chart.duration()
        );

        let start_us = clock.elapsed_us();
        Ok(Self {
            score: ScoreBoard::new(chart.note_count()),
            chart,
            timer,
            clock,
            start_us,
            range,
            reverse: config.reverse,
            note_windows,
            bar_windows,
            judge: JudgeManager::new(table, lane_count),
            keys: KeyTracker::new(lane_count),
            combo: Combo::default(),
            pending_cues: Vec::new(),
            music_started: false,
            aborted: false,
            finished: false,
        })
    }

    /// Advance one frame with the current pressed state of every lane.
    pub fn step(&mut self, pressed: &[bool]) -> Result<StepReport, PlayError> {
        if self.aborted {
            return Ok(self.report(Vec::new(), Vec::new(), None, StepOutcome::Aborted));
        }
        self.keys.check(pressed)?;

        self.timer.advance();
        let wall_ms = (self.clock.elapsed_us() - self.start_us) / 1000;
        let drift = self.timer.sync(wall_ms);
        let tick = self.timer.tick();
        let now = self.timer.now();

        self.update_windows();

        let mut events = Vec::new();
        if !self.timer.is_paused() {
            self.keys.update(pressed, tick)?;
            let actions = self.keys.actions();
            self.judge
                .update(&mut self.chart, &actions, tick, now, &mut events);
            for event in &events {
                self.combo.apply(event.judgment, event.tick);
                self.score.record(event.judgment, event.offset_ms);
            }
        }

        let mut cues = std::mem::take(&mut self.pending_cues);
        if !self.music_started && now >= self.timer.offset() {
            self.music_started = true;
            cues.push(AudioCue::Start);
        }

        let outcome = if self.timer.is_finished() {
            if !self.finished {
                self.finished = true;
                info!(
                    "Finished at tick {tick}: score {}, max combo {}",
                    self.score.score(),
                    self.combo.max
                );
            }
            StepOutcome::Finished
        } else {
            StepOutcome::Running
        };
        Ok(self.report(events, cues, drift, outcome))
    }

    fn report(
        &self,
        events: Vec<JudgmentEvent>,
        cues: Vec<AudioCue>,
        drift: Option<ClockDrift>,
        outcome: StepOutcome,
    ) -> StepReport {
        StepReport {
            tick: self.timer.tick(),
            now: self.timer.now(),
            events,
            cues,
            drift,
            outcome,
        }
    }

    /// Scroll-space coordinate of the hit line.
    pub fn cursor(&self) -> f64 {
        self.timer.now() as f64 * self.chart.speed()
    }

    fn update_windows(&mut self) {
        let cursor = self.cursor();
        for (lane, (notes, bars)) in self
            .chart
            .lanes()
            .iter()
            .zip(self.note_windows.iter_mut().zip(self.bar_windows.iter_mut()))
        {
            notes.update(lane.notes(), cursor, self.range);
            bars.update(lane.bars(), cursor, self.range);
        }
    }

    /// Change scroll speed. Positions are recomputed now; the windows
    /// resettle on the next step.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_nan() {
            return;
        }
        let speed = speed.clamp(SPEED_MIN, SPEED_MAX);
        self.chart.set_speed(speed);
        debug!("Speed set to {speed} at {} ms", self.timer.now());
    }

    pub fn speed(&self) -> f64 {
        self.chart.speed()
    }

    /// Switch between downscroll and upscroll.
    pub fn flip_direction(&mut self) {
        self.range = self.range.reversed();
        self.reverse = !self.reverse;
        debug!("Scroll direction reversed: {}", self.reverse);
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.range
    }

    /// Audio latency offset; applied by the next step.
    pub fn set_offset(&mut self, offset_ms: i64) {
        self.timer
            .set_offset(offset_ms.clamp(OFFSET_MIN, OFFSET_MAX));
    }

    /// Returns whether the session is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        let paused = self.timer.toggle_pause();
        self.pending_cues.push(if paused {
            AudioCue::Pause
        } else {
            AudioCue::Resume
        });
        paused
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    /// Stop immediately. Later steps change nothing.
    pub fn abort(&mut self) {
        if !self.aborted {
            self.aborted = true;
            info!("Aborted at {} ms", self.timer.now());
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn lane_views(&self) -> Vec<LaneView<'_>> {
        self.chart
            .lanes()
            .iter()
            .zip(self.note_windows.iter().zip(&self.bar_windows))
            .map(|(lane, (notes, bars))| LaneView::new(lane, notes, bars, self.reverse))
            .collect()
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn keys(&self) -> &KeyTracker {
        &self.keys
    }

    pub fn judge(&self) -> &JudgeManager {
        &self.judge
    }

    pub fn combo(&self) -> &Combo {
        &self.combo
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn summary(&self) -> PlaySummary {
        PlaySummary::new(
            self.chart.header().display_title(),
            self.chart.lane_count(),
            &self.score,
            &self.combo,
            self.aborted,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mania_model::{GameMode, HitObject, ModelError};
    use mania_timing::SimulatedClock;

    fn parsed() -> ParsedChart {
        ParsedChart::mania(
            4,
            vec![
                HitObject::plain(0, 0),
                HitObject::plain(500, 1),
                HitObject::plain(1000, 2),
            ],
        )
    }

    fn config() -> PlayConfig {
        PlayConfig {
            lead_in_ms: 100,
            lead_out_ms: 200,
            ..Default::default()
        }
    }

    /// Step with the clock kept in lockstep, one millisecond per step.
    fn run(session: &mut PlaySession<&SimulatedClock>, clock: &SimulatedClock, steps: usize) {
        for _ in 0..steps {
            clock.advance_ms(1);
            session.step(&[false; 4]).unwrap();
        }
    }

    #[test]
    fn rejects_wrong_mode_before_starting() {
        let mut chart = parsed();
        chart.mode = GameMode::Taiko;
        let clock = SimulatedClock::new();
        let err = PlaySession::new(&chart, &config(), &clock).err().unwrap();
        assert_eq!(err, PlayError::Model(ModelError::UnsupportedMode { mode: 1 }));
    }

    #[test]
    fn wrong_key_count_is_an_error() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        let before = session.timer().tick();
        assert!(matches!(
            session.step(&[false; 7]),
            Err(PlayError::KeyCountMismatch {
                expected: 4,
                got: 7
            })
        ));
        assert_eq!(session.timer().tick(), before);
    }

    #[test]
    fn cursor_increases_with_time() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        let mut last = session.cursor();
        for _ in 0..50 {
            clock.advance_ms(1);
            session.step(&[false; 4]).unwrap();
            assert!(session.cursor() > last);
            last = session.cursor();
        }
    }

    #[test]
    fn start_cue_once_at_offset() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        let mut starts = Vec::new();
        for _ in 0..300 {
            clock.advance_ms(1);
            let report = session.step(&[false; 4]).unwrap();
            if report.cues.contains(&AudioCue::Start) {
                starts.push(report.now);
            }
        }
        assert_eq!(starts, vec![0]);
    }

    #[test]
    fn pause_emits_cues_and_freezes_judging() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        run(&mut session, &clock, 50);
        assert!(session.toggle_pause());
        clock.advance_ms(1);
        let report = session.step(&[true; 4]).unwrap();
        assert_eq!(report.cues, vec![AudioCue::Pause]);
        assert_eq!(report.now, -50);
        assert!(report.events.is_empty());

        // Wall clock keeps running while paused.
        clock.advance_ms(1000);
        assert!(!session.toggle_pause());
        clock.advance_ms(1);
        let report = session.step(&[false; 4]).unwrap();
        assert_eq!(report.cues, vec![AudioCue::Resume, AudioCue::Start]);
        assert_eq!(report.drift.map(|d| d.behind_ms), Some(1001));
        assert_eq!(report.now, 952);
        // Every note passed during the jump is swept in the same step.
        assert_eq!(report.events.len(), 2);
        assert_eq!(session.combo().count, 0);
    }

    #[test]
    fn abort_stops_without_mutation() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        run(&mut session, &clock, 10);
        session.abort();
        let tick = session.timer().tick();
        clock.advance_ms(5000);
        let report = session.step(&[true; 4]).unwrap();
        assert_eq!(report.outcome, StepOutcome::Aborted);
        assert_eq!(report.tick, tick);
        assert!(report.events.is_empty());
        assert!(session.summary().aborted);
        assert_eq!(session.score().judged(), 0);
    }

    #[test]
    fn finishes_after_lead_out() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        // Lead-in 100 + chart 1000 + lead-out 200.
        run(&mut session, &clock, 1299);
        assert!(!session.is_finished());
        clock.advance_ms(1);
        let report = session.step(&[false; 4]).unwrap();
        assert_eq!(report.outcome, StepOutcome::Finished);
        let summary = session.summary();
        assert_eq!(summary.notes, 3);
        assert_eq!(summary.judgments.miss, 3);
        assert_eq!(summary.score, 0);
    }

    #[test]
    fn flip_direction_reverses_range() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        let range = session.visible_range();
        session.flip_direction();
        assert!(session.is_reversed());
        assert_eq!(session.visible_range(), range.reversed());
        assert!(session.lane_views().iter().all(|v| v.reverse_body()));
    }

    #[test]
    fn speed_is_clamped() {
        let clock = SimulatedClock::new();
        let mut session = PlaySession::new(&parsed(), &config(), &clock).unwrap();
        session.set_speed(100.0);
        assert_eq!(session.speed(), SPEED_MAX);
        session.set_speed(f64::NAN);
        assert_eq!(session.speed(), SPEED_MAX);
    }
}
