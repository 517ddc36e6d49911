// Combo and score tracking, plus the end-of-play summary.

use serde::{Deserialize, Serialize};

use crate::judgment::Judgment;

/// Maximum score for a chart played entirely Kool.
pub const MAX_SCORE: u32 = 1_000_000;

/// Anything stamped with the tick it happened at. Presentation derives fade
/// and pop animations from the age instead of keeping countdowns.
pub trait TickStamped {
    fn tick(&self) -> i64;

    fn age_ticks(&self, now_tick: i64) -> i64 {
        now_tick - self.tick()
    }

    /// Age as a fraction of `lifetime_ticks`, clamped to `0.0..=1.0`.
    fn age_ratio(&self, now_tick: i64, lifetime_ticks: i64) -> f64 {
        if lifetime_ticks <= 0 {
            return 1.0;
        }
        (self.age_ticks(now_tick) as f64 / lifetime_ticks as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    pub max: u32,
    /// Tick of the last change
    pub tick: i64,
}

impl Combo {
    pub fn apply(&mut self, judgment: Judgment, tick: i64) {
        if judgment.is_miss() {
            self.count = 0;
        } else {
            self.count += 1;
            self.max = self.max.max(self.count);
        }
        self.tick = tick;
    }
}

impl TickStamped for Combo {
    fn tick(&self) -> i64 {
        self.tick
    }
}

/// Judgment counts for one play.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBoard {
    total_notes: usize,
    counts: [u32; 5],
    early: [u32; 5],
    late: [u32; 5],
    weight_sum: f64,
}

impl ScoreBoard {
    pub fn new(total_notes: usize) -> Self {
        Self {
            total_notes,
            ..Default::default()
        }
    }

    /// Record one judgment. Negative offsets were hit before the note time.
    pub fn record(&mut self, judgment: Judgment, offset_ms: i64) {
        let i = judgment.index();
        self.counts[i] += 1;
        if offset_ms < 0 {
            self.early[i] += 1;
        } else if offset_ms > 0 {
            self.late[i] += 1;
        }
        self.weight_sum += judgment.weight();
    }

    pub fn count(&self, judgment: Judgment) -> u32 {
        self.counts[judgment.index()]
    }

    pub fn early(&self, judgment: Judgment) -> u32 {
        self.early[judgment.index()]
    }

    pub fn late(&self, judgment: Judgment) -> u32 {
        self.late[judgment.index()]
    }

    pub fn judged(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn total_notes(&self) -> usize {
        self.total_notes
    }

    /// Score out of `MAX_SCORE`, relative to every note in the chart.
    pub fn score(&self) -> u32 {
        if self.total_notes == 0 {
            return 0;
        }
        (self.weight_sum / self.total_notes as f64 * MAX_SCORE as f64).round() as u32
    }

    /// Weighted hit ratio over the notes judged so far.
    pub fn accuracy(&self) -> f64 {
        match self.judged() {
            0 => 1.0,
            judged => self.weight_sum / judged as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentCounts {
    pub kool: u32,
    pub cool: u32,
    pub good: u32,
    pub bad: u32,
    pub miss: u32,
}

impl JudgmentCounts {
    fn from_fn(f: impl Fn(Judgment) -> u32) -> Self {
        Self {
            kool: f(Judgment::Kool),
            cool: f(Judgment::Cool),
            good: f(Judgment::Good),
            bad: f(Judgment::Bad),
            miss: f(Judgment::Miss),
        }
    }
}

/// Final result handed to score and replay collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaySummary {
    pub title: String,
    pub lanes: usize,
    pub notes: usize,
    pub judgments: JudgmentCounts,
    pub early: JudgmentCounts,
    pub late: JudgmentCounts,
    pub max_combo: u32,
    pub score: u32,
    pub accuracy: f64,
    pub full_combo: bool,
    pub aborted: bool,
}

impl PlaySummary {
    pub fn new(
        title: String,
        lanes: usize,
        board: &ScoreBoard,
        combo: &Combo,
        aborted: bool,
    ) -> Self {
        Self {
            title,
            lanes,
            notes: board.total_notes(),
            judgments: JudgmentCounts::from_fn(|j| board.count(j)),
            early: JudgmentCounts::from_fn(|j| board.early(j)),
            late: JudgmentCounts::from_fn(|j| board.late(j)),
            max_combo: combo.max,
            score: board.score(),
            accuracy: board.accuracy(),
            full_combo: board.total_notes() > 0
                && board.judged() as usize == board.total_notes()
                && board.count(Judgment::Miss) == 0,
            aborted,
        }
    }
}
