// Chart input as handed over by the chart-file parser.
//
// Nothing here is validated; `Chart::build` rejects unusable streams.

use serde::{Deserialize, Serialize};

use crate::key_layout::ScratchSide;

/// Game mode tag carried by the chart file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameMode {
    Standard,
    Taiko,
    Catch,
    Mania,
}

impl TryFrom<u8> for GameMode {
    type Error = String;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Taiko),
            2 => Ok(Self::Catch),
            3 => Ok(Self::Mania),
            other => Err(format!("unknown mode tag {other}")),
        }
    }
}

impl From<GameMode> for u8 {
    fn from(mode: GameMode) -> Self {
        match mode {
            GameMode::Standard => 0,
            GameMode::Taiko => 1,
            GameMode::Catch => 2,
            GameMode::Mania => 3,
        }
    }
}

/// Chart metadata shown to the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ChartHeader {
    pub artist: String,
    pub title: String,
    pub chart_name: String,
    pub charter: String,
}

impl ChartHeader {
    /// `Artist - Title [Chart] (Charter)`, used for window titles and logs.
    pub fn display_title(&self) -> String {
        format!(
            "{} - {} [{}] ({})",
            self.artist, self.title, self.chart_name, self.charter
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitKind {
    Plain,
    Head,
    Tail,
}

/// A single parsed hit-object. Times are milliseconds of chart time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitObject {
    pub time: i64,
    pub lane: u8,
    pub kind: HitKind,
    /// For a Tail: the time of its Head. For a Head: the time of its Tail.
    #[serde(default)]
    pub paired_time: Option<i64>,
}

impl HitObject {
    pub fn plain(time: i64, lane: u8) -> Self {
        Self {
            time,
            lane,
            kind: HitKind::Plain,
            paired_time: None,
        }
    }

    /// Head and Tail objects of one long note.
    pub fn long_note(time: i64, end_time: i64, lane: u8) -> [Self; 2] {
        [
            Self {
                time,
                lane,
                kind: HitKind::Head,
                paired_time: Some(end_time),
            },
            Self {
                time: end_time,
                lane,
                kind: HitKind::Tail,
                paired_time: Some(time),
            },
        ]
    }
}

/// Uninherited timing point: a tempo section that measure bars are laid on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingPoint {
    pub time: i64,
    /// Milliseconds per beat.
    pub beat_length: f64,
    /// Beats per measure.
    pub meter: u32,
}

impl TimingPoint {
    pub fn measure_length(&self) -> f64 {
        self.beat_length * self.meter as f64
    }
}

/// Everything the parser hands to the core for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedChart {
    #[serde(default)]
    pub header: ChartHeader,
    pub mode: GameMode,
    /// Total lane count, scratch lane included.
    pub lanes: u8,
    #[serde(default)]
    pub scratch: ScratchSide,
    pub hit_objects: Vec<HitObject>,
    #[serde(default)]
    pub timing_points: Vec<TimingPoint>,
}

impl ParsedChart {
    /// A mania chart without header or timing points.
    pub fn mania(lanes: u8, hit_objects: Vec<HitObject>) -> Self {
        Self {
            header: ChartHeader::default(),
            mode: GameMode::Mania,
            lanes,
            scratch: ScratchSide::None,
            hit_objects,
            timing_points: Vec::new(),
        }
    }
}
