// Chart model: per-lane, position-sorted note and bar arenas.
//
// Prev/next are index neighbours inside a lane arena; Head/Tail pairs
// refer to each other by index. Built once per play session.

use log::{debug, warn};

use crate::chart_data::{GameMode, HitKind, ParsedChart, TimingPoint};
use crate::key_layout::{Key, ScratchSide, key_layout};
use crate::note::{Bar, Note, NoteKind};
use crate::{ChartHeader, ModelError};

/// One key column: its note chain, its bar chain and its keys.
#[derive(Debug, Clone)]
pub struct Lane {
    keys: Vec<Key>,
    notes: Vec<Note>,
    bars: Vec<Bar>,
}

impl Lane {
    fn new(key: Key) -> Self {
        Self {
            keys: vec![key],
            notes: Vec::new(),
            bars: Vec::new(),
        }
    }

    /// Physical keys bound to this lane, in layout order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn note(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Marks a note as judged. Returns `false` if out of range or already marked.
    pub fn mark(&mut self, index: usize) -> bool {
        self.notes.get_mut(index).is_some_and(Note::mark)
    }

    fn set_speed(&mut self, speed: f64) {
        for note in &mut self.notes {
            note.set_position(note.time as f64 * speed);
        }
        for bar in &mut self.bars {
            bar.set_position(bar.time as f64 * speed);
        }
    }
}

/// A chart ready for play.
#[derive(Debug, Clone)]
pub struct Chart {
    header: ChartHeader,
    scratch: ScratchSide,
    lanes: Vec<Lane>,
    /// Time of the last hit-object in milliseconds
    duration: i64,
    speed: f64,
}

/// Per-lane bookkeeping for a Head still waiting for its Tail.
struct OpenHead {
    index: usize,
    time: i64,
    declared_end: Option<i64>,
}

impl Chart {
    /// Validate a parsed chart and build the lane arenas.
    ///
    /// Positions are laid out for the given scroll speed, or for
    /// [`DEFAULT_SPEED`] when it is not finite and positive.
    pub fn build(parsed: &ParsedChart, speed: f64) -> Result<Self, ModelError> {
        if parsed.mode != GameMode::Mania {
            return Err(ModelError::UnsupportedMode {
                mode: parsed.mode.into(),
            });
        }
        let keys = key_layout(parsed.lanes, parsed.scratch)?;
        let mut lanes: Vec<Lane> = keys.into_iter().map(Lane::new).collect();
        let mut open: Vec<Option<OpenHead>> = (0..lanes.len()).map(|_| None).collect();

        let mut last_time = i64::MIN;
        for (i, object) in parsed.hit_objects.iter().enumerate() {
            if object.time < last_time {
                return Err(ModelError::malformed(format!(
                    "hit-object {i} at {} ms comes after {last_time} ms",
                    object.time
                )));
            }
            last_time = object.time;

            let lane_idx = object.lane as usize;
            let Some(lane) = lanes.get_mut(lane_idx) else {
                return Err(ModelError::malformed(format!(
                    "hit-object {i} is in lane {lane_idx} of a {}-lane chart",
                    parsed.lanes
                )));
            };

            match object.kind {
                HitKind::Plain | HitKind::Head => {
                    if let Some(head) = &open[lane_idx] {
                        return Err(ModelError::malformed(format!(
                            "hit-object {i} at {} ms starts inside the long note at {} ms in lane {lane_idx}",
                            object.time, head.time
                        )));
                    }
                    if object.kind == HitKind::Head {
                        open[lane_idx] = Some(OpenHead {
                            index: lane.notes.len(),
                            time: object.time,
                            declared_end: object.paired_time,
                        });
                        lane.notes.push(Note::new(object.time, NoteKind::Head));
                    } else {
                        lane.notes.push(Note::new(object.time, NoteKind::Plain));
                    }
                }
                HitKind::Tail => {
                    let Some(head) = open[lane_idx].take() else {
                        return Err(ModelError::malformed(format!(
                            "tail at {} ms in lane {lane_idx} has no head",
                            object.time
                        )));
                    };
                    if object.time <= head.time {
                        return Err(ModelError::malformed(format!(
                            "long note at {} ms in lane {lane_idx} has zero length",
                            head.time
                        )));
                    }
                    if object.paired_time.is_some_and(|t| t != head.time)
                        || head.declared_end.is_some_and(|t| t != object.time)
                    {
                        return Err(ModelError::malformed(format!(
                            "tail at {} ms in lane {lane_idx} does not pair with head at {} ms",
                            object.time, head.time
                        )));
                    }
                    let tail_index = lane.notes.len();
                    let mut tail = Note::new(object.time, NoteKind::Tail);
                    tail.pair = Some(head.index);
                    lane.notes.push(tail);
                    lane.notes[head.index].pair = Some(tail_index);
                }
            }
        }

        if let Some((lane_idx, head)) = open
            .iter()
            .enumerate()
            .find_map(|(i, h)| h.as_ref().map(|h| (i, h)))
        {
            return Err(ModelError::malformed(format!(
                "long note at {} ms in lane {lane_idx} never ends",
                head.time
            )));
        }

        let duration = parsed.hit_objects.last().map_or(0, |o| o.time);
        let first_time = parsed.hit_objects.first().map_or(0, |o| o.time.min(0));
        let bar_times = measure_bars(&parsed.timing_points, first_time, duration)?;
        for lane in &mut lanes {
            lane.bars = bar_times.iter().map(|&t| Bar::new(t)).collect();
        }

        let mut chart = Self {
            header: parsed.header.clone(),
            scratch: parsed.scratch,
            lanes,
            duration,
            speed: DEFAULT_SPEED,
        };
        if !chart.set_speed(speed) {
            chart.set_speed(DEFAULT_SPEED);
        }

        debug!(
            "Built chart {}: {} lanes, {} notes, {} bars, {} ms",
            chart.header.display_title(),
            chart.lanes.len(),
            chart.note_count(),
            bar_times.len(),
            duration
        );
        Ok(chart)
    }

    /// Re-lay every note and bar for a new scroll speed.
    ///
    /// Positions must stay sorted by time, so a speed that is not finite
    /// and positive is ignored. Returns whether the speed was applied.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        if !is_valid_speed(speed) {
            warn!("Ignoring scroll speed {speed}");
            return false;
        }
        self.speed = speed;
        for lane in &mut self.lanes {
            lane.set_speed(speed);
        }
        true
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn header(&self) -> &ChartHeader {
        &self.header
    }

    pub fn scratch(&self) -> ScratchSide {
        self.scratch
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    pub fn lane_mut(&mut self, index: usize) -> Option<&mut Lane> {
        self.lanes.get_mut(index)
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of judgeable notes (heads and tails count separately).
    pub fn note_count(&self) -> usize {
        self.lanes.iter().map(|l| l.notes.len()).sum()
    }

    /// Physical keys of every lane, left to right.
    pub fn key_layout(&self) -> Vec<Key> {
        self.lanes
            .iter()
            .flat_map(|l| l.keys.iter().copied())
            .collect()
    }
}

/// Scroll speed used when a requested one is unusable.
pub const DEFAULT_SPEED: f64 = 1.0;

fn is_valid_speed(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0
}

/// Most measure bars a chart may generate. Charts asking for more are
/// rejected as malformed.
pub const MAX_BARS: usize = 100_000;

/// Bar times: one per measure from each timing point until the next one;
/// the last section runs through `end`. Bars before `start` are skipped.
fn measure_bars(points: &[TimingPoint], start: i64, end: i64) -> Result<Vec<i64>, ModelError> {
    let mut bars = Vec::new();
    for (i, point) in points.iter().enumerate() {
        let measure = point.measure_length();
        if !measure.is_finite() || measure < 1.0 {
            return Err(ModelError::malformed(format!(
                "timing point {i} at {} ms has measure length {measure}",
                point.time
            )));
        }
        let next = points.get(i + 1);
        if let Some(next) = next
            && next.time < point.time
        {
            return Err(ModelError::malformed(format!(
                "timing point {} at {} ms comes after {} ms",
                i + 1,
                next.time,
                point.time
            )));
        }

        // Measure indices worth generating, computed in f64 so extreme
        // timestamps cannot overflow.
        let first = ((start as f64 - point.time as f64) / measure).ceil().max(0.0);
        let section_end = next.map_or(end, |n| n.time);
        let last = ((section_end as f64 - point.time as f64) / measure).floor();
        if last < first {
            continue;
        }
        let count = last - first + 1.0;
        if bars.len() as f64 + count > MAX_BARS as f64 {
            return Err(ModelError::malformed(format!(
                "timing point {i} at {} ms with a {measure} ms measure needs more than {MAX_BARS} bars",
                point.time
            )));
        }

        let mut n = first as u64;
        loop {
            let t = point.time + (n as f64 * measure).round() as i64;
            let in_section = match next {
                Some(next) => t < next.time,
                None => t <= end,
            };
            if !in_section {
                break;
            }
            bars.push(t);
            n += 1;
        }
    }
    Ok(bars)
}
