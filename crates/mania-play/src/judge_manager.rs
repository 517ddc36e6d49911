//! Judge manager for mania play.
//!
//! Turns per-lane key actions into judgments and sweeps notes that went
//! past the loosest window. Each lane keeps a judge cursor (every note
//! before it is already judged) and the Tail of the long note being held.

use log::debug;
use mania_model::{Chart, Lane, NoteKind};

use crate::input::KeyAction;
use crate::judgment::{Judgment, JudgmentTable};
use crate::score::TickStamped;

/// One judged note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgmentEvent {
    pub tick: i64,
    /// Chart time when the judgment happened
    pub time: i64,
    pub lane: usize,
    /// Arena index of the note in its lane
    pub note: usize,
    pub kind: NoteKind,
    pub judgment: Judgment,
    /// `time - note time`; negative is early
    pub offset_ms: i64,
}

impl TickStamped for JudgmentEvent {
    fn tick(&self) -> i64 {
        self.tick
    }
}

#[derive(Debug, Clone, Default)]
struct LaneJudge {
    cursor: usize,
    /// Tail index of the long note being held
    holding: Option<usize>,
}

impl LaneJudge {
    fn skip_judged(&mut self, lane: &Lane) {
        while lane.note(self.cursor).is_some_and(|n| n.is_marked()) {
            self.cursor += 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct JudgeManager {
    table: JudgmentTable,
    lanes: Vec<LaneJudge>,
}

impl JudgeManager {
    pub fn new(table: JudgmentTable, lane_count: usize) -> Self {
        Self {
            table,
            lanes: vec![LaneJudge::default(); lane_count],
        }
    }

    pub fn table(&self) -> &JudgmentTable {
        &self.table
    }

    /// Whether `lane` is holding a long note.
    pub fn is_holding(&self, lane: usize) -> bool {
        self.lanes.get(lane).is_some_and(|l| l.holding.is_some())
    }

    /// Index of the earliest note in `lane` that may still be judged.
    pub fn cursor(&self, lane: usize) -> Option<usize> {
        self.lanes.get(lane).map(|l| l.cursor)
    }

    /// One judgment pass: key actions first, then the miss sweep.
    pub fn update(
        &mut self,
        chart: &mut Chart,
        actions: &[KeyAction],
        tick: i64,
        now: i64,
        events: &mut Vec<JudgmentEvent>,
    ) {
        for (lane, &action) in actions.iter().enumerate() {
            match action {
                KeyAction::Hit => self.press(chart, lane, tick, now, events),
                KeyAction::Release => self.release(chart, lane, tick, now, events),
                KeyAction::Idle | KeyAction::Hold => {}
            }
        }
        self.sweep(chart, tick, now, events);
    }

    /// Key down in `lane` at `now`. Picks the unjudged note closest to `now`
    /// within the loosest window; ties go to the earlier note. Tails are
    /// never targets of a press.
    pub fn press(
        &mut self,
        chart: &mut Chart,
        lane: usize,
        tick: i64,
        now: i64,
        events: &mut Vec<JudgmentEvent>,
    ) {
        let loosest = self.table.loosest();
        let (Some(state), Some(notes)) = (self.lanes.get_mut(lane), chart.lane_mut(lane)) else {
            return;
        };
        if state.holding.is_some() {
            return;
        }
        state.skip_judged(notes);

        let mut best: Option<(usize, i64)> = None;
        for (i, note) in notes.notes().iter().enumerate().skip(state.cursor) {
            if note.time - now > loosest {
                break;
            }
            if note.is_marked() || note.kind == NoteKind::Tail {
                continue;
            }
            let offset = now - note.time;
            if offset.abs() > loosest {
                continue;
            }
            if best.is_none_or(|(_, b)| offset.abs() < b.abs()) {
                best = Some((i, offset));
            }
        }
        let Some((index, offset)) = best else {
            debug!("Unmatched press in lane {lane} at {now} ms");
            return;
        };
        let Some(judgment) = self.table.classify(offset) else {
            return;
        };

        let note = &notes.notes()[index];
        let (kind, pair) = (note.kind, note.pair);
        notes.mark(index);
        events.push(JudgmentEvent {
            tick,
            time: now,
            lane,
            note: index,
            kind,
            judgment,
            offset_ms: offset,
        });

        if let (NoteKind::Head, Some(tail)) = (kind, pair) {
            if judgment.is_miss() {
                miss_tail(notes, lane, tail, tick, now, events);
            } else {
                state.holding = Some(tail);
            }
        }
        state.skip_judged(notes);
    }

    /// Key up in `lane`. Ends any hold; the Tail is judged by how close the
    /// release was to its time, and misses when outside every window.
    pub fn release(
        &mut self,
        chart: &mut Chart,
        lane: usize,
        tick: i64,
        now: i64,
        events: &mut Vec<JudgmentEvent>,
    ) {
        let (Some(state), Some(notes)) = (self.lanes.get_mut(lane), chart.lane_mut(lane)) else {
            return;
        };
        let Some(tail) = state.holding.take() else {
            return;
        };
        let Some(tail_time) = notes.note(tail).map(|n| n.time) else {
            return;
        };
        if !notes.mark(tail) {
            return;
        }
        let offset = now - tail_time;
        let judgment = self.table.classify(offset).unwrap_or(Judgment::Miss);
        events.push(JudgmentEvent {
            tick,
            time: now,
            lane,
            note: tail,
            kind: NoteKind::Tail,
            judgment,
            offset_ms: offset,
        });
        state.skip_judged(notes);
    }

    /// Miss every unjudged note whose loosest window has fully passed.
    pub fn sweep(
        &mut self,
        chart: &mut Chart,
        tick: i64,
        now: i64,
        events: &mut Vec<JudgmentEvent>,
    ) {
        let loosest = self.table.loosest();
        for (lane, state) in self.lanes.iter_mut().enumerate() {
            let Some(notes) = chart.lane_mut(lane) else {
                continue;
            };
            let mut i = state.cursor;
            while let Some(note) = notes.note(i) {
                if now <= note.time + loosest {
                    break;
                }
                let (kind, pair, time) = (note.kind, note.pair, note.time);
                if notes.mark(i) {
                    events.push(JudgmentEvent {
                        tick,
                        time: now,
                        lane,
                        note: i,
                        kind,
                        judgment: Judgment::Miss,
                        offset_ms: now - time,
                    });
                    match (kind, pair) {
                        (NoteKind::Head, Some(tail)) => {
                            miss_tail(notes, lane, tail, tick, now, events);
                        }
                        (NoteKind::Tail, _) if state.holding == Some(i) => {
                            state.holding = None;
                        }
                        _ => {}
                    }
                }
                i += 1;
            }
            state.skip_judged(notes);
        }
    }
}

/// A missed Head takes its Tail down with it.
fn miss_tail(
    notes: &mut Lane,
    lane: usize,
    tail: usize,
    tick: i64,
    now: i64,
    events: &mut Vec<JudgmentEvent>,
) {
    let Some(tail_time) = notes.note(tail).map(|n| n.time) else {
        return;
    };
    if notes.mark(tail) {
        events.push(JudgmentEvent {
            tick,
            time: now,
            lane,
            note: tail,
            kind: NoteKind::Tail,
            judgment: Judgment::Miss,
            offset_ms: now - tail_time,
        });
    }
}
