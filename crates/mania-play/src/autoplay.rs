//! Input source that plays every note on time.
//!
//! Plain notes are held briefly, long notes until their tail. A key that is
//! still down when its next note arrives is let go for one step first so the
//! press registers as a new hit.

use mania_model::{Chart, NoteKind};

/// How long a plain note stays pressed, in milliseconds.
pub const AUTO_PRESS_MS: i64 = 30;

#[derive(Debug, Clone)]
pub struct Autoplay {
    /// Next note to press in each lane
    cursors: Vec<usize>,
    /// Chart time at which each lane lets go
    release_at: Vec<Option<i64>>,
    pressed: Vec<bool>,
}

impl Autoplay {
    pub fn new(lanes: usize) -> Self {
        Self {
            cursors: vec![0; lanes],
            release_at: vec![None; lanes],
            pressed: vec![false; lanes],
        }
    }

    /// Pressed state for every lane at chart time `now`.
    pub fn pressed(&mut self, chart: &Chart, now: i64) -> &[bool] {
        for (lane_idx, lane) in chart.lanes().iter().enumerate().take(self.cursors.len()) {
            let notes = lane.notes();
            let cursor = &mut self.cursors[lane_idx];
            while notes.get(*cursor).is_some_and(|n| n.kind == NoteKind::Tail) {
                *cursor += 1;
            }

            let due = notes.get(*cursor).filter(|n| n.time <= now);
            let down = match due {
                Some(_) if self.pressed[lane_idx] => false,
                Some(note) => {
                    self.release_at[lane_idx] = Some(match (note.kind, note.pair) {
                        (NoteKind::Head, Some(tail)) => notes[tail].time,
                        _ => note.time + AUTO_PRESS_MS,
                    });
                    *cursor += 1;
                    true
                }
                None => self.release_at[lane_idx].is_some_and(|t| now < t),
            };
            self.pressed[lane_idx] = down;
        }
        &self.pressed
    }
}
