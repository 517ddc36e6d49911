//! Visible-range tracking over a lane's position-sorted arena.
//!
//! Each lane keeps two windows (notes and bars). A window holds a near bound
//! and a far bound; walking from far to near visits everything on screen.
//! Scroll speed can change mid-play, so both bounds may need to move in
//! either direction on a single update.

use std::ops::Range;

use mania_model::{Bar, Lane, Note, NoteKind, Positioned, next_index, prev_index};

/// Visible span relative to the cursor, in scroll-space pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    pub min: f64,
    pub max: f64,
}

impl VisibleRange {
    /// Range for a downscrolling field with the hit line at `hit_position`
    /// (fraction of the screen height, from the top). `margin` pads both
    /// edges so sprites never pop in or out.
    pub fn from_layout(screen_height: f64, hit_position: f64, margin: f64) -> Self {
        let hit_y = screen_height * hit_position;
        Self {
            min: -(screen_height - hit_y) - margin,
            max: hit_y + margin,
        }
    }

    /// The range for the opposite scroll direction.
    pub fn reversed(self) -> Self {
        Self {
            min: -self.max,
            max: -self.min,
        }
    }

    pub fn contains(&self, cursor: f64, position: f64) -> bool {
        position >= cursor + self.min && position <= cursor + self.max
    }
}

/// Near/far bounds into one arena.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollWindow {
    cursor: f64,
    nearest: Option<usize>,
    farthest: Option<usize>,
}

impl ScrollWindow {
    /// Both bounds start at the first element; `None` for an empty arena.
    pub fn new<T>(seq: &[T]) -> Self {
        let start = (!seq.is_empty()).then_some(0);
        Self {
            cursor: 0.0,
            nearest: start,
            farthest: start,
        }
    }

    /// Re-settle both bounds for a new cursor.
    ///
    /// Afterwards every element with position in
    /// `[cursor + range.min, cursor + range.max]` lies in `nearest..=farthest`,
    /// whatever the previous cursor or positions were.
    pub fn update<T: Positioned>(&mut self, seq: &[T], cursor: f64, range: VisibleRange) {
        self.cursor = cursor;
        let (Some(mut near), Some(mut far)) = (self.nearest, self.farthest) else {
            return;
        };
        let len = seq.len();
        if len == 0 {
            self.nearest = None;
            self.farthest = None;
            return;
        }
        near = near.min(len - 1);
        far = far.min(len - 1);
        let upper = cursor + range.max;
        let lower = cursor + range.min;

        // Far elements skipped past before a speed decrease.
        while let Some(prev) = prev_index(far) {
            if seq[prev].position() > upper {
                far = prev;
            } else {
                break;
            }
        }
        // Newly entering far elements.
        while let Some(next) = next_index(far, len) {
            if seq[far].position() <= upper {
                far = next;
            } else {
                break;
            }
        }
        // Near elements still on screen.
        while let Some(prev) = prev_index(near) {
            if seq[prev].position() >= lower {
                near = prev;
            } else {
                break;
            }
        }
        // Passed elements.
        while let Some(next) = next_index(near, len) {
            if seq[next].position() < lower {
                near = next;
            } else {
                break;
            }
        }

        self.nearest = Some(near);
        self.farthest = Some(far);
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn nearest(&self) -> Option<usize> {
        self.nearest
    }

    pub fn farthest(&self) -> Option<usize> {
        self.farthest
    }

    /// Arena indices from near to far. Empty for an empty arena.
    pub fn indices(&self) -> Range<usize> {
        match (self.nearest, self.farthest) {
            (Some(near), Some(far)) if near <= far => near..far + 1,
            _ => 0..0,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.indices().is_empty()
    }
}

/// One thing to draw, relative to the hit line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    /// Arena index; a `Body` carries its Tail's index
    pub index: usize,
    pub kind: NoteKind,
    /// Scroll-space distance from the cursor (Head's for a `Body`)
    pub offset: f64,
    /// Scroll-space length, zero except for `Body`
    pub length: f64,
    pub marked: bool,
}

/// Read-only per-lane snapshot for renderers.
#[derive(Debug, Clone, Copy)]
pub struct LaneView<'a> {
    lane: &'a Lane,
    notes: &'a ScrollWindow,
    bars: &'a ScrollWindow,
    reverse_body: bool,
}

impl<'a> LaneView<'a> {
    pub fn new(
        lane: &'a Lane,
        notes: &'a ScrollWindow,
        bars: &'a ScrollWindow,
        reverse_body: bool,
    ) -> Self {
        Self {
            lane,
            notes,
            bars,
            reverse_body,
        }
    }

    pub fn cursor(&self) -> f64 {
        self.notes.cursor()
    }

    pub fn lane(&self) -> &'a Lane {
        self.lane
    }

    pub fn note_window(&self) -> &'a ScrollWindow {
        self.notes
    }

    pub fn bar_window(&self) -> &'a ScrollWindow {
        self.bars
    }

    /// Whether long-note bodies should be flipped (reverse scroll).
    pub fn reverse_body(&self) -> bool {
        self.reverse_body
    }

    /// Notes from far to near so nearer sprites are drawn on top. A long
    /// note's `Body` comes right before its Tail.
    pub fn draw_notes(&self) -> DrawNotes<'a> {
        DrawNotes {
            notes: self.lane.notes(),
            cursor: self.notes.cursor(),
            range: self.notes.indices(),
            pending: None,
        }
    }

    /// Bar offsets from the cursor, far to near.
    pub fn draw_bars(&self) -> impl Iterator<Item = f64> + 'a {
        let bars: &'a [Bar] = self.lane.bars();
        let cursor = self.bars.cursor();
        self.bars
            .indices()
            .rev()
            .map(move |i| bars[i].position() - cursor)
    }
}

pub struct DrawNotes<'a> {
    notes: &'a [Note],
    cursor: f64,
    range: Range<usize>,
    pending: Option<DrawItem>,
}

impl DrawNotes<'_> {
    fn item(&self, index: usize) -> DrawItem {
        let note = &self.notes[index];
        DrawItem {
            index,
            kind: note.kind,
            offset: note.position() - self.cursor,
            length: 0.0,
            marked: note.is_marked(),
        }
    }

    fn body(&self, head: usize, tail: usize) -> DrawItem {
        let head_pos = self.notes[head].position();
        DrawItem {
            index: tail,
            kind: NoteKind::Body,
            offset: head_pos - self.cursor,
            length: self.notes[tail].position() - head_pos,
            marked: self.notes[tail].is_marked(),
        }
    }
}

impl Iterator for DrawNotes<'_> {
    type Item = DrawItem;

    fn next(&mut self) -> Option<DrawItem> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }
        let index = self.range.next_back()?;
        let note = &self.notes[index];
        let item = self.item(index);
        match (note.kind, note.pair) {
            (NoteKind::Tail, Some(head)) => {
                self.pending = Some(item);
                Some(self.body(head, index))
            }
            _ => Some(item),
        }
    }
}
