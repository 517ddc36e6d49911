use serde::{Deserialize, Serialize};

/// The kind of a note in a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Plain,
    Head,
    Tail,
    /// Span between a Head and its Tail. Never stored in a lane; only
    /// produced when walking a visible window for drawing.
    Body,
}

/// Anything laid out along a lane in scroll space.
pub trait Positioned {
    fn position(&self) -> f64;
}

/// Index of the element before `index` in a position-sorted arena.
pub fn prev_index(index: usize) -> Option<usize> {
    index.checked_sub(1)
}

/// Index of the element after `index` in a position-sorted arena of `len`.
pub fn next_index(index: usize, len: usize) -> Option<usize> {
    let next = index + 1;
    (next < len).then_some(next)
}

/// A single note in a lane arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Chart time in milliseconds
    pub time: i64,
    pub kind: NoteKind,
    /// Index of the paired Head/Tail in the same lane
    pub pair: Option<usize>,
    position: f64,
    marked: bool,
}

impl Note {
    pub fn new(time: i64, kind: NoteKind) -> Self {
        Self {
            time,
            kind,
            pair: None,
            position: 0.0,
            marked: false,
        }
    }

    /// Whether this note has been judged.
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Marks the note as judged. Returns `false` if it already was.
    pub fn mark(&mut self) -> bool {
        if self.marked {
            return false;
        }
        self.marked = true;
        true
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position;
    }
}

impl Positioned for Note {
    fn position(&self) -> f64 {
        self.position
    }
}

/// A measure line. Carries no judgment state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    position: f64,
}

impl Bar {
    pub fn new(time: i64) -> Self {
        Self {
            time,
            position: 0.0,
        }
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position;
    }
}

impl Positioned for Bar {
    fn position(&self) -> f64 {
        self.position
    }
}
