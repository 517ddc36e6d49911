// Mania chart data model: parsed hit-objects, lane arenas, key layouts

mod chart;
mod chart_data;
mod error;
pub mod key_layout;
mod note;

pub use chart::{Chart, DEFAULT_SPEED, Lane, MAX_BARS};
pub use chart_data::{ChartHeader, GameMode, HitKind, HitObject, ParsedChart, TimingPoint};
pub use error::ModelError;
pub use key_layout::{Key, ScratchSide, key_layout};
pub use note::{Bar, Note, NoteKind, Positioned, next_index, prev_index};
