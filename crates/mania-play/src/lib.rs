// Mania play core: scroll windows, judgment, input, play session

pub mod autoplay;
mod error;
pub mod input;
pub mod judge_manager;
pub mod judgment;
pub mod score;
pub mod scroll_window;
pub mod session;

pub use autoplay::Autoplay;
pub use error::PlayError;
pub use input::{KeyAction, KeyTracker};
pub use judge_manager::{JudgeManager, JudgmentEvent};
pub use judgment::{Judgment, JudgmentTable, JudgmentWindow};
pub use score::{Combo, JudgmentCounts, MAX_SCORE, PlaySummary, ScoreBoard, TickStamped};
pub use scroll_window::{DrawItem, LaneView, ScrollWindow, VisibleRange};
pub use session::{AudioCue, PlaySession, StepOutcome, StepReport};
