// Per-session play configuration (timing, scroll layout, judgment windows)

pub mod play_config;

pub use play_config::{JudgmentTolerances, PlayConfig};
