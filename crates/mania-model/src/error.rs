use thiserror::Error;

use crate::key_layout::ScratchSide;

/// Reasons a chart is rejected before a play session starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Malformed chart: {reason}")]
    ChartMalformed { reason: String },

    #[error("No key layout for {lanes} lanes with scratch {scratch:?}")]
    LaneCountUnsupported { lanes: u8, scratch: ScratchSide },

    #[error("Chart mode {mode} is not playable in mania")]
    UnsupportedMode { mode: u8 },
}

impl ModelError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::ChartMalformed {
            reason: reason.into(),
        }
    }
}
