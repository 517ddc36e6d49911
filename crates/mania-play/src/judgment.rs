use mania_config::JudgmentTolerances;
use serde::{Deserialize, Serialize};

use crate::PlayError;

/// Outcome of one judged note, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Judgment {
    Kool,
    Cool,
    Good,
    Bad,
    Miss,
}

impl Judgment {
    pub const ALL: [Judgment; 5] = [
        Judgment::Kool,
        Judgment::Cool,
        Judgment::Good,
        Judgment::Bad,
        Judgment::Miss,
    ];

    pub fn is_miss(self) -> bool {
        self == Judgment::Miss
    }

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Score weight of this outcome.
    pub fn weight(self) -> f64 {
        match self {
            Judgment::Kool => 1.0,
            Judgment::Cool => 0.9,
            Judgment::Good => 0.6,
            Judgment::Bad => 0.2,
            Judgment::Miss => 0.0,
        }
    }
}

/// Symmetric tolerance around a note's time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentWindow {
    pub judgment: Judgment,
    pub tolerance_ms: i64,
}

/// Windows ordered tightest to loosest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgmentTable {
    windows: Vec<JudgmentWindow>,
}

impl JudgmentTable {
    pub fn new(windows: Vec<JudgmentWindow>) -> Result<Self, PlayError> {
        let Some(first) = windows.first() else {
            return Err(PlayError::InvalidJudgmentWindows {
                reason: "no windows".to_string(),
            });
        };
        if first.tolerance_ms < 0 {
            return Err(PlayError::InvalidJudgmentWindows {
                reason: format!("{:?} tolerance is negative", first.judgment),
            });
        }
        if let Some(pair) = windows
            .windows(2)
            .find(|w| w[1].tolerance_ms <= w[0].tolerance_ms)
        {
            return Err(PlayError::InvalidJudgmentWindows {
                reason: format!(
                    "{:?} ({} ms) is not looser than {:?} ({} ms)",
                    pair[1].judgment, pair[1].tolerance_ms, pair[0].judgment, pair[0].tolerance_ms
                ),
            });
        }
        Ok(Self { windows })
    }

    pub fn from_tolerances(tolerances: &JudgmentTolerances) -> Result<Self, PlayError> {
        Self::new(
            Judgment::ALL
                .iter()
                .zip(tolerances.as_array())
                .map(|(&judgment, tolerance_ms)| JudgmentWindow {
                    judgment,
                    tolerance_ms,
                })
                .collect(),
        )
    }

    /// The tightest window covering `|offset_ms|`, if any.
    pub fn classify(&self, offset_ms: i64) -> Option<Judgment> {
        let distance = offset_ms.abs();
        self.windows
            .iter()
            .find(|w| distance <= w.tolerance_ms)
            .map(|w| w.judgment)
    }

    /// Tolerance of the loosest window.
    pub fn loosest(&self) -> i64 {
        self.windows.last().map_or(0, |w| w.tolerance_ms)
    }

    pub fn windows(&self) -> &[JudgmentWindow] {
        &self.windows
    }
}

impl Default for JudgmentTable {
    fn default() -> Self {
        let windows = Judgment::ALL
            .iter()
            .zip(JudgmentTolerances::default().as_array())
            .map(|(&judgment, tolerance_ms)| JudgmentWindow {
                judgment,
                tolerance_ms,
            })
            .collect();
        Self { windows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn window(judgment: Judgment, tolerance_ms: i64) -> JudgmentWindow {
        JudgmentWindow {
            judgment,
            tolerance_ms,
        }
    }

    #[test]
    fn default_table_classifies() {
        let table = JudgmentTable::default();
        assert_eq!(table.classify(0), Some(Judgment::Kool));
        assert_eq!(table.classify(-16), Some(Judgment::Kool));
        assert_eq!(table.classify(17), Some(Judgment::Cool));
        assert_eq!(table.classify(-70), Some(Judgment::Good));
        assert_eq!(table.classify(100), Some(Judgment::Bad));
        assert_eq!(table.classify(150), Some(Judgment::Miss));
        assert_eq!(table.classify(151), None);
        assert_eq!(table.loosest(), 150);
    }

    #[test]
    fn from_config_tolerances() {
        let table = JudgmentTable::from_tolerances(&JudgmentTolerances::default()).unwrap();
        assert_eq!(table, JudgmentTable::default());
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            JudgmentTable::new(Vec::new()),
            Err(PlayError::InvalidJudgmentWindows { .. })
        ));
    }

    #[test]
    fn rejects_non_increasing() {
        let err = JudgmentTable::new(vec![
            window(Judgment::Kool, 20),
            window(Judgment::Cool, 20),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Cool (20 ms) is not looser than Kool"));
    }

    #[test]
    fn rejects_negative() {
        assert!(JudgmentTable::new(vec![window(Judgment::Kool, -1)]).is_err());
    }

    #[test]
    fn weights_are_ordered() {
        for pair in Judgment::ALL.windows(2) {
            assert!(pair[0].weight() > pair[1].weight());
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Judgment::Bad.index(), 3);
    }

    proptest! {
        #[test]
        fn classify_picks_tightest_enclosing(offset in -400i64..400) {
            let table = JudgmentTable::default();
            match table.classify(offset) {
                Some(judgment) => {
                    let w = table.windows()[judgment.index()];
                    prop_assert!(offset.abs() <= w.tolerance_ms);
                    for tighter in &table.windows()[..judgment.index()] {
                        prop_assert!(offset.abs() > tighter.tolerance_ms);
                    }
                }
                None => prop_assert!(offset.abs() > table.loosest()),
            }
        }
    }
}
