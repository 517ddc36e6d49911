use crate::PlayError;

/// Edge-detected state of one lane's key between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyAction {
    #[default]
    Idle,
    Hit,
    Release,
    Hold,
}

impl KeyAction {
    pub fn from_states(last: bool, now: bool) -> Self {
        match (last, now) {
            (false, false) => KeyAction::Idle,
            (false, true) => KeyAction::Hit,
            (true, false) => KeyAction::Release,
            (true, true) => KeyAction::Hold,
        }
    }
}

/// Pressed-state history for every lane.
#[derive(Debug, Clone)]
pub struct KeyTracker {
    last: Vec<bool>,
    current: Vec<bool>,
    last_hit_tick: Vec<Option<i64>>,
}

impl KeyTracker {
    pub fn new(lanes: usize) -> Self {
        Self {
            last: vec![false; lanes],
            current: vec![false; lanes],
            last_hit_tick: vec![None; lanes],
        }
    }

    pub fn lane_count(&self) -> usize {
        self.current.len()
    }

    /// Fails without touching any state when `pressed` has the wrong length.
    pub fn check(&self, pressed: &[bool]) -> Result<(), PlayError> {
        if pressed.len() != self.current.len() {
            return Err(PlayError::KeyCountMismatch {
                expected: self.current.len(),
                got: pressed.len(),
            });
        }
        Ok(())
    }

    pub fn update(&mut self, pressed: &[bool], tick: i64) -> Result<(), PlayError> {
        self.check(pressed)?;
        std::mem::swap(&mut self.last, &mut self.current);
        self.current.copy_from_slice(pressed);
        for lane in 0..self.current.len() {
            if self.action(lane) == KeyAction::Hit {
                self.last_hit_tick[lane] = Some(tick);
            }
        }
        Ok(())
    }

    /// `Idle` for lanes out of range.
    pub fn action(&self, lane: usize) -> KeyAction {
        match (self.last.get(lane), self.current.get(lane)) {
            (Some(&last), Some(&now)) => KeyAction::from_states(last, now),
            _ => KeyAction::Idle,
        }
    }

    pub fn actions(&self) -> Vec<KeyAction> {
        (0..self.current.len()).map(|lane| self.action(lane)).collect()
    }

    pub fn pressed(&self) -> &[bool] {
        &self.current
    }

    /// Tick of the most recent press in `lane`, for key-flash effects.
    pub fn last_hit_tick(&self, lane: usize) -> Option<i64> {
        self.last_hit_tick.get(lane).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_from_edges() {
        assert_eq!(KeyAction::from_states(false, false), KeyAction::Idle);
        assert_eq!(KeyAction::from_states(false, true), KeyAction::Hit);
        assert_eq!(KeyAction::from_states(true, false), KeyAction::Release);
        assert_eq!(KeyAction::from_states(true, true), KeyAction::Hold);
    }

    #[test]
    fn tracker_sequence() {
        let mut keys = KeyTracker::new(2);
        keys.update(&[true, false], 1).unwrap();
        assert_eq!(keys.actions(), vec![KeyAction::Hit, KeyAction::Idle]);
        keys.update(&[true, true], 2).unwrap();
        assert_eq!(keys.actions(), vec![KeyAction::Hold, KeyAction::Hit]);
        keys.update(&[false, true], 3).unwrap();
        assert_eq!(keys.action(0), KeyAction::Release);
        assert_eq!(keys.pressed(), &[false, true]);
        assert_eq!(keys.last_hit_tick(0), Some(1));
        assert_eq!(keys.last_hit_tick(1), Some(2));
        assert_eq!(keys.action(9), KeyAction::Idle);
        assert_eq!(keys.last_hit_tick(9), None);
    }

    #[test]
    fn wrong_size_is_rejected_without_change() {
        let mut keys = KeyTracker::new(4);
        keys.update(&[true, false, false, false], 1).unwrap();
        let err = keys.update(&[true; 7], 2).unwrap_err();
        assert_eq!(
            err,
            PlayError::KeyCountMismatch {
                expected: 4,
                got: 7
            }
        );
        assert_eq!(keys.action(0), KeyAction::Hit);
    }
}
