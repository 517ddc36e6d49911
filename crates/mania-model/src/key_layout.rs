// Key layout: maps a lane configuration to the ordered physical keys.
//
// One pure lookup instead of a table keyed by lane count plus scratch bits;
// unsupported configurations are rejected at chart load.

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Physical keyboard keys used by the default layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    S,
    D,
    F,
    V,
    N,
    J,
    K,
    L,
    Semicolon,
    Space,
    LeftShift,
    RightShift,
}

/// Side of the optional extra scratch lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScratchSide {
    #[default]
    None,
    Left,
    Right,
}

fn base_layout(lanes: u8) -> Option<&'static [Key]> {
    use Key::*;
    let keys: &'static [Key] = match lanes {
        4 => &[D, F, J, K],
        5 => &[D, F, Space, J, K],
        6 => &[S, D, F, J, K, L],
        7 => &[S, D, F, Space, J, K, L],
        8 => &[A, S, D, F, J, K, L, Semicolon],
        9 => &[A, S, D, F, Space, J, K, L, Semicolon],
        10 => &[A, S, D, F, V, N, J, K, L, Semicolon],
        _ => return None,
    };
    Some(keys)
}

/// Ordered physical keys for `lanes` total lanes (scratch included).
///
/// With a scratch side the scratch lane takes one of the lanes, so the rest
/// use the `lanes - 1` layout. Left scratch sits on `A` unless that layout
/// already uses it, right scratch on `;` likewise.
pub fn key_layout(lanes: u8, scratch: ScratchSide) -> Result<Vec<Key>, ModelError> {
    let unsupported = || ModelError::LaneCountUnsupported { lanes, scratch };
    let base_lanes = match scratch {
        ScratchSide::None => lanes,
        ScratchSide::Left | ScratchSide::Right => lanes.checked_sub(1).ok_or_else(unsupported)?,
    };
    let base = base_layout(base_lanes).ok_or_else(unsupported)?;

    let mut keys = Vec::with_capacity(lanes as usize);
    match scratch {
        ScratchSide::None => keys.extend_from_slice(base),
        ScratchSide::Left => {
            let scratch_key = if base.contains(&Key::A) {
                Key::LeftShift
            } else {
                Key::A
            };
            keys.push(scratch_key);
            keys.extend_from_slice(base);
        }
        ScratchSide::Right => {
            let scratch_key = if base.contains(&Key::Semicolon) {
                Key::RightShift
            } else {
                Key::Semicolon
            };
            keys.extend_from_slice(base);
            keys.push(scratch_key);
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Key::*;

    #[test]
    fn plain_layouts_cover_four_to_ten() {
        for lanes in 4..=10 {
            let keys = key_layout(lanes, ScratchSide::None).unwrap();
            assert_eq!(keys.len(), lanes as usize);
        }
        assert_eq!(key_layout(4, ScratchSide::None).unwrap(), vec![D, F, J, K]);
        assert_eq!(
            key_layout(7, ScratchSide::None).unwrap(),
            vec![S, D, F, Space, J, K, L]
        );
    }

    #[test]
    fn eight_key_left_scratch_matches_classic_row() {
        assert_eq!(
            key_layout(8, ScratchSide::Left).unwrap(),
            vec![A, S, D, F, Space, J, K, L]
        );
    }

    #[test]
    fn scratch_key_avoids_duplicates() {
        let keys = key_layout(11, ScratchSide::Left).unwrap();
        assert_eq!(keys[0], LeftShift);
        assert_eq!(keys.len(), 11);

        let keys = key_layout(5, ScratchSide::Right).unwrap();
        assert_eq!(keys, vec![D, F, J, K, Semicolon]);

        let keys = key_layout(9, ScratchSide::Right).unwrap();
        assert_eq!(*keys.last().unwrap(), RightShift);
    }

    #[test]
    fn layouts_never_repeat_a_key() {
        for side in [ScratchSide::None, ScratchSide::Left, ScratchSide::Right] {
            for lanes in 1..=12 {
                if let Ok(keys) = key_layout(lanes, side) {
                    let mut seen = keys.clone();
                    seen.sort_by_key(|k| *k as u8);
                    seen.dedup();
                    assert_eq!(seen.len(), keys.len(), "{lanes} {side:?}");
                }
            }
        }
    }

    #[test]
    fn unsupported_counts_are_rejected() {
        assert_eq!(
            key_layout(3, ScratchSide::None),
            Err(ModelError::LaneCountUnsupported {
                lanes: 3,
                scratch: ScratchSide::None
            })
        );
        assert!(key_layout(11, ScratchSide::None).is_err());
        assert!(key_layout(4, ScratchSide::Left).is_err());
        assert!(key_layout(0, ScratchSide::Right).is_err());
        assert!(key_layout(12, ScratchSide::Right).is_err());
    }
}
