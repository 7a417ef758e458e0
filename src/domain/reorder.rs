use crate::domain::models::TaskKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderRejection {
    #[error("invalid group: {0}")]
    UnknownGroup(String),
    #[error("invalid fromIndex: {index} for group with length {len}")]
    FromIndexOutOfRange { index: i64, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    Moved { kind: TaskKind, from: usize, to: usize },
    Unchanged,
    Rejected(ReorderRejection),
}

/// Resolves a requested move inside a group of `len` items.
///
/// `Ok(None)` means nothing to do. An out-of-range `to_index` is clamped into
/// `[0, len - 1]`; an out-of-range `from_index` is rejected.
pub fn plan_move(
    len: usize,
    from_index: i64,
    to_index: i64,
) -> Result<Option<(usize, usize)>, ReorderRejection> {
    let from = usize::try_from(from_index)
        .ok()
        .filter(|index| *index < len)
        .ok_or(ReorderRejection::FromIndexOutOfRange {
            index: from_index,
            len,
        })?;
    let last = len.saturating_sub(1);
    let to = usize::try_from(to_index.max(0)).unwrap_or(last).min(last);
    if from == to {
        return Ok(None);
    }
    Ok(Some((from, to)))
}

pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn forward_and_backward_moves() {
        let mut items = vec!["A", "B", "C"];
        move_item(&mut items, 0, 2);
        assert_eq!(items, vec!["B", "C", "A"]);
        move_item(&mut items, 2, 0);
        assert_eq!(items, vec!["A", "B", "C"]);
    }

    #[test]
    fn to_index_is_clamped() {
        assert_eq!(plan_move(3, 0, 5), Ok(Some((0, 2))));
        assert_eq!(plan_move(3, 2, -4), Ok(Some((2, 0))));
        assert_eq!(plan_move(3, 2, 9), Ok(None));
    }

    #[test]
    fn from_index_out_of_range_is_rejected() {
        assert_eq!(
            plan_move(3, 3, 0),
            Err(ReorderRejection::FromIndexOutOfRange { index: 3, len: 3 })
        );
        assert!(plan_move(3, -1, 0).is_err());
        assert!(plan_move(0, 0, 0).is_err());
    }

    #[test]
    fn same_slot_is_a_no_op() {
        assert_eq!(plan_move(4, 1, 1), Ok(None));
    }

    proptest! {
        #[test]
        fn move_is_a_permutation(len in 1usize..12, from in 0i64..12, to in -3i64..15) {
            let mut items = (0..len).collect::<Vec<_>>();
            match plan_move(len, from, to) {
                Ok(Some((from, to))) => {
                    move_item(&mut items, from, to);
                    prop_assert_eq!(items[to], from);
                }
                Ok(None) => {}
                Err(_) => prop_assert!(from as usize >= len),
            }
            let mut sorted = items.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
        }
    }
}
