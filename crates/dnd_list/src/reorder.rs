use gpui::{Bounds, Pixels, Point};

pub fn reorder_to_index_for_drop_on_row(from_ix: usize, target_ix: usize, item_count: usize) -> usize {
    let gap_index = if target_ix < from_ix {
        target_ix
    } else if target_ix > from_ix {
        target_ix.saturating_add(1)
    } else {
        from_ix
    };

    reorder_to_index_from_gap(from_ix, gap_index, item_count)
}

/// Destination index (in the post-drop list) for dropping row `from_ix` into the gap
/// before row `gap_index`. Gap `item_count` is after the last row.
fn reorder_to_index_from_gap(from_ix: usize, gap_index: usize, item_count: usize) -> usize {
    let mut to_ix = gap_index;
    if to_ix > from_ix {
        to_ix = to_ix.saturating_sub(1);
    }
    to_ix.min(item_count.saturating_sub(1))
}

/// The row whose bounds contain `pointer`.
pub fn row_at_position(rows: &[Bounds<Pixels>], pointer: Point<Pixels>) -> Option<usize> {
    rows.iter().position(|bounds| bounds.contains(&pointer))
}

/// Where row `from_ix` lands when released at `pointer`.
///
/// `None` when the pointer is outside every row or over the dragged row itself.
pub fn drop_destination(
    rows: &[Bounds<Pixels>],
    from_ix: usize,
    pointer: Point<Pixels>,
) -> Option<usize> {
    let target_ix = row_at_position(rows, pointer)?;
    if target_ix == from_ix || from_ix >= rows.len() {
        return None;
    }
    let to_ix = reorder_to_index_for_drop_on_row(from_ix, target_ix, rows.len());
    (to_ix != from_ix).then_some(to_ix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::{point, px, size};

    fn reorder(ids: &[&'static str], from: usize, to: usize) -> Vec<&'static str> {
        let mut ids = ids.to_vec();
        let id = ids.remove(from);
        ids.insert(to, id);
        ids
    }

    fn rows(count: usize) -> Vec<Bounds<Pixels>> {
        (0..count)
            .map(|ix| Bounds::new(point(px(0.), px(ix as f32 * 20.)), size(px(200.), px(20.))))
            .collect()
    }

    #[test]
    fn dropping_last_row_on_first_moves_it_to_front() {
        let to = reorder_to_index_for_drop_on_row(2, 0, 3);
        assert_eq!(to, 0);
        assert_eq!(reorder(&["A", "B", "C"], 2, to), vec!["C", "A", "B"]);
    }

    #[test]
    fn dropping_row_on_itself_is_a_no_op() {
        assert_eq!(reorder_to_index_for_drop_on_row(0, 0, 3), 0);
        assert_eq!(reorder_to_index_for_drop_on_row(1, 1, 3), 1);
    }

    #[test]
    fn moving_down_takes_the_target_slot() {
        let to = reorder_to_index_for_drop_on_row(0, 2, 4);
        assert_eq!(to, 2);
        assert_eq!(reorder(&["A", "B", "C", "D"], 0, to), vec!["B", "C", "A", "D"]);
        assert_eq!(reorder_to_index_for_drop_on_row(1, 3, 4), 3);
    }

    #[test]
    fn row_hit_testing_uses_both_axes() {
        let rows = rows(3);
        assert_eq!(row_at_position(&rows, point(px(10.), px(5.))), Some(0));
        assert_eq!(row_at_position(&rows, point(px(10.), px(45.))), Some(2));
        assert_eq!(row_at_position(&rows, point(px(10.), px(75.))), None);
        assert_eq!(row_at_position(&rows, point(px(250.), px(5.))), None);
        assert_eq!(row_at_position(&[], point(px(0.), px(0.))), None);
    }

    #[test]
    fn release_on_first_row_moves_last_to_front() {
        let rows = rows(3);
        let to = drop_destination(&rows, 2, point(px(50.), px(4.)));
        assert_eq!(to, Some(0));
        assert_eq!(reorder(&["A", "B", "C"], 2, 0), vec!["C", "A", "B"]);
    }

    #[test]
    fn release_on_own_row_does_nothing() {
        let rows = rows(3);
        assert_eq!(drop_destination(&rows, 1, point(px(50.), px(30.))), None);
    }

    #[test]
    fn release_outside_the_list_does_nothing() {
        let rows = rows(3);
        assert_eq!(drop_destination(&rows, 0, point(px(50.), px(560.))), None);
        assert_eq!(drop_destination(&rows, 2, point(px(50.), px(-400.))), None);
        assert_eq!(drop_destination(&rows, 0, point(px(900.), px(30.))), None);
    }

    #[test]
    fn stale_source_index_does_nothing() {
        let rows = rows(2);
        assert_eq!(drop_destination(&rows, 5, point(px(10.), px(5.))), None);
    }
}
