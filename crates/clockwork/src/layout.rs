use crate::geometry::{Point, Rect};
use crate::group::GroupKind;
use serde::Serialize;

pub const TITLE_SPACE: f64 = 56.0;
pub const PADDING: f64 = 16.0;
pub const LEGEND_SPACE: f64 = 40.0;
pub const CELL_GAP: f64 = 6.0;
const RACING_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DialLayout {
    pub center: Point,
    pub radius: f64,
    pub title_anchor: Point,
}

impl DialLayout {
    pub fn fit(width: f64, height: f64) -> Self {
        Self::fit_rect(Rect::new(0.0, 0.0, width, height))
    }

    /// Largest dial that fits under the title band of `cell`, never smaller than 1px.
    pub fn fit_rect(cell: Rect) -> Self {
        let (w, h) = (cell.width(), cell.height());
        let usable_h = (h - TITLE_SPACE).max(1.0);
        let radius = ((w - 2.0 * PADDING).min(usable_h - 2.0 * PADDING) / 2.0).max(1.0);
        Self {
            center: Point::new(cell.left + w / 2.0, cell.top + TITLE_SPACE + usable_h / 2.0),
            radius,
            title_anchor: Point::new(cell.left + w / 2.0, cell.top + PADDING),
        }
    }
}

pub struct TrackLayout;

impl TrackLayout {
    /// The track's bar, or `None` when the canvas is too short to draw one.
    pub fn fit(width: f64, height: f64) -> Option<Rect> {
        let top = TITLE_SPACE + PADDING;
        let bottom = height - PADDING - LEGEND_SPACE;
        if bottom <= top + 10.0 {
            return None;
        }
        Some(Rect::new(PADDING, top, width - PADDING, bottom))
    }
}

pub fn group_columns(kind: GroupKind, width: f64) -> usize {
    match kind {
        GroupKind::Racing => RACING_COLUMNS,
        GroupKind::Linked if width < 760.0 => 1,
        GroupKind::Linked if width < 1100.0 => 2,
        GroupKind::Linked => 3,
    }
}

pub fn group_cells(kind: GroupKind, dial_count: usize, width: f64, height: f64) -> Vec<Rect> {
    if dial_count == 0 {
        return Vec::new();
    }
    let cols = group_columns(kind, width).min(dial_count);
    let rows = dial_count.div_ceil(cols);
    let (cell_w, cell_h) = (width / cols as f64, height / rows as f64);
    (0..dial_count)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            let left = col as f64 * cell_w;
            let top = row as f64 * cell_h;
            Rect::new(
                left + CELL_GAP,
                top + CELL_GAP,
                left + cell_w - CELL_GAP,
                top + cell_h - CELL_GAP,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dial_fit() {
        let layout = DialLayout::fit(900.0, 650.0);
        assert_eq!(layout.center, Point::new(450.0, 56.0 + 297.0));
        assert_eq!(layout.radius, (594.0 - 32.0) / 2.0);
    }

    #[test]
    fn test_dial_fit_degenerate() {
        let layout = DialLayout::fit(10.0, 10.0);
        assert_eq!(layout.radius, 1.0);
    }

    #[test]
    fn test_track_fit() {
        let rect = TrackLayout::fit(900.0, 650.0).unwrap();
        assert_eq!(rect, Rect::new(16.0, 72.0, 884.0, 594.0));
        assert!(TrackLayout::fit(900.0, 130.0).is_none());
    }

    #[test]
    fn test_linked_breakpoints() {
        assert_eq!(group_columns(GroupKind::Linked, 700.0), 1);
        assert_eq!(group_columns(GroupKind::Linked, 900.0), 2);
        assert_eq!(group_columns(GroupKind::Linked, 1100.0), 3);
        assert_eq!(group_columns(GroupKind::Racing, 100.0), 3);
    }

    #[test]
    fn test_group_cells_rows_of_three() {
        let cells = group_cells(GroupKind::Racing, 5, 900.0, 600.0);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0], Rect::new(6.0, 6.0, 294.0, 294.0));
        assert_eq!(cells[4].top, 306.0);
        assert_eq!(cells[4].left, 306.0);

        let pair = group_cells(GroupKind::Racing, 2, 900.0, 600.0);
        assert_eq!(pair[1].right, 894.0);
    }
}
