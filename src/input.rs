//! Click routing: every interactive region registers a rect with a semantic
//! action ID during render, and mouse events hit-test against the registered
//! set. Action ID constants live in [`crate::actions`].

use ratzilla::ratatui::layout::Rect;

/// A screen region that triggers an action when clicked.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Shared between the render loop (writer) and the mouse handler (reader).
/// Targets are cleared and re-registered every frame so they always match
/// what is on screen.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-width, one-row target at `row` within `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.targets.push(ClickTarget {
                rect: Rect::new(area.x, row, area.width, 1),
                action_id,
            });
        }
    }

    /// Register targets for a horizontal tab bar from the padded label
    /// widths. Each target covers its label plus half of the adjacent
    /// separators; the first and last tabs extend to the area edges so the
    /// bar has no dead zones.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        let n = tab_widths.len();
        if n == 0 || total_width == 0 {
            return;
        }

        let mut starts: Vec<u16> = Vec::with_capacity(n);
        let mut cursor: u16 = 0;
        for (i, &(w, _)) in tab_widths.iter().enumerate() {
            if i > 0 {
                cursor += separator_width;
            }
            starts.push(cursor);
            cursor += w;
        }

        for i in 0..n {
            let (_, action_id) = tab_widths[i];

            let left = if i == 0 {
                0
            } else {
                let prev_end = starts[i - 1] + tab_widths[i - 1].0;
                prev_end + (starts[i] - prev_end) / 2
            };
            let right = if i == n - 1 {
                total_width
            } else {
                let cur_end = starts[i] + tab_widths[i].0;
                cur_end + (starts[i + 1] - cur_end) / 2
            };

            let w = right.saturating_sub(left);
            if w > 0 {
                self.add_click_target(Rect::new(x + left, y, w, height), action_id);
            }
        }
    }

    /// Hit-test a cell coordinate. Later-registered targets sit on top, so
    /// iterate in reverse and return the first match.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

impl Default for ClickState {
    fn default() -> Self {
        Self::new()
    }
}

/// Narrow screens stack the playfield above the panel instead of side by
/// side.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}

/// Convert a pixel Y coordinate (relative to the grid container's top edge)
/// to a terminal row. `None` outside the grid or on degenerate inputs.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }
    let cell_height = grid_height / terminal_rows as f64;
    let row = (click_y / cell_height) as u16;
    if row >= terminal_rows {
        return None;
    }
    Some(row)
}

/// Convert a pixel X coordinate to a terminal column.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    if grid_width <= 0.0 || terminal_cols == 0 || click_x < 0.0 {
        return None;
    }
    let cell_width = grid_width / terminal_cols as f64;
    let col = (click_x / cell_width) as u16;
    if col >= terminal_cols {
        None
    } else {
        Some(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions;

    #[test]
    fn hit_test_matches_rect_bounds() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(4, 6, 9, 1), 7);
        assert_eq!(cs.hit_test(4, 6), Some(7));
        assert_eq!(cs.hit_test(12, 6), Some(7));
        assert_eq!(cs.hit_test(13, 6), None);
        assert_eq!(cs.hit_test(4, 7), None);
        assert_eq!(cs.hit_test(3, 6), None);
    }

    #[test]
    fn hit_test_later_target_wins_on_overlap() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 80, 1), 1);
        cs.add_click_target(Rect::new(5, 5, 10, 1), 2);
        assert_eq!(cs.hit_test(7, 5), Some(2));
        assert_eq!(cs.hit_test(0, 5), Some(1));
        assert_eq!(cs.hit_test(20, 5), Some(1));
    }

    #[test]
    fn row_targets_outside_the_area_are_dropped() {
        let mut cs = ClickState::new();
        let area = Rect::new(5, 10, 30, 5);
        cs.add_row_target(area, 12, 99);
        cs.add_row_target(area, 9, 98);
        cs.add_row_target(area, 15, 97);
        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(15, 12), Some(99));
    }

    #[test]
    fn clear_targets_empties_the_set() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 1, 80, 1), 1);
        cs.clear_targets();
        assert_eq!(cs.hit_test(0, 1), None);
    }

    #[test]
    fn tab_targets_split_the_separators_and_cover_the_edges() {
        // Four panel tabs, padded labels 9/5/7/10 wide, " | " separator.
        let mut cs = ClickState::new();
        let tabs: Vec<(u16, u16)> = vec![
            (9, actions::TAB_CIRCLES),
            (5, actions::TAB_BOT),
            (7, actions::TAB_STATS),
            (10, actions::TAB_SETTINGS),
        ];
        cs.register_tab_targets(&tabs, 3, 0, 0, 60, 1);
        assert_eq!(cs.targets.len(), 4);
        assert_eq!(cs.hit_test(0, 0), Some(actions::TAB_CIRCLES));
        assert_eq!(cs.hit_test(11, 0), Some(actions::TAB_BOT));
        assert_eq!(cs.hit_test(59, 0), Some(actions::TAB_SETTINGS));
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(40));
        assert!(is_narrow_layout(69));
        assert!(!is_narrow_layout(70));
    }

    #[test]
    fn pixel_conversion_maps_cell_centers() {
        // 30-row grid at 15 px per cell.
        for row in 0..30u16 {
            let y = row as f64 * 15.0 + 7.5;
            assert_eq!(pixel_y_to_row(y, 450.0, 30), Some(row));
        }
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_x_to_col(0.0, 800.0, 80), Some(0));
        assert_eq!(pixel_x_to_col(799.0, 800.0, 80), Some(79));
        assert_eq!(pixel_x_to_col(800.0, 800.0, 80), None);
    }

    #[test]
    fn full_click_pipeline_reaches_a_circle_target() {
        let mut cs = ClickState::new();
        cs.terminal_cols = 80;
        cs.terminal_rows = 30;
        // A circle blob registered at (10, 8), 9 cells wide.
        cs.add_click_target(Rect::new(10, 8, 9, 1), actions::CIRCLE_TARGET_BASE + 2);

        let grid_width = 800.0;
        let grid_height = 450.0;
        let col = pixel_x_to_col(14.0 * 10.0 + 5.0, grid_width, 80).unwrap();
        let row = pixel_y_to_row(8.0 * 15.0 + 7.0, grid_height, 30).unwrap();
        assert_eq!(cs.hit_test(col, row), Some(actions::CIRCLE_TARGET_BASE + 2));
    }
}
