use std::collections::HashMap;

use crate::filterexpr::{Filter, Predicate};
use crate::schema::Schema;

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Mode {
    Normal,
    FilterEdit,
    SearchEdit,
    GotoEdit,
    ColumnReorder,
    Help,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct ColumnView {
    pub name: String,
    pub visible: bool,
}

/// Everything the user can change about how records are shown, and nothing
/// about the records themselves. Offsets and the cursor may go stale as data
/// arrives; every projection clamps them and the clamped values are written
/// back here.
#[derive(Debug)]
pub struct ViewState {
    pub mode: Mode,

    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,

    /// Per-column filters, all must match.
    pub filters: HashMap<String, Filter>,
    /// Global search over every field and the raw line.
    pub search: Option<Filter>,

    /// Schema columns in display order, with visibility. Grows as the
    /// schema grows.
    pub columns: Vec<ColumnView>,

    /// First displayed row, as an index into the filtered rows.
    pub row_offset: usize,
    /// The current column: index into the visible columns, and also the
    /// leftmost column drawn.
    pub col_offset: usize,
    /// Index into the filtered rows, None while there are none.
    pub cursor: Option<usize>,
    /// Filtered row count from the last projection.
    pub matched: usize,

    pub follow: bool,
    pub details: bool,

    /// Selected entry in column reorder mode, index into `columns`.
    pub reorder_index: usize,

    // Text being edited in FilterEdit and SearchEdit modes.
    pub input: String,
    pub input_cursor: usize,
    /// Which column a FilterEdit commit applies to.
    pub input_column: String,
    /// False while the input does not compile to a predicate.
    pub input_ok: bool,
    /// Last predicate the input compiled to, applied live while editing.
    pub pending: Option<Predicate>,
}

impl ViewState {
    pub fn new(follow: bool) -> ViewState {
        ViewState {
            mode: Mode::Normal,
            sort_column: None,
            sort_direction: SortDirection::Ascending,
            filters: HashMap::new(),
            search: None,
            columns: Vec::new(),
            row_offset: 0,
            col_offset: 0,
            cursor: None,
            matched: 0,
            follow,
            details: false,
            reorder_index: 0,
            input: String::new(),
            input_cursor: 0,
            input_column: String::new(),
            input_ok: true,
            pending: None,
        }
    }

    /// Pick up columns the schema gained since last time. Order and
    /// visibility of known columns stay as the user arranged them.
    pub fn sync_columns(&mut self, schema: &Schema) {
        for column in schema.columns() {
            if !self.columns.iter().any(|c| c.name == column.name) {
                self.columns.push(ColumnView {
                    name: column.name.clone(),
                    visible: true,
                });
            }
        }
    }

    pub fn visible_count(&self) -> usize {
        self.columns.iter().filter(|column| column.visible).count()
    }

    /// Name of the current column, the one the anchor points at.
    pub fn current_column(&self) -> Option<&str> {
        let count = self.visible_count();
        if count == 0 {
            return None;
        }
        self.columns
            .iter()
            .filter(|column| column.visible)
            .nth(self.col_offset.min(count - 1))
            .map(|column| column.name.as_str())
    }

    pub fn move_cursor(&mut self, delta: i32) {
        if self.matched == 0 {
            self.cursor = None;
            return;
        }
        let max = self.matched - 1;
        let current = self.cursor.unwrap_or(0).min(max);
        let moved = (current as i64 + delta as i64).clamp(0, max as i64);
        self.cursor = Some(moved as usize);
    }

    pub fn cursor_to_start(&mut self) {
        self.cursor = if self.matched == 0 { None } else { Some(0) };
    }

    pub fn cursor_to_end(&mut self) {
        // clamped to the last matching row by the next projection
        self.cursor = Some(usize::MAX);
    }

    pub fn move_anchor(&mut self, delta: i32) {
        let count = self.visible_count();
        if count == 0 {
            self.col_offset = 0;
            return;
        }
        let current = self.col_offset.min(count - 1);
        let moved = (current as i64 + delta as i64).clamp(0, count as i64 - 1);
        self.col_offset = moved as usize;
    }

    pub fn anchor_to_last(&mut self) {
        self.col_offset = self.visible_count().saturating_sub(1);
    }

    /// Swap the current column with its nearest visible neighbour. The
    /// anchor follows the column it was on.
    pub fn shift_current_column(&mut self, delta: i32) {
        let visible: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.visible)
            .map(|(at, _)| at)
            .collect();
        if visible.is_empty() {
            return;
        }
        let at = self.col_offset.min(visible.len() - 1);
        let neighbour = at as i64 + delta as i64;
        if neighbour < 0 || neighbour >= visible.len() as i64 {
            return;
        }
        let neighbour = neighbour as usize;
        self.columns.swap(visible[at], visible[neighbour]);
        self.col_offset = neighbour;
    }

    pub fn move_reorder_selection(&mut self, delta: i32) {
        if self.columns.is_empty() {
            return;
        }
        let max = self.columns.len() - 1;
        let current = self.reorder_index.min(max);
        let moved = (current as i64 + delta as i64).clamp(0, max as i64);
        self.reorder_index = moved as usize;
    }

    /// Move the column selected in reorder mode one slot, selection follows.
    pub fn shift_reorder_column(&mut self, delta: i32) {
        if self.columns.is_empty() {
            return;
        }
        let target = self.reorder_index as i64 + delta as i64;
        if target < 0 || target >= self.columns.len() as i64 {
            return;
        }
        let target = target as usize;
        self.columns.swap(self.reorder_index, target);
        self.reorder_index = target;
    }

    /// Forget row and column positions but keep filters, search and sort.
    /// Used when the same file is read again from the start.
    pub fn clear_rows(&mut self) {
        self.columns.clear();
        self.row_offset = 0;
        self.col_offset = 0;
        self.cursor = None;
        self.matched = 0;
        self.reorder_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_with(names: &[&str]) -> Schema {
        let mut schema = Schema::new(48);
        for name in names {
            schema.observe(name, 1);
        }
        schema
    }

    #[test]
    fn test_move_cursor_clamps_to_matched_rows() {
        let mut view = ViewState::new(false);
        view.matched = 5;
        view.cursor = Some(0);
        view.move_cursor(-1);
        assert_eq!(view.cursor, Some(0));
        view.move_cursor(100);
        assert_eq!(view.cursor, Some(4));
        view.matched = 0;
        view.move_cursor(1);
        assert_eq!(view.cursor, None);
    }

    #[test]
    fn test_sync_columns_only_appends() {
        let mut view = ViewState::new(false);
        view.sync_columns(&schema_with(&["a", "b"]));
        view.columns[0].visible = false;
        view.sync_columns(&schema_with(&["a", "b", "c"]));
        let names: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(!view.columns[0].visible);
    }

    #[test]
    fn test_current_column_skips_hidden_ones() {
        let mut view = ViewState::new(false);
        view.sync_columns(&schema_with(&["a", "b", "c"]));
        view.columns[1].visible = false;
        view.col_offset = 1;
        assert_eq!(view.current_column(), Some("c"));
    }

    #[test]
    fn test_shift_current_column_follows_the_column() {
        let mut view = ViewState::new(false);
        view.sync_columns(&schema_with(&["a", "b", "c"]));
        view.col_offset = 0;
        view.shift_current_column(1);
        let names: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(view.col_offset, 1);
        assert_eq!(view.current_column(), Some("a"));
    }

    #[test]
    fn test_shift_current_column_skips_hidden_neighbours() {
        let mut view = ViewState::new(false);
        view.sync_columns(&schema_with(&["a", "b", "c"]));
        view.columns[1].visible = false;
        view.col_offset = 0;
        view.shift_current_column(1);
        let names: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
        // "a" and "c" swap around the hidden "b"
        assert_eq!(names, vec!["c", "b", "a"]);
        assert_eq!(view.current_column(), Some("a"));
    }

    #[test]
    fn test_reorder_moves_stop_at_the_edges() {
        let mut view = ViewState::new(false);
        view.sync_columns(&schema_with(&["a", "b"]));
        view.reorder_index = 0;
        view.shift_reorder_column(-1);
        assert_eq!(view.reorder_index, 0);
        view.shift_reorder_column(1);
        assert_eq!(view.reorder_index, 1);
        let names: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
