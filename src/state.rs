use std::path::PathBuf;

use crate::commands::Command;
use crate::filterexpr::{Filter, Predicate};
use crate::record::Record;
use crate::recordstore::RecordStore;
use crate::settings::Settings;
use crate::view::{Mode, SortDirection, ViewState};

/// All application state, owned by the controller loop. Commands mutate it,
/// the projector reads it.
pub struct AppState {
    pub settings: Settings,
    pub store: RecordStore,
    pub view: ViewState,
    pub path: PathBuf,
    pub running: bool,
    /// Something changed, redraw on the next pass.
    pub dirty: bool,
    /// Transient status message, cleared by the next key press.
    pub warning: Option<String>,
    /// The reload command asks the follower to start over; the controller
    /// forwards this to the follower thread.
    pub reload_requested: bool,
    /// Redraw from a cleared terminal, for control-l.
    pub force_clear: bool,
    /// Table rows of the last layout, used for page sizes.
    pub viewport_rows: usize,
    /// Record id under the cursor after the last projection.
    pub selected_seq: Option<usize>,
}

impl AppState {
    pub fn new(settings: Settings, path: PathBuf, follow: bool) -> AppState {
        let store = RecordStore::new(settings.global.max_column_width);
        AppState {
            view: ViewState::new(follow),
            settings,
            store,
            path,
            running: true,
            dirty: true,
            warning: None,
            reload_requested: false,
            force_clear: false,
            viewport_rows: 25,
            selected_seq: None,
        }
    }

    /// One line from the follower. Blank lines are skipped, anything else
    /// gets stored; lines that do not parse are logged and kept as raw text.
    /// In follow mode the cursor rides along with the file, but only while
    /// it already sat on the last row, so reading older rows is not
    /// interrupted.
    pub fn ingest_line(&mut self, line: String) {
        if line.trim().is_empty() {
            return;
        }
        let at_end = match self.view.cursor {
            None => true,
            Some(at) => self.view.matched == 0 || at >= self.view.matched - 1,
        };
        if let Err(err) = self.store.append(line) {
            log::debug!("kept as raw text, {}", err);
        }
        self.view.sync_columns(self.store.schema());
        if self.view.follow && at_end {
            self.view.cursor_to_end();
        }
        self.dirty = true;
    }

    /// Bulk ingestion for the initial file load.
    pub fn load_lines(&mut self, lines: Vec<String>) {
        let lines: Vec<String> = lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();
        let failed = self.store.append_all(lines);
        if failed > 0 {
            log::debug!("{} lines kept as raw text", failed);
        }
        self.view.sync_columns(self.store.schema());
        self.dirty = true;
    }

    pub fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warning = Some(message);
        self.dirty = true;
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Quit => self.running = false,
            Command::CursorUp => self.view.move_cursor(-1),
            Command::CursorDown => self.view.move_cursor(1),
            Command::PageUp => self.view.move_cursor(-self.page_step()),
            Command::PageDown => self.view.move_cursor(self.page_step()),
            Command::Top => self.view.cursor_to_start(),
            Command::Bottom => self.view.cursor_to_end(),
            Command::GotoRow => self.begin_goto_edit(),
            Command::ColumnLeft => self.view.move_anchor(-1),
            Command::ColumnRight => self.view.move_anchor(1),
            Command::FirstColumn => self.view.col_offset = 0,
            Command::LastColumn => self.view.anchor_to_last(),
            Command::SortCycle => self.cycle_sort(),
            Command::EditFilter => self.begin_filter_edit(),
            Command::EditSearch => self.begin_search_edit(),
            Command::ClearFilters => self.clear_filters(),
            Command::ToggleFollow => self.view.follow = !self.view.follow,
            Command::Reload => self.reload_requested = true,
            Command::ResetView => self.reset_view(),
            Command::ReorderColumns => self.begin_column_reorder(),
            Command::ToggleColumn => self.toggle_current_column(),
            Command::MoveColumnLeft => self.view.shift_current_column(-1),
            Command::MoveColumnRight => self.view.shift_current_column(1),
            Command::ToggleDetails => self.view.details = !self.view.details,
            Command::Help => self.view.mode = Mode::Help,
            Command::Refresh => self.force_clear = true,
        }
        self.dirty = true;
    }

    fn page_step(&self) -> i32 {
        self.viewport_rows.saturating_sub(1).max(1) as i32
    }

    /// s on the current column: ascending, then descending, then off.
    fn cycle_sort(&mut self) {
        let column = match self.view.current_column() {
            Some(name) => name.to_string(),
            None => return,
        };
        if self.view.sort_column.as_deref() == Some(column.as_str()) {
            match self.view.sort_direction {
                SortDirection::Ascending => self.view.sort_direction = SortDirection::Descending,
                SortDirection::Descending => self.view.sort_column = None,
            }
        } else {
            self.view.sort_column = Some(column);
            self.view.sort_direction = SortDirection::Ascending;
        }
    }

    fn begin_filter_edit(&mut self) {
        let column = match self.view.current_column() {
            Some(name) => name.to_string(),
            None => {
                self.warn("no column to filter yet".to_string());
                return;
            }
        };
        self.view.input = self
            .view
            .filters
            .get(&column)
            .map(|filter| filter.text.clone())
            .unwrap_or_default();
        self.view.input_cursor = self.view.input.len();
        self.view.input_column = column;
        self.view.input_ok = true;
        self.view.pending = Predicate::parse(&self.view.input).ok();
        self.view.mode = Mode::FilterEdit;
    }

    fn begin_search_edit(&mut self) {
        self.view.input = self
            .view
            .search
            .as_ref()
            .map(|filter| filter.text.clone())
            .unwrap_or_default();
        self.view.input_cursor = self.view.input.len();
        self.view.input_ok = true;
        self.view.pending = Predicate::parse(&self.view.input).ok();
        self.view.mode = Mode::SearchEdit;
    }

    fn begin_goto_edit(&mut self) {
        self.view.input.clear();
        self.view.input_cursor = 0;
        self.view.input_ok = true;
        self.view.pending = None;
        self.view.mode = Mode::GotoEdit;
    }

    /// Recompile the edit buffer after a keystroke. While it does not
    /// compile, the last good predicate stays applied and the footer shows
    /// the input highlighted as broken.
    pub fn refresh_pending(&mut self) {
        match Predicate::parse(&self.view.input) {
            Ok(predicate) => {
                self.view.pending = Some(predicate);
                self.view.input_ok = true;
            }
            Err(_) => {
                self.view.input_ok = false;
            }
        }
    }

    pub fn cancel_input(&mut self) {
        self.view.mode = Mode::Normal;
        self.view.input.clear();
        self.view.input_cursor = 0;
        self.view.input_ok = true;
        self.view.pending = None;
    }

    /// Enter in FilterEdit. Empty text removes the filter; text that does
    /// not parse keeps the mode open with the error in the footer.
    pub fn commit_filter(&mut self) {
        let text = self.view.input.clone();
        let column = self.view.input_column.clone();
        if text.is_empty() {
            self.view.filters.remove(&column);
            self.cancel_input();
            return;
        }
        match Filter::parse(&text) {
            Ok(filter) => {
                self.view.filters.insert(column, filter);
                self.cancel_input();
            }
            Err(err) => {
                self.view.input_ok = false;
                self.warn(format!("invalid filter: {}", err));
            }
        }
    }

    /// Enter in GotoEdit. Rows are counted from 1 within the filtered view,
    /// the same numbers the footer shows; past-the-end lands on the last
    /// row, 0 moves nowhere.
    pub fn commit_goto(&mut self) {
        let text = self.view.input.trim().to_string();
        if text.is_empty() {
            self.cancel_input();
            return;
        }
        match text.parse::<usize>() {
            Ok(row) => {
                if row >= 1 {
                    // clamped to the last matching row by the next projection
                    self.view.cursor = Some(row - 1);
                }
                self.cancel_input();
            }
            Err(_) => {
                self.view.input_ok = false;
                self.warn(format!("not a row number: {}", text));
            }
        }
    }

    pub fn commit_search(&mut self) {
        let text = self.view.input.clone();
        if text.is_empty() {
            self.view.search = None;
            self.cancel_input();
            return;
        }
        match Filter::parse(&text) {
            Ok(filter) => {
                self.view.search = Some(filter);
                self.cancel_input();
            }
            Err(err) => {
                self.view.input_ok = false;
                self.warn(format!("invalid search: {}", err));
            }
        }
    }

    fn clear_filters(&mut self) {
        self.view.filters.clear();
        self.view.search = None;
    }

    /// R: back to the bare view of the same data.
    fn reset_view(&mut self) {
        let follow = self.view.follow;
        self.view = ViewState::new(follow);
        self.view.sync_columns(self.store.schema());
        self.selected_seq = None;
    }

    fn begin_column_reorder(&mut self) {
        if self.view.columns.is_empty() {
            self.warn("no columns yet".to_string());
            return;
        }
        // start on the current column
        let current = self.view.current_column().map(|name| name.to_string());
        self.view.reorder_index = current
            .and_then(|name| self.view.columns.iter().position(|c| c.name == name))
            .unwrap_or(0);
        self.view.mode = Mode::ColumnReorder;
    }

    /// v/space in reorder mode: flip visibility of the selected column.
    pub fn toggle_reorder_column(&mut self) {
        let at = self.view.reorder_index;
        if at >= self.view.columns.len() {
            return;
        }
        self.view.columns[at].visible = !self.view.columns[at].visible;
        self.after_visibility_change(at);
    }

    /// v in normal mode: hide the current column. Unhiding happens in
    /// reorder mode, where hidden columns are still listed.
    fn toggle_current_column(&mut self) {
        let column = match self.view.current_column() {
            Some(name) => name.to_string(),
            None => return,
        };
        if let Some(at) = self.view.columns.iter().position(|c| c.name == column) {
            self.view.columns[at].visible = false;
            self.after_visibility_change(at);
        }
    }

    fn after_visibility_change(&mut self, at: usize) {
        let column = &self.view.columns[at];
        if !column.visible && self.view.sort_column.as_deref() == Some(column.name.as_str()) {
            // the sorted column is gone, back to natural order
            self.view.sort_column = None;
        }
        let count = self.view.visible_count();
        if count == 0 {
            self.view.col_offset = 0;
        } else if self.view.col_offset >= count {
            self.view.col_offset = count - 1;
        }
    }

    /// The follower saw the file shrink. Everything derived from the old
    /// content is gone, only the follow flag survives.
    pub fn on_truncated(&mut self) {
        self.store.reset();
        let follow = self.view.follow;
        self.view = ViewState::new(follow);
        self.selected_seq = None;
        self.warn("file truncated, reading from the start".to_string());
    }

    /// The follower restarted after a reload request. Data restarts from
    /// nothing but filters, search and sort stay as the user set them.
    pub fn on_reloaded(&mut self) {
        self.store.reset();
        self.view.clear_rows();
        self.selected_seq = None;
        self.dirty = true;
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.selected_seq.and_then(|seq| self.store.get(seq))
    }

    /// Lines the details pane takes, bounded to half the terminal.
    pub fn details_height(&self, terminal_height: u16) -> u16 {
        if !self.view.details {
            return 0;
        }
        match self.selected_record() {
            Some(record) => (record.fields.len() as u16 + 2).min(terminal_height / 2),
            None => 0,
        }
    }
}
