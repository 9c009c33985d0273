//! Pure projection of the record store through the view state: filter,
//! sort, then cut the visible window and lay out padded cells. No drawing
//! happens here, which is what keeps the whole pipeline testable.

use std::cmp::Ordering;

use crate::filterexpr::Predicate;
use crate::record::{Record, Value};
use crate::recordstore::RecordStore;
use crate::utils;
use crate::view::{Mode, SortDirection, ViewState};

#[derive(Debug)]
pub struct GridColumn {
    pub name: String,
    pub width: usize,
    pub sort: Option<SortDirection>,
    pub filtered: bool,
}

#[derive(Debug)]
pub struct GridRow {
    /// Record id, for the details pane.
    pub seq: usize,
    /// One cell per grid column, already truncated and padded.
    pub cells: Vec<String>,
    pub selected: bool,
    pub parsed: bool,
}

/// One screenful of cells plus the counts the footer needs. The offsets and
/// cursor are the clamped values actually used; the caller stores them back
/// into the view so it never drifts out of range.
#[derive(Debug)]
pub struct Grid {
    pub columns: Vec<GridColumn>,
    pub rows: Vec<GridRow>,
    pub matched: usize,
    pub total: usize,
    pub parse_errors: usize,
    pub row_offset: usize,
    pub col_offset: usize,
    pub cursor: Option<usize>,
}

pub fn project(
    store: &RecordStore,
    view: &ViewState,
    height: usize,
    width: usize,
    min_column_width: usize,
) -> Grid {
    let records = store.records();

    // active filters, with the edit buffer overlaid while it is being typed
    let mut filters: Vec<(&str, &Predicate)> = view
        .filters
        .iter()
        .map(|(column, filter)| (column.as_str(), &filter.predicate))
        .collect();
    if view.mode == Mode::FilterEdit {
        if let Some(pending) = view.pending.as_ref() {
            filters.retain(|(column, _)| *column != view.input_column.as_str());
            filters.push((view.input_column.as_str(), pending));
        }
    }
    let search: Option<&Predicate> = if view.mode == Mode::SearchEdit && view.pending.is_some() {
        view.pending.as_ref()
    } else {
        view.search.as_ref().map(|filter| &filter.predicate)
    };

    let mut matched: Vec<usize> = Vec::new();
    for (at, record) in records.iter().enumerate() {
        if record_matches(record, &filters, search) {
            matched.push(at);
        }
    }

    if let Some(sort_column) = view.sort_column.as_deref() {
        let descending = view.sort_direction == SortDirection::Descending;
        let mut keyed: Vec<(usize, Option<SortKey>)> = matched
            .into_iter()
            .map(|at| (at, sort_key(&records[at], sort_column)))
            .collect();
        keyed.sort_by(|a, b| compare_rows(a, b, descending));
        matched = keyed.into_iter().map(|(at, _)| at).collect();
    }

    let match_count = matched.len();

    // vertical window, pulled along so the cursor stays inside it
    let cursor = if match_count == 0 {
        None
    } else {
        Some(view.cursor.unwrap_or(0).min(match_count - 1))
    };
    let mut row_offset = view.row_offset.min(match_count.saturating_sub(height));
    if height > 0 {
        if let Some(at) = cursor {
            if at < row_offset {
                row_offset = at;
            } else if at >= row_offset + height {
                row_offset = at + 1 - height;
            }
        }
    }

    // horizontal window: the current column is the leftmost one, then as
    // many more as fit
    let visible: Vec<(&str, usize)> = view
        .columns
        .iter()
        .filter(|column| column.visible)
        .map(|column| {
            let width = store
                .schema()
                .width_of(&column.name)
                .unwrap_or_else(|| column.name.chars().count());
            (column.name.as_str(), width.max(min_column_width))
        })
        .collect();
    let col_offset = if visible.is_empty() {
        0
    } else {
        view.col_offset.min(visible.len() - 1)
    };

    let mut columns: Vec<GridColumn> = Vec::new();
    let mut used = 0;
    for (name, column_width) in visible.iter().skip(col_offset) {
        // one space between columns
        let needed = column_width + if columns.is_empty() { 0 } else { 1 };
        if !columns.is_empty() && used + needed > width {
            break;
        }
        used += needed;
        columns.push(GridColumn {
            name: name.to_string(),
            width: *column_width,
            sort: if view.sort_column.as_deref() == Some(*name) {
                Some(view.sort_direction)
            } else {
                None
            },
            filtered: view.filters.contains_key(*name),
        });
    }

    let end = (row_offset + height).min(match_count);
    let window = matched.get(row_offset..end).unwrap_or(&[]);
    let mut rows = Vec::with_capacity(window.len());
    for (offset, &record_index) in window.iter().enumerate() {
        let record = &records[record_index];
        let cells = columns
            .iter()
            .map(|column| {
                let text = utils::sanitize_text(&record.render_field(&column.name));
                utils::truncate_pad(&text, column.width)
            })
            .collect();
        rows.push(GridRow {
            seq: record.seq,
            cells,
            selected: cursor == Some(row_offset + offset),
            parsed: record.parsed,
        });
    }

    Grid {
        columns,
        rows,
        matched: match_count,
        total: store.len(),
        parse_errors: store.parse_error_count(),
        row_offset,
        col_offset,
        cursor,
    }
}

fn record_matches(record: &Record, filters: &[(&str, &Predicate)], search: Option<&Predicate>) -> bool {
    for (column, predicate) in filters {
        if !predicate.matches(&record.render_field(column)) {
            return false;
        }
    }
    match search {
        None => true,
        Some(predicate) => {
            if predicate.matches(&record.original) {
                return true;
            }
            record
                .fields
                .iter()
                .any(|(_, value)| predicate.matches(&value.render()))
        }
    }
}

/// Typed sort key: numbers compare numerically and come before text, text
/// compares case-insensitively. Grouping by kind keeps the order total, so
/// a column mixing "2", "10" and "abc" sorts the same way every time.
enum SortKey {
    Num(f64),
    Text(String),
}

fn sort_key(record: &Record, column: &str) -> Option<SortKey> {
    match record.get(column) {
        None => None,
        Some(Value::Null) => None,
        Some(value) => {
            let rendered = value.render();
            match rendered.parse::<f64>() {
                Ok(number) if number.is_finite() => Some(SortKey::Num(number)),
                _ => Some(SortKey::Text(rendered.to_lowercase())),
            }
        }
    }
}

fn compare_rows(
    a: &(usize, Option<SortKey>),
    b: &(usize, Option<SortKey>),
    descending: bool,
) -> Ordering {
    let ordering = match (&a.1, &b.1) {
        (None, None) => Ordering::Equal,
        // rows without a value stay at the end in both directions
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(left), Some(right)) => compare_keys(left, right),
    };
    let ordering = if descending {
        ordering.reverse()
    } else {
        ordering
    };
    // ties keep ingestion order
    ordering.then(a.0.cmp(&b.0))
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Num(left), SortKey::Num(right)) => {
            left.partial_cmp(right).unwrap_or(Ordering::Equal)
        }
        (SortKey::Num(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Num(_)) => Ordering::Greater,
        (SortKey::Text(left), SortKey::Text(right)) => left.cmp(right),
    }
}
