use std::io;

use ratatui::{prelude::*, widgets::*};

use crate::commands::Command;
use crate::projector::Grid;
use crate::record::{Record, Value};
use crate::state::AppState;
use crate::utils;
use crate::view::{Mode, SortDirection};

/// Thin wrapper around the terminal. All drawing goes through `render`,
/// which paints whatever the given state and grid say; it keeps no state of
/// its own.
pub struct Tui {
    pub terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Tui {
    pub fn new() -> io::Result<Tui> {
        let terminal = ratatui::init();
        Ok(Tui { terminal })
    }

    pub fn size(&self) -> io::Result<Size> {
        self.terminal.size()
    }

    pub fn render(&mut self, state: &AppState, grid: &Grid) -> io::Result<()> {
        let table = Self::render_table(state, grid);
        let footer = Self::render_footer(state, grid);
        let details = if state.view.details {
            state.selected_record().map(|record| Self::render_details(state, record))
        } else {
            None
        };

        self.terminal.draw(|frame| {
            let area = frame.area();
            let details_height = state.details_height(area.height);
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(0),
                    Constraint::Length(details_height),
                    Constraint::Length(1),
                ])
                .split(area);

            frame.render_widget(table, chunks[0]);
            if let Some(details) = details {
                frame.render_widget(details, chunks[1]);
            }
            frame.render_widget(footer, chunks[2]);

            match state.view.mode {
                Mode::Help => Self::render_help_overlay(state, frame),
                Mode::ColumnReorder => Self::render_columns_overlay(state, frame),
                _ => {}
            }
        })?;
        Ok(())
    }

    fn render_table<'a>(state: &'a AppState, grid: &'a Grid) -> Table<'a> {
        let colors = &state.settings.colors;

        let mut rows: Vec<Row> = Vec::with_capacity(grid.rows.len());
        for row in &grid.rows {
            let cells: Vec<Cell> = row.cells.iter().map(|cell| Cell::from(cell.as_str())).collect();
            let style = if row.selected {
                colors.selected
            } else if !row.parsed {
                colors.unparsable
            } else {
                colors.normal
            };
            rows.push(Row::new(cells).style(style));
        }

        let header: Vec<Cell> = grid
            .columns
            .iter()
            .map(|column| {
                let mark = match column.sort {
                    Some(SortDirection::Ascending) => " ↑",
                    Some(SortDirection::Descending) => " ↓",
                    None if column.filtered => " *",
                    None => "",
                };
                Cell::from(format!("{}{}", column.name, mark))
            })
            .collect();
        let header = Row::new(header).style(colors.table.header);

        let widths: Vec<Constraint> = grid
            .columns
            .iter()
            .map(|column| Constraint::Length(column.width as u16))
            .collect();

        Table::new(rows, widths).header(header).style(colors.normal)
    }

    fn render_details(state: &AppState, record: &Record) -> Paragraph<'static> {
        let colors = &state.settings.colors;

        let mut fields: Vec<(&str, &Value)> = record
            .fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let mut lines = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", name), colors.details.key),
                Span::styled(utils::sanitize_text(&value.render()), colors.details.value),
            ]));
        }

        let title = if record.parsed {
            format!("record {}", record.seq)
        } else {
            format!("record {} (unparsable)", record.seq)
        };

        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, colors.details.title))
                .border_style(colors.details.border),
        )
    }

    fn render_footer<'a>(state: &'a AppState, grid: &Grid) -> Block<'a> {
        if let Some(warning) = &state.warning {
            return Block::default()
                .title(format!("Warning: {}", warning))
                .style(state.settings.colors.footer.warning);
        }
        match state.view.mode {
            Mode::FilterEdit => {
                Self::render_footer_input(state, format!("{}|", state.view.input_column))
            }
            Mode::SearchEdit => Self::render_footer_input(state, "/".to_string()),
            Mode::GotoEdit => Self::render_footer_input(state, ":".to_string()),
            _ => Self::render_footer_normal(state, grid),
        }
    }

    fn render_footer_input(state: &AppState, prompt: String) -> Block<'static> {
        let input = &state.view.input;
        let at = state.view.input_cursor.min(input.len());
        let style = if state.view.input_ok {
            state.settings.colors.footer.input
        } else {
            state.settings.colors.footer.warning
        };
        Block::default()
            .title(format!("{}{}█{}", prompt, &input[..at], &input[at..]))
            .style(style)
    }

    fn render_footer_normal<'a>(state: &'a AppState, grid: &Grid) -> Block<'a> {
        let mut parts: Vec<String> = Vec::new();
        if state.view.follow {
            parts.push("FOLLOW".to_string());
        }
        if grid.matched == 0 {
            if grid.total == 0 {
                parts.push("no records yet".to_string());
            } else {
                parts.push(format!("no matches ({} records)", grid.total));
            }
        } else {
            let row = grid.cursor.map(|at| at + 1).unwrap_or(0);
            if grid.matched == grid.total {
                parts.push(format!("row {}/{}", row, grid.matched));
            } else {
                parts.push(format!("row {}/{} ({} total)", row, grid.matched, grid.total));
            }
        }
        if grid.parse_errors > 0 {
            parts.push(format!("{} unparsable", grid.parse_errors));
        }
        if let Some(sort_column) = &state.view.sort_column {
            let direction = match state.view.sort_direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            parts.push(format!("sort: {} {}", sort_column, direction));
        }
        if !state.view.filters.is_empty() {
            parts.push(format!("filters: {}", state.view.filters.len()));
        }
        if let Some(search) = &state.view.search {
            parts.push(format!("search: {}", search.text));
        }
        parts.push("h for help".to_string());

        Block::default()
            .title(parts.join(" | "))
            .style(state.settings.colors.footer.normal)
    }

    fn render_help_overlay(state: &AppState, frame: &mut Frame) {
        let mut lines = vec![Line::from("")];
        for command in Command::ALL {
            let keys = Self::keys_for(state, command);
            lines.push(Line::from(format!("  {:18} {}", keys, command.describe())));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("  press any key to close"));

        let area = Self::centered_rect(64, 90, frame.area());
        let help = Paragraph::new(Text::from(lines))
            .style(state.settings.colors.normal)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("help")
                    .border_style(state.settings.colors.details.border),
            );
        frame.render_widget(Clear, area);
        frame.render_widget(help, area);
    }

    fn keys_for(state: &AppState, command: Command) -> String {
        let mut keys: Vec<&str> = state
            .settings
            .keybindings
            .iter()
            .filter(|(_, name)| name.parse::<Command>() == Ok(command))
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort();
        keys.join(", ")
    }

    fn render_columns_overlay(state: &AppState, frame: &mut Frame) {
        let mut lines = vec![Line::from("")];
        for (at, column) in state.view.columns.iter().enumerate() {
            let marker = if at == state.view.reorder_index { ">" } else { " " };
            let visible = if column.visible { "[x]" } else { "[ ]" };
            let line = format!(" {} {} {}", marker, visible, column.name);
            if at == state.view.reorder_index {
                lines.push(Line::styled(line, state.settings.colors.selected));
            } else {
                lines.push(Line::from(line));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from("  </> move   v/space show or hide   enter done"));

        let area = Self::centered_rect(50, 70, frame.area());
        let columns = Paragraph::new(Text::from(lines))
            .style(state.settings.colors.normal)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("columns")
                    .border_style(state.settings.colors.details.border),
            );
        frame.render_widget(Clear, area);
        frame.render_widget(columns, area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1]);
        horizontal[1]
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // back to the normal screen whatever happened
        ratatui::restore();
    }
}
