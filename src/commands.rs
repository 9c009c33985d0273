use std::str::FromStr;

/// Everything a keybinding can do. The settings file refers to commands by
/// the names `FromStr` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    CursorUp,
    CursorDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    GotoRow,
    ColumnLeft,
    ColumnRight,
    FirstColumn,
    LastColumn,
    SortCycle,
    EditFilter,
    EditSearch,
    ClearFilters,
    ToggleFollow,
    Reload,
    ResetView,
    ReorderColumns,
    ToggleColumn,
    MoveColumnLeft,
    MoveColumnRight,
    ToggleDetails,
    Help,
    Refresh,
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Command, ()> {
        match s {
            "quit" => Ok(Command::Quit),
            "up" => Ok(Command::CursorUp),
            "down" => Ok(Command::CursorDown),
            "page-up" => Ok(Command::PageUp),
            "page-down" => Ok(Command::PageDown),
            "top" => Ok(Command::Top),
            "bottom" => Ok(Command::Bottom),
            "goto" => Ok(Command::GotoRow),
            "column-left" => Ok(Command::ColumnLeft),
            "column-right" => Ok(Command::ColumnRight),
            "first-column" => Ok(Command::FirstColumn),
            "last-column" => Ok(Command::LastColumn),
            "sort" => Ok(Command::SortCycle),
            "filter" => Ok(Command::EditFilter),
            "search" => Ok(Command::EditSearch),
            "clear-filters" => Ok(Command::ClearFilters),
            "follow" => Ok(Command::ToggleFollow),
            "reload" => Ok(Command::Reload),
            "reset" => Ok(Command::ResetView),
            "columns" => Ok(Command::ReorderColumns),
            "toggle-column" => Ok(Command::ToggleColumn),
            "move-column-left" => Ok(Command::MoveColumnLeft),
            "move-column-right" => Ok(Command::MoveColumnRight),
            "details" => Ok(Command::ToggleDetails),
            "help" => Ok(Command::Help),
            "refresh" => Ok(Command::Refresh),
            _ => Err(()),
        }
    }
}

impl Command {
    /// Display order in the help overlay.
    pub const ALL: [Command; 26] = [
        Command::Quit,
        Command::CursorUp,
        Command::CursorDown,
        Command::PageUp,
        Command::PageDown,
        Command::Top,
        Command::Bottom,
        Command::GotoRow,
        Command::ColumnLeft,
        Command::ColumnRight,
        Command::FirstColumn,
        Command::LastColumn,
        Command::SortCycle,
        Command::EditFilter,
        Command::EditSearch,
        Command::ClearFilters,
        Command::ToggleFollow,
        Command::Reload,
        Command::ResetView,
        Command::ReorderColumns,
        Command::ToggleColumn,
        Command::MoveColumnLeft,
        Command::MoveColumnRight,
        Command::ToggleDetails,
        Command::Help,
        Command::Refresh,
    ];

    pub fn describe(&self) -> &'static str {
        match self {
            Command::Quit => "quit",
            Command::CursorUp => "move up one row",
            Command::CursorDown => "move down one row",
            Command::PageUp => "move up one page",
            Command::PageDown => "move down one page",
            Command::Top => "go to the first row",
            Command::Bottom => "go to the last row",
            Command::GotoRow => "go to a row by number",
            Command::ColumnLeft => "current column one left",
            Command::ColumnRight => "current column one right",
            Command::FirstColumn => "jump to the first column",
            Command::LastColumn => "jump to the last column",
            Command::SortCycle => "sort by current column (asc, desc, off)",
            Command::EditFilter => "filter the current column",
            Command::EditSearch => "search all fields",
            Command::ClearFilters => "clear filters and search",
            Command::ToggleFollow => "follow new records on/off",
            Command::Reload => "read the file again",
            Command::ResetView => "reset sort, filters and columns",
            Command::ReorderColumns => "arrange columns",
            Command::ToggleColumn => "hide the current column",
            Command::MoveColumnLeft => "move the current column left",
            Command::MoveColumnRight => "move the current column right",
            Command::ToggleDetails => "details for the current record",
            Command::Help => "this help",
            Command::Refresh => "redraw the screen",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_name_round_trips() {
        let names = [
            "quit",
            "up",
            "down",
            "page-up",
            "page-down",
            "top",
            "bottom",
            "goto",
            "column-left",
            "column-right",
            "first-column",
            "last-column",
            "sort",
            "filter",
            "search",
            "clear-filters",
            "follow",
            "reload",
            "reset",
            "columns",
            "toggle-column",
            "move-column-left",
            "move-column-right",
            "details",
            "help",
            "refresh",
        ];
        for name in names {
            assert!(name.parse::<Command>().is_ok(), "{} did not parse", name);
        }
        assert!("no-such-command".parse::<Command>().is_err());
    }
}
