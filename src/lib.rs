//! Table viewer for growing JSON-lines log files.
//!
//! One record per line, one column per field. The store keeps every record
//! it has seen, a pure projection turns the store plus the view state into
//! one screenful of cells, and ratatui draws that.

pub mod app;
pub mod args;
pub mod commands;
pub mod events;
pub mod filterexpr;
pub mod follower;
pub mod input;
pub mod keyboard;
pub mod projector;
pub mod record;
pub mod recordstore;
pub mod schema;
pub mod settings;
pub mod state;
pub mod tui;
pub mod utils;
pub mod view;

// Re-export commonly used types for convenience
pub use record::{Record, Value};
pub use recordstore::RecordStore;
pub use state::AppState;
pub use view::{Mode, ViewState};
