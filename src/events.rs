use ratatui::crossterm::event::Event;

pub enum AppEvent {
    // From the input thread
    Input(Event),

    // From the file follower
    Line(String),
    Truncated,
    Reloaded,
    FollowerError(String),
}
