use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::event::{Event, KeyEventKind};

use crate::args::ParsedArgs;
use crate::events::AppEvent;
use crate::follower;
use crate::input;
use crate::keyboard;
use crate::projector;
use crate::settings::Settings;
use crate::state::AppState;
use crate::tui::Tui;

/// The controller: owns the state, the terminal and the event channel, and
/// runs the read, apply, redraw loop until quit.
pub struct App {
    pub state: AppState,
    tui: Tui,
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
    /// Set to ask the follower thread to start over from the top of the
    /// file. It answers with `Reloaded` before the first line.
    rewind: Arc<AtomicBool>,
    /// Where the follower picks up after the initial load.
    resume_offset: u64,
}

impl App {
    pub fn new(args: ParsedArgs) -> Result<App, Box<dyn std::error::Error>> {
        let mut settings = Settings::new()?;
        if let Some(config) = &args.config {
            settings
                .read_from_yaml(config)
                .map_err(|err| format!("could not read {}: {}", config, err))?;
        }

        let path = PathBuf::from(&args.filename);
        if !path.is_file() {
            return Err(format!("{} is not a readable file", args.filename).into());
        }

        let mut state = AppState::new(settings, path.clone(), args.follow);

        // load what is already there before taking over the terminal
        let (lines, resume_offset) = follower::load_existing(&path)?;
        state.load_lines(lines);
        if state.view.follow {
            state.view.cursor_to_end();
        }

        let tui = Tui::new()?;
        let (tx, rx) = mpsc::channel();

        Ok(App {
            state,
            tui,
            tx,
            rx,
            rewind: Arc::new(AtomicBool::new(false)),
            resume_offset,
        })
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        input::start_input_thread(self.tx.clone());
        follower::start_follower_thread(
            self.state.path.clone(),
            self.resume_offset,
            Duration::from_millis(self.state.settings.global.poll_interval_ms),
            self.rewind.clone(),
            self.tx.clone(),
        );

        while self.state.running {
            if self.state.dirty {
                self.refresh()?;
            }
            self.wait_for_events();
            if self.state.reload_requested {
                self.state.reload_requested = false;
                self.rewind.store(true, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Project the current state and draw it. The clamped offsets and cursor
    /// go back into the view, and the selected record id is remembered for
    /// the details pane.
    fn refresh(&mut self) -> io::Result<()> {
        if self.state.force_clear {
            self.state.force_clear = false;
            self.tui.terminal.clear()?;
        }
        let size = self.tui.size()?;
        let details_height = self.state.details_height(size.height);
        // one line of footer plus the table header row
        let height = size.height.saturating_sub(2 + details_height) as usize;
        self.state.viewport_rows = height;

        let grid = projector::project(
            &self.state.store,
            &self.state.view,
            height,
            size.width as usize,
            self.state.settings.global.min_column_width,
        );
        self.state.view.matched = grid.matched;
        self.state.view.row_offset = grid.row_offset;
        self.state.view.col_offset = grid.col_offset;
        self.state.view.cursor = grid.cursor;
        self.state.selected_seq = grid.rows.iter().find(|row| row.selected).map(|row| row.seq);

        self.tui.render(&self.state, &grid)?;
        self.state.dirty = false;
        Ok(())
    }

    /// Block for the next event, then drain whatever else is queued with a
    /// short timeout so bursts become one redraw.
    fn wait_for_events(&mut self) {
        let mut timeout = Duration::from_millis(self.state.settings.global.poll_interval_ms);
        let mut events_received = 0;
        loop {
            match self.rx.recv_timeout(timeout) {
                Ok(event) => {
                    events_received += 1;
                    self.handle_event(event, &mut timeout);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => return,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.state.running = false;
                    return;
                }
            }
            if !self.state.running || events_received > 100 {
                return;
            }
        }
    }

    fn handle_event(&mut self, event: AppEvent, timeout: &mut Duration) {
        match event {
            AppEvent::Input(Event::Key(key_event)) => {
                // release and repeat events come in on some terminals
                if key_event.kind == KeyEventKind::Press {
                    keyboard::handle_key_event(key_event, &mut self.state);
                }
                *timeout = Duration::from_millis(10);
            }
            AppEvent::Input(Event::Resize(_, _)) => {
                self.state.dirty = true;
                *timeout = Duration::from_millis(10);
            }
            AppEvent::Input(_) => {}
            AppEvent::Line(line) => {
                self.state.ingest_line(line);
                *timeout = Duration::from_millis(100);
            }
            AppEvent::Truncated => {
                self.state.on_truncated();
                *timeout = Duration::from_millis(100);
            }
            AppEvent::Reloaded => {
                self.state.on_reloaded();
                *timeout = Duration::from_millis(100);
            }
            AppEvent::FollowerError(message) => {
                self.state.warn(message);
                *timeout = Duration::from_millis(100);
            }
        }
    }
}
