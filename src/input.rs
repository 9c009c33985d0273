use std::sync::mpsc;
use std::thread;

use ratatui::crossterm::event;

use crate::events::AppEvent;

/// Forward terminal events to the controller channel. `event::read` blocks,
/// so this gets its own thread; it ends when the receiver goes away.
pub fn start_input_thread(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(event) => {
                if tx.send(AppEvent::Input(event)).is_err() {
                    return;
                }
            }
            Err(err) => {
                log::error!("could not read terminal events: {}", err);
                return;
            }
        }
    });
}
