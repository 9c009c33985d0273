use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::commands::Command;
use crate::state::AppState;
use crate::view::Mode;

/// One key press, dispatched by the current mode.
pub fn handle_key_event(key_event: KeyEvent, state: &mut AppState) {
    state.warning = None;
    match state.view.mode {
        Mode::Normal => handle_normal_mode(key_event, state),
        Mode::FilterEdit => handle_filter_edit(key_event, state),
        Mode::SearchEdit => handle_search_edit(key_event, state),
        Mode::GotoEdit => handle_goto_edit(key_event, state),
        Mode::ColumnReorder => handle_column_reorder(key_event, state),
        Mode::Help => {
            state.view.mode = Mode::Normal;
        }
    }
    state.dirty = true;
}

/// Settings-file name for a key press: the lowercase character or key name,
/// with `shift-` and `control-` prefixes. Function keys are `F1`..`F12`.
pub fn keyname(key_event: KeyEvent) -> String {
    if let KeyCode::F(n) = key_event.code {
        return format!("F{}", n);
    }
    let mut keyname = match key_event.code {
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        code => code.to_string().to_lowercase(),
    };
    if key_event.modifiers.contains(KeyModifiers::SHIFT) {
        keyname = format!("shift-{}", keyname);
    }
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        keyname = format!("control-{}", keyname);
    }
    keyname
}

fn handle_normal_mode(key_event: KeyEvent, state: &mut AppState) {
    let keyname = keyname(key_event);
    let binding = match state.settings.keybindings.get(&keyname) {
        Some(binding) => binding.clone(),
        None => {
            state.warn(format!("unbound key: {}", keyname));
            return;
        }
    };
    match binding.parse::<Command>() {
        Ok(command) => state.apply(command),
        Err(()) => state.warn(format!("unknown command in keybindings: {}", binding)),
    }
}

fn handle_filter_edit(key_event: KeyEvent, state: &mut AppState) {
    match key_event.code {
        KeyCode::Esc => state.cancel_input(),
        KeyCode::Enter | KeyCode::Char('\n') => state.commit_filter(),
        _ => {
            handle_textinput(&mut state.view.input, &mut state.view.input_cursor, key_event);
            state.refresh_pending();
        }
    }
}

fn handle_search_edit(key_event: KeyEvent, state: &mut AppState) {
    match key_event.code {
        KeyCode::Esc => state.cancel_input(),
        KeyCode::Enter | KeyCode::Char('\n') => state.commit_search(),
        _ => {
            handle_textinput(&mut state.view.input, &mut state.view.input_cursor, key_event);
            state.refresh_pending();
        }
    }
}

fn handle_goto_edit(key_event: KeyEvent, state: &mut AppState) {
    match key_event.code {
        KeyCode::Esc => state.cancel_input(),
        KeyCode::Enter | KeyCode::Char('\n') => state.commit_goto(),
        _ => {
            handle_textinput(&mut state.view.input, &mut state.view.input_cursor, key_event);
            let text = state.view.input.trim();
            state.view.input_ok = text.is_empty() || text.parse::<usize>().is_ok();
        }
    }
}

fn handle_column_reorder(key_event: KeyEvent, state: &mut AppState) {
    let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);
    match key_event.code {
        KeyCode::Esc | KeyCode::Enter => {
            state.view.mode = Mode::Normal;
        }
        KeyCode::Up if shift => state.view.shift_reorder_column(-1),
        KeyCode::Down if shift => state.view.shift_reorder_column(1),
        KeyCode::Up | KeyCode::Char('k') => state.view.move_reorder_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => state.view.move_reorder_selection(1),
        KeyCode::Char('<') => state.view.shift_reorder_column(-1),
        KeyCode::Char('>') => state.view.shift_reorder_column(1),
        KeyCode::Char('v') | KeyCode::Char(' ') => state.toggle_reorder_column(),
        _ => {}
    }
}

/// Line editing shared by the filter and search inputs. The position is a
/// byte offset and always lands on a character boundary.
pub fn handle_textinput(text: &mut String, position: &mut usize, keyevent: KeyEvent) {
    if *position > text.len() {
        *position = text.len();
    }
    let control = keyevent.modifiers.contains(KeyModifiers::CONTROL);
    match keyevent.code {
        // control-u clears, control-backspace arrives as control-h
        KeyCode::Char('u') if control => {
            text.clear();
            *position = 0;
        }
        KeyCode::Char('h') if control => {
            text.clear();
            *position = 0;
        }
        KeyCode::Backspace if control => {
            text.clear();
            *position = 0;
        }
        KeyCode::Left => {
            *position = prev_boundary(text, *position);
        }
        KeyCode::Right => {
            *position = next_boundary(text, *position);
        }
        KeyCode::Home => {
            *position = 0;
        }
        KeyCode::End => {
            *position = text.len();
        }
        KeyCode::Delete => {
            if *position < text.len() {
                text.remove(*position);
            }
        }
        KeyCode::Backspace => {
            if *position > 0 {
                let at = prev_boundary(text, *position);
                text.remove(at);
                *position = at;
            }
        }
        KeyCode::Char(c) if !control => {
            text.insert(*position, c);
            *position += c.len_utf8();
        }
        _ => {}
    }
}

fn prev_boundary(text: &str, position: usize) -> usize {
    text[..position]
        .chars()
        .next_back()
        .map(|c| position - c.len_utf8())
        .unwrap_or(0)
}

fn next_boundary(text: &str, position: usize) -> usize {
    text[position..]
        .chars()
        .next()
        .map(|c| position + c.len_utf8())
        .unwrap_or(text.len())
}
