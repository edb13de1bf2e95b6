use super::state::AppState;
use crate::engine::EngineCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const MAX_DESTINATION_LEN: usize = 64;

/// Map a key press to UI changes and, when the engine is involved, the
/// command to send it.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<EngineCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(EngineCommand::Quit);
    }

    if state.editing_destination {
        edit_destination(state, key.code);
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(EngineCommand::Quit),
        KeyCode::Char('s') | KeyCode::Enter => {
            // Start is disabled while a run is in flight.
            if state.snapshot.is_running {
                state.push_log("WARN", "Already running, start ignored".to_string());
                return None;
            }
            state.push_log(
                "INFO",
                format!(
                    "Sending packet to {} over {} at {:.1}x",
                    state.destination,
                    state.protocol.label(),
                    state.speed.get()
                ),
            );
            Some(EngineCommand::Start { speed: state.speed })
        }
        KeyCode::Char('r') => Some(EngineCommand::Reset),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
            state.speed_faster();
            None
        }
        KeyCode::Char('-') | KeyCode::Left => {
            state.speed_slower();
            None
        }
        KeyCode::Char('p') => {
            state.protocol = state.protocol.toggled();
            None
        }
        KeyCode::Char('v') => {
            state.render_mode = state.render_mode.toggled();
            None
        }
        KeyCode::Char('i') => {
            state.show_info = !state.show_info;
            None
        }
        KeyCode::Char('d') => {
            state.show_step_details = !state.show_step_details;
            None
        }
        KeyCode::Char('e') => {
            state.editing_destination = true;
            state.edit_buffer = state.destination.clone();
            None
        }
        _ => None,
    }
}

fn edit_destination(state: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            let value = state.edit_buffer.trim();
            if !value.is_empty() {
                state.destination = value.to_string();
            }
            state.editing_destination = false;
            state.edit_buffer.clear();
        }
        KeyCode::Esc => {
            state.editing_destination = false;
            state.edit_buffer.clear();
        }
        KeyCode::Backspace => {
            state.edit_buffer.pop();
        }
        KeyCode::Char(c) if !c.is_control() => {
            if state.edit_buffer.chars().count() < MAX_DESTINATION_LEN {
                state.edit_buffer.push(c);
            }
        }
        _ => {}
    }
}
