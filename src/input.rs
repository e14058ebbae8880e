//! Key bindings: arrows/WASD plus vim-style hjkl.

use crate::game::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Turn(Direction),
    Pause,
    Reset,
    SpeedUp,
    SpeedDown,
    Quit,
    None,
}

/// Map key event to game action. Supports arrows/WASD (classic) and hjkl (vim).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char(' ') => Action::Pause,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::SpeedUp,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::SpeedDown,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Action::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Action::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Action::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Action::Turn(Direction::Right),
        _ => Action::None,
    }
}
