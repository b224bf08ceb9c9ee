//! Key bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Pause,
    Restart,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl, etc.).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Action::Rotate,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Action::SoftDrop,
        KeyCode::Enter | KeyCode::Char(' ') => Action::HardDrop,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_and_vim_keys_agree() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::HardDrop);
    }

    #[test]
    fn test_modifiers() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let alt_h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt_h), Action::None);
        let shift_r = KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(shift_r), Action::Restart);
    }
}
