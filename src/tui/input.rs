//! Key routing for the dashboard.
//!
//! Deterministic precedence: picker overlay keys first, then service-filter
//! editing keys, then global keys. Text entry (filter typing) is expressed
//! as actions too, so the update function stays the single state machine.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Where a key event lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputContext {
    /// The region picker overlay is open.
    pub picker_open: bool,
    /// Keystrokes currently edit the service filter.
    pub filter_editing: bool,
}

/// Semantic key actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    OpenPicker,
    ClosePicker,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    ToggleEntry,
    SelectAll,
    ClearAll,
    ResetSelection,
    BeginServiceFilter,
    /// Enter: keep the filter text, stop editing.
    EndServiceFilter,
    /// Escape: clear the filter text, stop editing.
    CancelServiceFilter,
    RequestTooltip,
    ClearTooltip,
    FilterChar(char),
    FilterBackspace,
}

/// Resolve a key event to an action, or `None` for unmapped keys.
#[must_use]
pub fn resolve_key(key: &KeyEvent, context: InputContext) -> Option<InputAction> {
    if context.picker_open {
        return resolve_picker_key(key);
    }
    if context.filter_editing {
        return resolve_filter_key(key);
    }
    resolve_global_key(key)
}

fn ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

fn resolve_picker_key(key: &KeyEvent) -> Option<InputAction> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => Some(InputAction::ClosePicker),
        KeyCode::Up => Some(InputAction::CursorUp),
        KeyCode::Down => Some(InputAction::CursorDown),
        KeyCode::Backspace => Some(InputAction::FilterBackspace),
        KeyCode::Char(' ') => Some(InputAction::ToggleEntry),
        KeyCode::Char('c') if ctrl(key) => Some(InputAction::Quit),
        KeyCode::Char('a') if ctrl(key) => Some(InputAction::SelectAll),
        KeyCode::Char('d') if ctrl(key) => Some(InputAction::ClearAll),
        KeyCode::Char('r') if ctrl(key) => Some(InputAction::ResetSelection),
        KeyCode::Char(c) if !ctrl(key) => Some(InputAction::FilterChar(c)),
        _ => None,
    }
}

fn resolve_filter_key(key: &KeyEvent) -> Option<InputAction> {
    match key.code {
        KeyCode::Esc => Some(InputAction::CancelServiceFilter),
        KeyCode::Enter => Some(InputAction::EndServiceFilter),
        KeyCode::Backspace => Some(InputAction::FilterBackspace),
        KeyCode::Char('c') if ctrl(key) => Some(InputAction::Quit),
        KeyCode::Char(c) if !ctrl(key) => Some(InputAction::FilterChar(c)),
        _ => None,
    }
}

fn resolve_global_key(key: &KeyEvent) -> Option<InputAction> {
    match key.code {
        KeyCode::Char('c') if ctrl(key) => Some(InputAction::Quit),
        KeyCode::Char('q') => Some(InputAction::Quit),
        KeyCode::Char('r') => Some(InputAction::OpenPicker),
        KeyCode::Char('/') => Some(InputAction::BeginServiceFilter),
        KeyCode::Char('x') => Some(InputAction::ResetSelection),
        KeyCode::Char('t') => Some(InputAction::RequestTooltip),
        KeyCode::Esc => Some(InputAction::ClearTooltip),
        KeyCode::Up | KeyCode::Char('k') => Some(InputAction::CursorUp),
        KeyCode::Down | KeyCode::Char('j') => Some(InputAction::CursorDown),
        KeyCode::Left | KeyCode::Char('h') => Some(InputAction::CursorLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(InputAction::CursorRight),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn global_keys() {
        let ctx = InputContext::default();
        assert_eq!(resolve_key(&key(KeyCode::Char('q')), ctx), Some(InputAction::Quit));
        assert_eq!(
            resolve_key(&key(KeyCode::Char('r')), ctx),
            Some(InputAction::OpenPicker)
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Char('/')), ctx),
            Some(InputAction::BeginServiceFilter)
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Char('x')), ctx),
            Some(InputAction::ResetSelection)
        );
        assert_eq!(resolve_key(&key(KeyCode::Char('z')), ctx), None);
    }

    #[test]
    fn picker_keys_take_precedence() {
        let ctx = InputContext {
            picker_open: true,
            filter_editing: false,
        };
        // 'q' types into the picker filter instead of quitting.
        assert_eq!(
            resolve_key(&key(KeyCode::Char('q')), ctx),
            Some(InputAction::FilterChar('q'))
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Char(' ')), ctx),
            Some(InputAction::ToggleEntry)
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Esc), ctx),
            Some(InputAction::ClosePicker)
        );
        assert_eq!(resolve_key(&ctrl_key('a'), ctx), Some(InputAction::SelectAll));
        assert_eq!(resolve_key(&ctrl_key('d'), ctx), Some(InputAction::ClearAll));
        assert_eq!(
            resolve_key(&ctrl_key('r'), ctx),
            Some(InputAction::ResetSelection)
        );
    }

    #[test]
    fn filter_editing_keys() {
        let ctx = InputContext {
            picker_open: false,
            filter_editing: true,
        };
        assert_eq!(
            resolve_key(&key(KeyCode::Char('s')), ctx),
            Some(InputAction::FilterChar('s'))
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Esc), ctx),
            Some(InputAction::CancelServiceFilter)
        );
        assert_eq!(
            resolve_key(&key(KeyCode::Enter), ctx),
            Some(InputAction::EndServiceFilter)
        );
        // Ctrl-C still quits while editing.
        assert_eq!(resolve_key(&ctrl_key('c'), ctx), Some(InputAction::Quit));
    }

    #[test]
    fn picker_wins_over_filter_editing() {
        let ctx = InputContext {
            picker_open: true,
            filter_editing: true,
        };
        assert_eq!(
            resolve_key(&key(KeyCode::Enter), ctx),
            Some(InputAction::ClosePicker)
        );
    }
}
