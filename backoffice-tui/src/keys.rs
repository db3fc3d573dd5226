//! Keybinding definitions for the console.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    OpenSearch,
    CycleFilter,
    ClearFilter,
    ViewItem,
    EditItem,
    NewItem,
    DeleteItem,
    Refresh,
    Export,
    Confirm,
    Cancel,
    /// Text typed into the search box or a form field.
    Input(char),
    Backspace,
}

/// What the keyboard is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the search box or a form field.
    Text,
}

pub fn map_key(event: KeyEvent, mode: InputMode) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    if mode == InputMode::Text {
        return match code {
            KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('f') => Some(Action::CycleFilter),
        KeyCode::Char('c') => Some(Action::ClearFilter),
        KeyCode::Char('v') => Some(Action::ViewItem),
        KeyCode::Char('e') => Some(Action::EditItem),
        KeyCode::Char('n') => Some(Action::NewItem),
        KeyCode::Char('d') => Some(Action::DeleteItem),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char('x') => Some(Action::Export),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('[') => Some(Action::PrevPage),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(']') => Some(Action::NextPage),
        KeyCode::Char(c @ '1'..='7') => Some(Action::SwitchView(c as usize - '1' as usize)),
        _ => None,
    }
}

/// One-line key help for the footer.
pub fn help_line(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Normal => {
            "j/k move • h/l page • / search • f filter • v view • e edit • n new • d delete • r refresh • x export • Tab switch • q quit"
        }
        InputMode::Text => "type to enter • Enter accept • Esc cancel • Backspace delete",
    }
}
