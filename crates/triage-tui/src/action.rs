use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Remote-facing actions the operator can trigger from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardAction {
    Acknowledge,
    Silence,
    AddNote,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiCommand {
    Dispatch(BoardAction),
    MoveNext,
    MovePrevious,
    ToggleSelect,
    OpenDetail,
    /// Esc: closes the detail view when one is open, otherwise quits.
    Back,
    ToggleOnlyMine,
    ScrollDetailUp,
    ScrollDetailDown,
    Quit,
}

pub fn map_key_to_command(key: KeyEvent) -> Option<UiCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiCommand::Quit);
    }
    if key.code == KeyCode::Esc {
        return Some(UiCommand::Back);
    }

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => Some(UiCommand::MoveNext),
        KeyCode::Up | KeyCode::Char('k') => Some(UiCommand::MovePrevious),
        KeyCode::Char(' ') => Some(UiCommand::ToggleSelect),
        KeyCode::Enter => Some(UiCommand::OpenDetail),
        KeyCode::PageUp => Some(UiCommand::ScrollDetailUp),
        KeyCode::PageDown => Some(UiCommand::ScrollDetailDown),
        KeyCode::Char('a') => Some(UiCommand::Dispatch(BoardAction::Acknowledge)),
        KeyCode::Char('s') => Some(UiCommand::Dispatch(BoardAction::Silence)),
        KeyCode::Char('n') => Some(UiCommand::Dispatch(BoardAction::AddNote)),
        KeyCode::Char('r') => Some(UiCommand::Dispatch(BoardAction::Refresh)),
        KeyCode::Char('m') => Some(UiCommand::ToggleOnlyMine),
        KeyCode::Char('q') => Some(UiCommand::Quit),
        _ => None,
    }
}

pub fn action_label(action: BoardAction) -> &'static str {
    match action {
        BoardAction::Acknowledge => "acknowledge",
        BoardAction::Silence => "silence",
        BoardAction::AddNote => "add_note",
        BoardAction::Refresh => "refresh",
    }
}
