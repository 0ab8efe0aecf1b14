use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which set of key bindings is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Login,
    Browse,
    ShopForm,
    ListingForm,
    Confirm,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    FocusNext,
    MoveUp,
    MoveDown,
    Refresh,
    NewShop,
    NewListing,
    DeleteSelected,
    OpenInBrowser,
    ShowHelp,
    HideHelp,
    // Delete confirmation
    ConfirmYes,
    ConfirmNo,
    // Text input (login and forms)
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,
    NextField,
    PrevField,
    CycleLeft,
    CycleRight,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match mode {
        // If help is showing, any key closes it
        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::Login => match key.code {
            KeyCode::Enter => Some(AppAction::InputSubmit),
            KeyCode::Esc => Some(AppAction::Quit),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        },

        InputMode::Confirm => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                Some(AppAction::ConfirmYes)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(AppAction::ConfirmNo),
            _ => None,
        },

        InputMode::ShopForm | InputMode::ListingForm => match key.code {
            KeyCode::Enter => Some(AppAction::InputSubmit),
            KeyCode::Esc => Some(AppAction::InputCancel),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::Tab | KeyCode::Down => Some(AppAction::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(AppAction::PrevField),
            KeyCode::Left if mode == InputMode::ListingForm => Some(AppAction::CycleLeft),
            KeyCode::Right if mode == InputMode::ListingForm => Some(AppAction::CycleRight),
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        },

        InputMode::Browse => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Tab | KeyCode::BackTab => Some(AppAction::FocusNext),
            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Char('r') => Some(AppAction::Refresh),
            KeyCode::Char('a') => Some(AppAction::NewShop),
            KeyCode::Char('n') => Some(AppAction::NewListing),
            KeyCode::Char('d') | KeyCode::Delete => Some(AppAction::DeleteSelected),
            KeyCode::Char('o') => Some(AppAction::OpenInBrowser),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },
    }
}
