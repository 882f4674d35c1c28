use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Follow the response's next-page pointer
    NextPage,
    /// Follow the response's prev-page pointer
    PrevPage,
    NextSubPage,
    PrevSubPage,
    /// Force-refetch the visible page
    Refresh,
    /// History back; falls through to quit when unconsumed
    Back,
    /// Toggle the visible page in the favorites set
    ToggleFavorite,
    /// Toggle in-page link highlighting
    ToggleHighlight,
    /// Toggle the link bar
    ToggleLinks,
    /// A digit for the page number entry buffer
    Digit(char),
    /// Drop the last digit from the entry buffer
    Backspace,
    None,
}

/// Map a key event to an action. Digit entry has no separate mode: digits
/// always accumulate in the page buffer and a full 3-digit entry opens
/// the page.
pub fn handle_key_event(key: KeyEvent, entry_active: bool) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Page navigation (swipe-equivalent)
        (KeyCode::Right, KeyModifiers::NONE) => Action::NextPage,
        (KeyCode::Char('l'), KeyModifiers::NONE) => Action::NextPage,
        (KeyCode::Left, KeyModifiers::NONE) => Action::PrevPage,
        (KeyCode::Char('h'), KeyModifiers::NONE) => Action::PrevPage,

        // Subpage cycling
        (KeyCode::Up, KeyModifiers::NONE) => Action::NextSubPage,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::NextSubPage,
        (KeyCode::Down, KeyModifiers::NONE) => Action::PrevSubPage,
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::PrevSubPage,

        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Refresh,
        (KeyCode::Char('f'), KeyModifiers::NONE) => Action::ToggleFavorite,
        (KeyCode::Char('i'), KeyModifiers::NONE) => Action::ToggleHighlight,
        (KeyCode::Char('t'), KeyModifiers::NONE) => Action::ToggleLinks,

        // Page number entry
        (KeyCode::Char(c), KeyModifiers::NONE) if c.is_ascii_digit() => Action::Digit(c),
        (KeyCode::Backspace, KeyModifiers::NONE) if entry_active => Action::Backspace,

        // Back: clear a partial entry first, then walk history
        (KeyCode::Esc, KeyModifiers::NONE) if entry_active => Action::Backspace,
        (KeyCode::Esc, KeyModifiers::NONE) => Action::Back,
        (KeyCode::Backspace, KeyModifiers::NONE) => Action::Back,

        _ => Action::None,
    }
}
