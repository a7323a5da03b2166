use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which key map applies right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    List,
    Detail,
    Editor,
    Prompt,
    Confirm,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,
    OpenArticle,
    Back,
    ShowLatest,
    ShowPopular,
    ShowSlideShow,
    ShowAll,
    LoadMore,
    Reload,
    ToggleLike,
    OpenThumbnail,
    PrevArticle,
    NextArticle,
    NewArticle,
    EditArticle,
    DeleteArticle,
    ShowHelp,
    HideHelp,
    // Tag filter prompt
    FilterByTagStart,
    PromptChar(char),
    PromptBackspace,
    PromptConfirm,
    PromptCancel,
    // Delete confirmation
    ConfirmYes,
    ConfirmNo,
    // Editor form
    FieldNext,
    FieldPrev,
    EditorChar(char),
    EditorBackspace,
    EditorEnter,
    EditorSubmit,
    EditorCancel,
}

pub fn handle_key_event(key: KeyEvent, mode: InputMode) -> Option<AppAction> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    match mode {
        // If help is showing, any key closes it
        InputMode::Help => Some(AppAction::HideHelp),

        InputMode::Prompt => match key.code {
            KeyCode::Enter => Some(AppAction::PromptConfirm),
            KeyCode::Esc => Some(AppAction::PromptCancel),
            KeyCode::Backspace => Some(AppAction::PromptBackspace),
            KeyCode::Char(c) => Some(AppAction::PromptChar(c)),
            _ => None,
        },

        InputMode::Confirm => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(AppAction::ConfirmYes),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(AppAction::ConfirmNo),
            _ => None,
        },

        InputMode::Editor => match (key.code, key.modifiers) {
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => {
                Some(AppAction::EditorSubmit)
            }
            (KeyCode::Esc, _) => Some(AppAction::EditorCancel),
            (KeyCode::Tab, _) | (KeyCode::Down, _) => Some(AppAction::FieldNext),
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => Some(AppAction::FieldPrev),
            (KeyCode::Enter, _) => Some(AppAction::EditorEnter),
            (KeyCode::Backspace, _) => Some(AppAction::EditorBackspace),
            (KeyCode::Char(c), _) => Some(AppAction::EditorChar(c)),
            _ => None,
        },

        InputMode::Detail => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),
            KeyCode::Esc | KeyCode::Backspace => Some(AppAction::Back),
            KeyCode::Char('[') | KeyCode::Left | KeyCode::Char('h') => Some(AppAction::PrevArticle),
            KeyCode::Char(']') | KeyCode::Right | KeyCode::Char('l') => Some(AppAction::NextArticle),
            KeyCode::Char('g') => Some(AppAction::ToggleLike),
            KeyCode::Char('o') => Some(AppAction::OpenThumbnail),
            KeyCode::Char('e') => Some(AppAction::EditArticle),
            KeyCode::Char('d') => Some(AppAction::DeleteArticle),
            KeyCode::Char('t') => Some(AppAction::FilterByTagStart),
            KeyCode::Char('?') => Some(AppAction::ShowHelp),
            _ => None,
        },

        InputMode::List => match key.code {
            KeyCode::Char('q') => Some(AppAction::Quit),

            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Char('<') | KeyCode::Home => Some(AppAction::MoveToTop),
            KeyCode::Char('>') | KeyCode::End => Some(AppAction::MoveToBottom),

            KeyCode::Enter => Some(AppAction::OpenArticle),

            KeyCode::Char('1') => Some(AppAction::ShowLatest),
            KeyCode::Char('2') => Some(AppAction::ShowPopular),
            KeyCode::Char('3') => Some(AppAction::ShowSlideShow),
            KeyCode::Char('4') => Some(AppAction::ShowAll),
            KeyCode::Char('t') => Some(AppAction::FilterByTagStart),
            KeyCode::Char('n') => Some(AppAction::LoadMore),
            KeyCode::Char('r') => Some(AppAction::Reload),

            KeyCode::Char('g') => Some(AppAction::ToggleLike),
            KeyCode::Char('o') => Some(AppAction::OpenThumbnail),
            KeyCode::Char('c') => Some(AppAction::NewArticle),
            KeyCode::Char('e') => Some(AppAction::EditArticle),
            KeyCode::Char('d') => Some(AppAction::DeleteArticle),

            KeyCode::Char('?') => Some(AppAction::ShowHelp),

            _ => None,
        },
    }
}
