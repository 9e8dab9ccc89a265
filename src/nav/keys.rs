use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Normal-mode commands, decoupled from the physical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Top,
    Bottom,
    MenuPageUp,
    MenuPageDown,
    ContentUp,
    ContentDown,
    RunAction,
    Shortcut(&'static str),
    Enable,
    Disable,
    ToggleDetails,
    CycleFilter,
    StartSearch,
    Refresh,
    Quit,
}

/// Named-action shortcuts: key → action name looked up on the selected module.
pub const SHORTCUTS: [(char, &str); 4] = [('c', "connect"), ('x', "delete"), ('E', "edit"), ('n', "add")];

pub fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

pub fn normal_action(key: &KeyEvent) -> Option<KeyAction> {
    if is_quit(key) {
        return Some(KeyAction::Quit);
    }
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => KeyAction::Up,
        KeyCode::Down | KeyCode::Char('j') => KeyAction::Down,
        KeyCode::Home | KeyCode::Char('g') => KeyAction::Top,
        KeyCode::End | KeyCode::Char('G') => KeyAction::Bottom,
        KeyCode::PageUp => KeyAction::MenuPageUp,
        KeyCode::PageDown => KeyAction::MenuPageDown,
        KeyCode::Char('K') => KeyAction::ContentUp,
        KeyCode::Char('J') => KeyAction::ContentDown,
        KeyCode::Enter | KeyCode::Char('a') => KeyAction::RunAction,
        KeyCode::Char('e') => KeyAction::Enable,
        KeyCode::Char('d') => KeyAction::Disable,
        KeyCode::Char('t') => KeyAction::ToggleDetails,
        KeyCode::Char('f') => KeyAction::CycleFilter,
        KeyCode::Char('/') => KeyAction::StartSearch,
        KeyCode::Char('r') => KeyAction::Refresh,
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char(c) => {
            return SHORTCUTS
                .iter()
                .find(|(k, _)| *k == c)
                .map(|&(_, name)| KeyAction::Shortcut(name));
        }
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_navigation_and_commands() {
        assert_eq!(normal_action(&key(KeyCode::Char('j'))), Some(KeyAction::Down));
        assert_eq!(normal_action(&key(KeyCode::Enter)), Some(KeyAction::RunAction));
        assert_eq!(normal_action(&key(KeyCode::Char('J'))), Some(KeyAction::ContentDown));
        assert_eq!(normal_action(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn shortcuts_resolve_to_action_names() {
        assert_eq!(
            normal_action(&key(KeyCode::Char('c'))),
            Some(KeyAction::Shortcut("connect"))
        );
        assert_eq!(
            normal_action(&key(KeyCode::Char('n'))),
            Some(KeyAction::Shortcut("add"))
        );
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_connects() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(normal_action(&ctrl_c), Some(KeyAction::Quit));
        assert_ne!(normal_action(&key(KeyCode::Char('c'))), Some(KeyAction::Quit));
    }
}
