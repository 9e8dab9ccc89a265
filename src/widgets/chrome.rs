use crate::layout::PanelStyle;
use crate::theme::Theme;
use ratatui::widgets::{Block, BorderType, Borders, Padding};

/// Frame for a dashboard panel. Minimal and Naked panels draw their title themselves.
pub fn panel_block<'a>(title: &'a str, style: PanelStyle, focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if focused {
        theme.border_focused()
    } else {
        theme.border_unfocused()
    };
    match style {
        PanelStyle::Bordered => {
            let mut b = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Plain)
                .border_style(border_style)
                .padding(Padding::horizontal(1));
            if !title.is_empty() {
                b = b.title(title).title_style(theme.title_style());
            }
            b
        }
        PanelStyle::Card => {
            let mut b = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style)
                .padding(Padding::uniform(1));
            if !title.is_empty() {
                b = b.title(title).title_style(theme.title_style());
            }
            b
        }
        PanelStyle::Minimal => Block::default().padding(Padding::horizontal(1)),
        PanelStyle::Naked => Block::default(),
    }
}

/// The outer rounded frame around header, body and footer.
pub fn outer_frame(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_unfocused())
}
