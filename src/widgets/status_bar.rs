use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::{AppState, ToastLevel};

const SPINNER: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

/// Spinner + running status, then the toast, then the key help.
pub fn footer_line(state: &AppState) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    if let Some(msg) = &state.status_text {
        let spinner = SPINNER[state.tick as usize % SPINNER.len()];
        spans.push(Span::raw(format!("{spinner} {msg}")));
        spans.push(Span::raw("  |  "));
    }
    if let Some(t) = &state.toast {
        let color = state.theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    if state.search_editing {
        spans.push(Span::styled(
            "Enter keep • Esc clear  |  ",
            state.theme.text_active_bold(),
        ));
    }
    spans.push(Span::styled(
        state.config.footer.clone(),
        state.theme.text_muted(),
    ));
    Line::from(spans)
}

pub fn draw_footer_combined(f: &mut Frame, area: Rect, state: &AppState) {
    let p = Paragraph::new(footer_line(state));
    f.render_widget(p, area);
}
