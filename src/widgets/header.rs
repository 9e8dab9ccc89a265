use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::layout::TemplateKind;
use crate::ui::AppState;

/// Title on the left; template, filter and terminal size on the right.
pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState, template: TemplateKind) {
    let title = Span::styled(format!(" {} ", state.config.title), state.theme.title_style());
    let mut info = format!(
        "{} | {} | {}x{}",
        template.name(),
        state.filter_status.as_str(),
        state.width,
        state.height
    );
    if !state.search_term.is_empty() {
        info = format!("/{} | {info}", state.search_term);
    }
    let used = title.width() as u16;
    let right_w = (info.chars().count() as u16 + 1).min(area.width.saturating_sub(used));
    f.render_widget(Paragraph::new(Line::from(title)), area);
    if right_w > 0 {
        let right = Rect {
            x: area.x + area.width - right_w,
            y: area.y,
            width: right_w,
            height: area.height.min(1),
        };
        let p = Paragraph::new(Line::styled(info, state.theme.text_muted()))
            .alignment(Alignment::Right);
        f.render_widget(p, right);
    }
}
