use crate::layout::PanelStyle;
use crate::theme::Theme;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Paragraph, Widget};

/// Rows and columns a panel style consumes around its viewport.
pub fn style_overhead(style: PanelStyle) -> (u16, u16) {
    match style {
        PanelStyle::Bordered => (4, 2),
        PanelStyle::Card => (4, 4),
        PanelStyle::Minimal => (2, 1),
        PanelStyle::Naked => (0, 0),
    }
}

pub fn viewport_height(style: PanelStyle, outer_height: u16) -> u16 {
    outer_height.saturating_sub(style_overhead(style).1)
}

/// Text area inside a panel drawn over `area`. The Minimal title row counts as overhead.
pub fn viewport(style: PanelStyle, area: Rect) -> Rect {
    let (h, v) = style_overhead(style);
    Rect::new(
        area.x.saturating_add(h / 2),
        area.y.saturating_add(v.div_ceil(2)),
        area.width.saturating_sub(h),
        viewport_height(style, area.height),
    )
}

/// Clamp a scroll offset into `[0, max(0, total - viewport)]`.
pub fn clamp_scroll(offset: usize, total_lines: usize, viewport_h: u16) -> usize {
    offset.min(total_lines.saturating_sub(viewport_h as usize))
}

/// A titled, scrollable block of text whose outer size is exactly its area.
pub struct PanelView<'a> {
    title: &'a str,
    text: Text<'a>,
    style: PanelStyle,
    scroll: usize,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> PanelView<'a> {
    pub fn new(title: &'a str, text: impl Into<Text<'a>>, style: PanelStyle, theme: &'a Theme) -> Self {
        Self {
            title,
            text: text.into(),
            style,
            scroll: 0,
            focused: false,
            theme,
        }
    }

    pub fn scroll(mut self, offset: usize) -> Self {
        self.scroll = offset;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for PanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        crate::widgets::chrome::panel_block(self.title, self.style, self.focused, self.theme)
            .render(area, buf);
        let inner = viewport(self.style, area);
        if matches!(self.style, PanelStyle::Minimal) && !self.title.is_empty() {
            let title_row = Rect::new(inner.x, area.y, inner.width, 1);
            Line::styled(self.title, self.theme.title_style()).render(title_row, buf);
        }
        if inner.height == 0 || inner.width == 0 {
            return;
        }
        let offset = clamp_scroll(self.scroll, self.text.lines.len(), inner.height);
        Paragraph::new(self.text)
            .style(self.theme.base_style())
            .scroll((offset.min(u16::MAX as usize) as u16, 0))
            .render(inner, buf);
    }
}
