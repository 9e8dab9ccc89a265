use ratatui::layout::Rect;

pub const HEADER_HEIGHT: u16 = 1;
pub const FOOTER_HEIGHT: u16 = 1;
/// Smallest body the templates are ever asked to fill.
pub const BODY_FLOOR_WIDTH: u16 = 16;
pub const BODY_FLOOR_HEIGHT: u16 = 1;

/// Cells consumed around the body by the outer frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inset {
    pub horizontal: u16,
    pub vertical: u16,
}

impl Inset {
    /// One-cell rounded border on every side.
    pub const fn outer_border() -> Self {
        Self {
            horizontal: 2,
            vertical: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDimensions {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub inner_width: u16,
    pub inner_height: u16,
    pub header_height: u16,
    pub footer_height: u16,
    pub body_width: u16,
    pub body_height: u16,
}

impl LayoutDimensions {
    pub fn resolve(width: u16, height: u16, inset: Inset) -> Self {
        let inner_width = width.saturating_sub(inset.horizontal);
        let inner_height = height.saturating_sub(inset.vertical);
        let body_width = inner_width.max(BODY_FLOOR_WIDTH);
        let body_height = inner_height
            .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT)
            .max(BODY_FLOOR_HEIGHT);
        Self {
            terminal_width: width,
            terminal_height: height,
            inner_width,
            inner_height,
            header_height: HEADER_HEIGHT,
            footer_height: FOOTER_HEIGHT,
            body_width,
            body_height,
        }
    }

    /// Rects for header, body and footer inside an outer frame rooted at `origin`.
    pub fn regions(&self, origin: Rect) -> (Rect, Rect, Rect) {
        let x = origin.x.saturating_add(self.terminal_width.saturating_sub(self.inner_width) / 2);
        let y = origin
            .y
            .saturating_add(self.terminal_height.saturating_sub(self.inner_height) / 2);
        let header = Rect::new(x, y, self.inner_width, self.header_height);
        let body = Rect::new(
            x,
            y.saturating_add(self.header_height),
            self.body_width,
            self.body_height,
        );
        let footer = Rect::new(
            x,
            body.y.saturating_add(self.body_height),
            self.inner_width,
            self.footer_height,
        );
        (header, body, footer)
    }
}
