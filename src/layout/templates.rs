use ratatui::layout::Rect;
use std::collections::BTreeMap;

/// Width used for a panel that declares no minimum.
pub const DEFAULT_MIN_WIDTH: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelKind {
    Menu,
    Content,
    Filter,
    Actions,
    Stats,
    Preview,
}

impl PanelKind {
    pub fn name(self) -> &'static str {
        match self {
            PanelKind::Menu => "menu",
            PanelKind::Content => "content",
            PanelKind::Filter => "filter",
            PanelKind::Actions => "actions",
            PanelKind::Stats => "stats",
            PanelKind::Preview => "preview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelStyle {
    #[default]
    Bordered,
    Card,
    Minimal,
    Naked,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    pub panel: PanelKind,
    pub title: &'static str,
    pub min_width: u16,
    pub weight: f32,
    pub style: PanelStyle,
}

fn spec(panel: PanelKind, title: &'static str, min_width: u16, weight: f32) -> PanelSpec {
    PanelSpec {
        panel,
        title,
        min_width,
        weight,
        style: PanelStyle::Bordered,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub panel: PanelKind,
    pub title: &'static str,
    pub style: PanelStyle,
    pub area: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKind {
    Emergency,
    UltraCompact,
    Compact,
    Medium,
    Full,
    Fzf,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::Emergency,
        TemplateKind::UltraCompact,
        TemplateKind::Compact,
        TemplateKind::Medium,
        TemplateKind::Full,
        TemplateKind::Fzf,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Emergency => "emergency",
            TemplateKind::UltraCompact => "ultra-compact",
            TemplateKind::Compact => "compact",
            TemplateKind::Medium => "medium",
            TemplateKind::Full => "full",
            TemplateKind::Fzf => "fzf",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let n = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.name() == n)
    }

    /// Declared minimum terminal size. Selection uses breakpoints; the Emergency
    /// minimum is the default guard-screen threshold.
    pub fn min_size(self) -> (u16, u16) {
        match self {
            TemplateKind::Emergency => (20, 5),
            TemplateKind::UltraCompact => (40, 12),
            TemplateKind::Compact => (60, 15),
            TemplateKind::Medium => (100, 12),
            TemplateKind::Full => (140, 15),
            TemplateKind::Fzf => (60, 8),
        }
    }

    pub fn has_panel(self, kind: PanelKind) -> bool {
        self.panels().iter().any(|p| p.panel == kind)
    }

    /// Panel that stands in for the missing actions panel: Content, then Preview, then Menu.
    /// `None` when the template has its own actions panel.
    pub fn actions_host(self) -> Option<PanelKind> {
        if self.has_panel(PanelKind::Actions) {
            return None;
        }
        [PanelKind::Content, PanelKind::Preview, PanelKind::Menu]
            .into_iter()
            .find(|k| self.has_panel(*k))
    }

    pub fn panels(self) -> Vec<PanelSpec> {
        use PanelKind::*;
        match self {
            TemplateKind::Full => vec![
                spec(Menu, "MENU", 20, 0.2),
                spec(Content, "CONTENT", 25, 0.4),
                spec(Filter, "FILTER", 15, 0.13),
                spec(Actions, "ACTIONS", 15, 0.13),
                spec(Stats, "STATS", 15, 0.13),
            ],
            TemplateKind::Medium => vec![
                spec(Menu, "MENU", 20, 0.25),
                spec(Content, "CONTENT", 25, 0.5),
                spec(Actions, "ACTIONS", 15, 0.25),
            ],
            TemplateKind::Compact => vec![
                spec(Menu, "MENU", 25, 0.5),
                spec(Content, "CONTENT", 25, 0.5),
                spec(Stats, "STATS", 15, 1.0),
            ],
            TemplateKind::UltraCompact => vec![
                spec(Menu, "MENU", 20, 1.0),
                spec(Content, "CONTENT", 20, 1.0),
                spec(Stats, "STATS", 15, 1.0),
            ],
            TemplateKind::Emergency => vec![PanelSpec {
                style: PanelStyle::Minimal,
                ..spec(Menu, "MODULES", 20, 1.0)
            }],
            TemplateKind::Fzf => vec![spec(Menu, "", 25, 0.35), spec(Preview, "", 35, 0.65)],
        }
    }

    /// Positions every panel inside `body`. Pure: same input, same output.
    pub fn place(self, body: Rect) -> Vec<Placement> {
        let panels = self.panels();
        match self {
            TemplateKind::Full | TemplateKind::Medium | TemplateKind::Fzf => {
                place_row(&panels, body)
            }
            TemplateKind::Compact => {
                let top_h = body.height.saturating_mul(2) / 3;
                let top = Rect::new(body.x, body.y, body.width, top_h);
                let bottom = Rect::new(
                    body.x,
                    body.y.saturating_add(top_h),
                    body.width,
                    body.height - top_h,
                );
                let mut out = place_row(&panels[..2], top);
                out.push(placement(&panels[2], bottom));
                out
            }
            TemplateKind::UltraCompact => {
                let third = body.height / 3;
                let mut y = body.y;
                let mut out = Vec::with_capacity(panels.len());
                for (i, p) in panels.iter().enumerate() {
                    let h = if i + 1 == panels.len() {
                        body.height - third * (panels.len() as u16 - 1)
                    } else {
                        third
                    };
                    out.push(placement(p, Rect::new(body.x, y, body.width, h)));
                    y = y.saturating_add(h);
                }
                out
            }
            TemplateKind::Emergency => vec![placement(&panels[0], body)],
        }
    }
}

fn placement(p: &PanelSpec, area: Rect) -> Placement {
    Placement {
        panel: p.panel,
        title: p.title,
        style: p.style,
        area,
    }
}

fn place_row(panels: &[PanelSpec], row: Rect) -> Vec<Placement> {
    let widths = distribute_widths(row.width, panels);
    let mut x = row.x;
    panels
        .iter()
        .zip(widths)
        .map(|(p, w)| {
            let area = Rect::new(x, row.y, w, row.height);
            x = x.saturating_add(w);
            placement(p, area)
        })
        .collect()
}

/// Two passes: every panel gets its minimum, then the rest is shared by weight.
/// Fractional cells are dropped, so the sum never exceeds `total`.
pub fn distribute_widths(total: u16, panels: &[PanelSpec]) -> Vec<u16> {
    let mins: Vec<u16> = panels
        .iter()
        .map(|p| {
            if p.min_width == 0 {
                DEFAULT_MIN_WIDTH
            } else {
                p.min_width
            }
        })
        .collect();
    let min_sum: u32 = mins.iter().map(|&m| m as u32).sum();
    if min_sum == 0 {
        return mins;
    }
    if min_sum > total as u32 {
        // Minimums do not fit: shrink them proportionally.
        return mins
            .iter()
            .map(|&m| (m as u32 * total as u32 / min_sum) as u16)
            .collect();
    }
    let remaining = total as u32 - min_sum;
    let weight_sum: f64 = panels.iter().map(|p| p.weight.max(0.0) as f64).sum();
    if weight_sum <= 0.0 {
        return mins;
    }
    let mut widths: Vec<u16> = panels
        .iter()
        .zip(&mins)
        .map(|(p, &m)| {
            let extra = (remaining as f64 * p.weight.max(0.0) as f64 / weight_sum).floor();
            m.saturating_add(extra as u16)
        })
        .collect();
    // Float rounding must never push the sum past the row.
    let mut sum: u32 = widths.iter().map(|&w| w as u32).sum();
    let mut i = widths.len();
    while sum > total as u32 && i > 0 {
        i -= 1;
        if widths[i] > mins[i] {
            widths[i] -= 1;
            sum -= 1;
            i += 1;
        }
    }
    widths
}

/// Templates available for selection, fixed at startup.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<&'static str, TemplateKind>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_templates(TemplateKind::ALL)
    }
}

impl TemplateRegistry {
    pub fn with_templates(kinds: impl IntoIterator<Item = TemplateKind>) -> Self {
        Self {
            templates: kinds.into_iter().map(|k| (k.name(), k)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<TemplateKind> {
        TemplateKind::from_name(name).and_then(|k| self.templates.get(k.name()).copied())
    }

    pub fn contains(&self, kind: TemplateKind) -> bool {
        self.templates.contains_key(kind.name())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.keys().copied()
    }

    pub fn select(&self, width: u16, height: u16, override_name: Option<&str>) -> TemplateKind {
        if let Some(kind) = override_name.and_then(|n| self.get(n)) {
            return kind;
        }
        let kind = breakpoint(width, height);
        if self.contains(kind) {
            kind
        } else {
            TemplateKind::Emergency
        }
    }
}

fn breakpoint(width: u16, height: u16) -> TemplateKind {
    if width < 40 || height < 5 {
        TemplateKind::Emergency
    } else if width < 60 {
        TemplateKind::UltraCompact
    } else if width < 100 {
        TemplateKind::Compact
    } else if width < 140 {
        TemplateKind::Medium
    } else {
        TemplateKind::Full
    }
}
