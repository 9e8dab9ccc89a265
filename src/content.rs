use crate::layout::PanelKind;
use crate::model::{ModuleStatus, StatusFilter};
use crate::ui::{AppState, UiState};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};

/// Number of debug entries appended to the stats panel in debug mode.
const DEBUG_TAIL: usize = 8;

/// Produces the text of every panel from the current state. Never runs commands:
/// command-backed panels read what the loader already cached.
pub struct ContentProvider<'a> {
    state: &'a AppState,
}

impl<'a> ContentProvider<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub fn content(&self, panel: PanelKind) -> Text<'static> {
        let text = match panel {
            PanelKind::Menu => self.menu(),
            PanelKind::Content => self.details(),
            PanelKind::Filter => self.filter(),
            PanelKind::Actions => self.actions(),
            PanelKind::Stats => self.stats(),
            PanelKind::Preview => self.preview(),
        };
        self.with_hosted_error(panel, text)
    }

    /// Without an actions panel the last error goes on top of the host panel.
    fn with_hosted_error(&self, panel: PanelKind, text: Text<'static>) -> Text<'static> {
        let st = self.state;
        let Some(err) = &st.last_error else {
            return text;
        };
        if st.ui_state != UiState::Normal || st.active_template().actions_host() != Some(panel) {
            return text;
        }
        let mut lines: Vec<Line<'static>> = err
            .lines()
            .map(|l| Line::styled(l.to_string(), st.theme.text_error()))
            .collect();
        lines.push(Line::raw(""));
        lines.extend(text.lines);
        Text::from(lines)
    }

    fn menu(&self) -> Text<'static> {
        let st = self.state;
        let visible = st.visible_modules();
        if visible.is_empty() {
            let msg = if st.modules.is_empty() {
                "No modules loaded"
            } else {
                "No modules match the current filter"
            };
            return Text::from(Line::styled(msg, st.theme.text_muted()));
        }
        let lines: Vec<Line<'static>> = visible
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let marker = Span::styled(
                    format!("{} ", m.status.marker()),
                    st.theme.status_style(m.status),
                );
                if i == st.selected {
                    Line::from(vec![
                        Span::styled("▸ ", st.theme.text_active_bold()),
                        marker,
                        Span::styled(m.name.clone(), st.theme.list_cursor_style()),
                    ])
                } else {
                    Line::from(vec![Span::raw("  "), marker, Span::raw(m.name.clone())])
                }
            })
            .collect();
        Text::from(lines)
    }

    fn details(&self) -> Text<'static> {
        let st = self.state;
        match st.ui_state {
            UiState::ActionDialog => return Text::raw("Choose an action for the selected item."),
            UiState::Prompt => return Text::raw("Provide the required inputs to run this action."),
            UiState::Normal => {}
        }
        let Some(m) = st.current_module() else {
            let msg = if st.modules.is_empty() {
                "No modules loaded"
            } else {
                "No module selected"
            };
            return Text::from(Line::styled(msg, st.theme.text_muted()));
        };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(m.name.clone(), st.theme.text_active_bold()),
                Span::raw("  "),
                Span::styled(m.status.as_str().to_string(), st.theme.status_style(m.status)),
            ]),
        ];
        if !m.description.is_empty() {
            lines.push(Line::raw(m.description.clone()));
        }
        if st.show_details {
            lines.push(Line::raw(""));
            if !m.category.is_empty() {
                lines.push(Line::raw(format!("Category: {}", m.category)));
            }
            if !m.path.is_empty() {
                lines.push(Line::raw(format!("Path: {}", m.path)));
            }
            if let Some(a) = m.default_action() {
                lines.push(Line::raw(format!("Default action: {a}")));
            }
            if !m.actions.is_empty() {
                let names: Vec<&str> = m.actions.iter().map(|a| a.display_label()).collect();
                lines.push(Line::raw(format!("Actions: {}", names.join(", "))));
            }
        }
        let preview = self.preview_for(&m.name);
        if !preview.lines.is_empty() {
            lines.push(Line::raw(""));
            lines.extend(preview.lines);
        }
        Text::from(lines)
    }

    fn preview(&self) -> Text<'static> {
        match self.state.current_module() {
            Some(m) => self.preview_for(&m.name),
            None => Text::default(),
        }
    }

    /// `Loading...` while in flight, then the cached text, else nothing.
    fn preview_for(&self, name: &str) -> Text<'static> {
        let st = self.state;
        if st.preview_loading.as_deref() == Some(name) {
            return Text::from(Line::styled("Loading...", st.theme.text_muted()));
        }
        match st.preview_cache.get(name) {
            Some(text) if text.starts_with("Error:") => {
                Text::from(Line::styled(text.clone(), st.theme.text_error()))
            }
            Some(text) => Text::raw(text.clone()),
            None => Text::default(),
        }
    }

    fn command_text(&self, panel: PanelKind) -> Option<Text<'static>> {
        let st = self.state;
        let configured = match panel {
            PanelKind::Filter => st.config.filter_cmd.is_some(),
            PanelKind::Stats => st.config.stats_cmd.is_some(),
            _ => false,
        };
        if !configured {
            return None;
        }
        Some(match st.panel_text.get(&panel) {
            Some(Ok(text)) => Text::raw(text.clone()),
            Some(Err(e)) => Text::from(Line::styled(format!("Error: {e}"), st.theme.text_error())),
            None => Text::from(Line::styled("Loading...", st.theme.text_muted())),
        })
    }

    fn filter(&self) -> Text<'static> {
        if let Some(text) = self.command_text(PanelKind::Filter) {
            return text;
        }
        let st = self.state;
        let cursor = if st.search_editing { "▏" } else { "" };
        let mut lines = vec![
            Line::raw(format!("Status: {}", st.filter_status.as_str())),
            Line::raw(format!("Search: {}{cursor}", st.search_term)),
            Line::raw(""),
            Line::raw("Available Filters:"),
        ];
        for f in StatusFilter::ALL {
            let desc = match f {
                StatusFilter::All => "Show all modules",
                StatusFilter::Enabled => "Only enabled",
                StatusFilter::Disabled => "Only disabled",
                StatusFilter::Broken => "Only broken",
            };
            let text = format!("• {} - {desc}", f.as_str());
            if f == st.filter_status {
                lines.push(Line::styled(text, st.theme.text_active_bold()));
            } else {
                lines.push(Line::raw(text));
            }
        }
        Text::from(lines)
    }

    fn actions(&self) -> Text<'static> {
        let st = self.state;
        let mut lines: Vec<Line<'static>> = Vec::new();
        match st.ui_state {
            UiState::ActionDialog => {
                lines.push(Line::raw("Select action:"));
                let actions = st
                    .selected_module
                    .as_ref()
                    .map(|m| m.actions.as_slice())
                    .unwrap_or_default();
                for (i, a) in actions.iter().enumerate() {
                    if i == st.action_index {
                        lines.push(Line::styled(
                            format!("> {}", a.display_label()),
                            st.theme.text_active_bold(),
                        ));
                    } else {
                        lines.push(Line::raw(format!("  {}", a.display_label())));
                    }
                }
                lines.push(Line::raw(""));
                lines.push(Line::styled("Enter: confirm • Esc: cancel", st.theme.text_muted()));
            }
            UiState::Prompt => {
                lines.push(Line::raw("Fill inputs:"));
                for (i, (arg, input)) in st.prompt_args.iter().zip(&st.prompt_inputs).enumerate() {
                    let value = input.lines().first().cloned().unwrap_or_default();
                    let shown = if input.mask_char().is_some() {
                        "•".repeat(value.chars().count())
                    } else {
                        value
                    };
                    let focused = i == st.prompt_index;
                    let prefix = if focused { "> " } else { "  " };
                    let style = if focused {
                        st.theme.text_active_bold()
                    } else {
                        Style::default()
                    };
                    let mut spans = vec![Span::styled(
                        format!("{prefix}{}: {shown}", arg.prompt_label()),
                        style,
                    )];
                    if focused {
                        spans.push(Span::styled("▏", st.theme.text_active_bold()));
                    }
                    lines.push(Line::from(spans));
                }
                lines.push(Line::raw(""));
                lines.push(Line::styled(
                    "Enter: next/submit • Esc: cancel",
                    st.theme.text_muted(),
                ));
            }
            UiState::Normal => {
                if let Some(s) = &st.status_text {
                    lines.push(Line::styled(s.clone(), st.theme.text_active_bold()));
                }
                if let Some(e) = &st.last_error {
                    for l in e.lines() {
                        lines.push(Line::styled(l.to_string(), st.theme.text_error()));
                    }
                }
                if !lines.is_empty() {
                    lines.push(Line::raw(""));
                }
                match st.current_module() {
                    Some(m) if !m.actions.is_empty() => {
                        lines.push(Line::raw("Actions:"));
                        for a in &m.actions {
                            lines.push(Line::raw(format!("• {}", a.display_label())));
                        }
                    }
                    Some(m) => match m.default_action() {
                        Some(a) => lines.push(Line::raw(format!("Default action: {a}"))),
                        None => lines.push(Line::styled("No actions", st.theme.text_muted())),
                    },
                    None => {}
                }
                lines.push(Line::raw(""));
                lines.push(Line::styled("Enter/a: run action", st.theme.text_muted()));
                lines.push(Line::styled(
                    "c connect • x delete • E edit • n add",
                    st.theme.text_muted(),
                ));
            }
        }
        Text::from(lines)
    }

    fn stats(&self) -> Text<'static> {
        let st = self.state;
        let mut lines: Vec<Line<'static>> = match self.command_text(PanelKind::Stats) {
            Some(text) => text.lines,
            None => {
                let total = st.modules.len();
                let count = |s: ModuleStatus| st.modules.iter().filter(|m| m.status == s).count();
                let pct = |n: usize| {
                    if total == 0 {
                        0.0
                    } else {
                        n as f64 * 100.0 / total as f64
                    }
                };
                let enabled = count(ModuleStatus::Enabled);
                let disabled = count(ModuleStatus::Disabled);
                vec![
                    Line::raw(format!("Total: {total}")),
                    Line::raw(format!("Enabled: {enabled} ({:.0}%)", pct(enabled))),
                    Line::raw(format!("Disabled: {disabled} ({:.0}%)", pct(disabled))),
                    Line::raw(format!("Broken: {}", count(ModuleStatus::Broken))),
                    Line::raw(format!("Unknown: {}", count(ModuleStatus::Unknown))),
                    Line::raw(""),
                    Line::raw(format!("Terminal: {}x{}", st.width, st.height)),
                    Line::raw(format!("Layout: {}", st.active_template().name())),
                ]
            }
        };
        if st.config.debug {
            lines.push(Line::raw(""));
            lines.push(Line::styled("Debug:", st.theme.text_muted()));
            if let Some(pending) = st.preview_debounce.pending() {
                lines.push(Line::styled(format!("preview due: {pending}"), st.theme.text_muted()));
            }
            let start = st.debug_log.len().saturating_sub(DEBUG_TAIL);
            for entry in st.debug_log.iter().skip(start) {
                lines.push(Line::styled(entry.clone(), st.theme.text_muted()));
            }
        }
        Text::from(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionDef, ModuleItem};

    fn text_of(t: &Text) -> String {
        t.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn state() -> AppState {
        let mut st = AppState::default();
        st.modules = vec![
            ModuleItem {
                name: "audio".into(),
                status: ModuleStatus::Enabled,
                actions: vec![
                    ActionDef {
                        name: "enable".into(),
                        ..Default::default()
                    },
                    ActionDef {
                        name: "disable".into(),
                        label: "Turn off".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
            ModuleItem {
                name: "net".into(),
                status: ModuleStatus::Broken,
                ..Default::default()
            },
        ];
        st.width = 120;
        st.height = 30;
        st.sync_selected();
        st
    }

    #[test]
    fn stats_count_statuses_and_percentages() {
        let st = state();
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Stats));
        assert!(s.contains("Total: 2"));
        assert!(s.contains("Enabled: 1 (50%)"));
        assert!(s.contains("Broken: 1"));
        assert!(s.contains("Terminal: 120x30"));
        assert!(s.contains("Layout: medium"));
    }

    #[test]
    fn content_shows_loading_then_cached_text() {
        let mut st = state();
        st.preview_loading = Some("audio".into());
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Preview));
        assert_eq!(s, "Loading...");
        st.preview_loading = None;
        st.preview_cache.insert("audio".into(), "ALSA ready".into());
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Content));
        assert!(s.contains("ALSA ready"));
        st.preview_cache.clear();
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Preview));
        assert_eq!(s, "");
    }

    #[test]
    fn action_dialog_lists_labels_with_cursor() {
        let mut st = state();
        st.ui_state = UiState::ActionDialog;
        st.action_index = 1;
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Actions));
        assert!(s.starts_with("Select action:"));
        assert!(s.contains("  enable"));
        assert!(s.contains("> Turn off"));
        assert!(s.contains("Enter: confirm • Esc: cancel"));
        let c = text_of(&ContentProvider::new(&st).content(PanelKind::Content));
        assert_eq!(c, "Choose an action for the selected item.");
    }

    #[test]
    fn menu_marks_selection_and_respects_filter() {
        let mut st = state();
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Menu));
        assert!(s.lines().next().unwrap().starts_with("▸ "));
        st.filter_status = StatusFilter::Disabled;
        st.sync_selected();
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Menu));
        assert_eq!(s, "No modules match the current filter");
    }

    #[test]
    fn command_backed_stats_wait_for_loader() {
        let mut st = state();
        st.config.stats_cmd = Some("stats".into());
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Stats));
        assert_eq!(s, "Loading...");
        st.panel_text.insert(PanelKind::Stats, Ok("42 modules".into()));
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Stats));
        assert_eq!(s, "42 modules");
    }

    #[test]
    fn filter_panel_shows_status_and_search() {
        let mut st = state();
        st.search_term = "au".into();
        let s = text_of(&ContentProvider::new(&st).content(PanelKind::Filter));
        assert!(s.contains("Status: all"));
        assert!(s.contains("Search: au"));
        assert!(s.contains("• broken - Only broken"));
    }
}
