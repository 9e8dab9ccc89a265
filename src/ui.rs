use crate::app::{push_panel_loads, update, AppMsg, Effect};
use crate::content::ContentProvider;
use crate::layout::{Inset, LayoutDimensions, PanelKind, TemplateKind, TemplateRegistry};
use crate::model::{matches_search, ActionArg, ActionDef, ModuleItem, StatusFilter};
use crate::services::cli_runner::discover_modules;
use crate::services::config::{DashboardConfig, SmallTerminalPolicy};
use crate::services::debounce::Debouncer;
use crate::services::loader;
use crate::widgets::chrome::outer_frame;
use crate::widgets::header::draw_header;
use crate::widgets::panel::PanelView;
use crate::widgets::status_bar::draw_footer_combined;
use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tui_textarea::TextArea;

const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UiState {
    #[default]
    Normal,
    ActionDialog,
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) config: DashboardConfig,
    pub(crate) registry: TemplateRegistry,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) modules: Vec<ModuleItem>,
    // Index into the visible (filtered) list
    pub(crate) selected: usize,
    pub(crate) selected_module: Option<ModuleItem>,
    pub(crate) ui_state: UiState,
    pub(crate) action_index: usize,
    pub(crate) selected_action: Option<ActionDef>,
    pub(crate) prompt_args: Vec<ActionArg>,
    pub(crate) prompt_inputs: Vec<TextArea<'static>>,
    pub(crate) prompt_index: usize,
    pub(crate) preview_cache: HashMap<String, String>,
    pub(crate) preview_loading: Option<String>,
    pub(crate) preview_debounce: Debouncer,
    pub(crate) filter_status: StatusFilter,
    pub(crate) search_term: String,
    pub(crate) search_editing: bool,
    pub(crate) show_details: bool,
    // Only moved by PgUp/PgDn
    pub(crate) menu_scroll: usize,
    pub(crate) content_scroll: usize,
    // Output of the filter/stats commands, when configured
    pub(crate) panel_text: HashMap<PanelKind, Result<String, String>>,
    pub(crate) last_error: Option<String>,
    pub(crate) status_text: Option<String>,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) quit: bool,
    pub(crate) debug_log: VecDeque<String>,
    tx: Option<Sender<LoadMsg>>,
    rx: Option<Receiver<LoadMsg>>,
}

impl AppState {
    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        let msg = msg.into();
        tracing::debug!("{msg}");
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg);
    }

    /// Modules passing the status filter and the search term, in discovery order.
    pub fn visible_modules(&self) -> Vec<&ModuleItem> {
        self.modules
            .iter()
            .filter(|m| self.filter_status.matches(m.status) && matches_search(m, &self.search_term))
            .collect()
    }

    pub fn current_module(&self) -> Option<&ModuleItem> {
        self.visible_modules().get(self.selected).copied()
    }

    /// Clamp the cursor into the visible list and snapshot the module under it.
    pub fn sync_selected(&mut self) {
        let len = self.visible_modules().len();
        self.selected = self.selected.min(len.saturating_sub(1));
        self.selected_module = self.current_module().cloned();
    }

    pub fn active_template(&self) -> TemplateKind {
        self.registry
            .select(self.width, self.height, self.config.layout.as_deref())
    }

    fn too_small(&self) -> bool {
        self.width < self.config.min_width || self.height < self.config.min_height
    }
}

#[derive(Debug)]
pub(crate) enum LoadOutcome {
    Modules(Vec<ModuleItem>),
    Text(String),
    Executed {
        module: String,
        action: String,
        output: String,
    },
}

#[derive(Debug)]
pub(crate) struct LoadMsg {
    pub key: String,
    pub outcome: Result<LoadOutcome, String>,
    pub kind: LoadKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadKind {
    Modules,
    Preview,
    Action,
    Panel(PanelKind),
}

fn text_outcome(outcome: Result<LoadOutcome, String>) -> Result<String, String> {
    match outcome? {
        LoadOutcome::Text(t) => Ok(t),
        LoadOutcome::Executed { output, .. } => Ok(output),
        LoadOutcome::Modules(_) => Err("unexpected module list".to_string()),
    }
}

/// Turn a worker completion into the message the update function understands.
fn load_msg_to_app(msg: LoadMsg) -> AppMsg {
    let LoadMsg { key, outcome, kind } = msg;
    match kind {
        LoadKind::Modules => AppMsg::ModulesRefreshed(match outcome {
            Ok(LoadOutcome::Modules(list)) => Ok(list),
            Ok(_) => Err("unexpected discovery result".to_string()),
            Err(e) => Err(e),
        }),
        LoadKind::Preview => AppMsg::PreviewLoaded {
            module: key,
            outcome: text_outcome(outcome),
        },
        LoadKind::Action => {
            let key = match &outcome {
                Ok(LoadOutcome::Executed { module, action, .. }) => format!("{module}:{action}"),
                _ => key,
            };
            AppMsg::ActionExecuted {
                key,
                outcome: text_outcome(outcome),
            }
        }
        LoadKind::Panel(panel) => AppMsg::PanelLoaded {
            panel,
            outcome: text_outcome(outcome),
        },
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::RunAction(req) => {
                state.dbg(format!("run action {}:{}", req.module, req.action));
                if let Some(tx) = &state.tx {
                    loader::spawn_run_action(
                        state.config.shell.clone(),
                        state.config.action_cmd.clone(),
                        req,
                        tx.clone(),
                    );
                }
            }
            Effect::LoadPreview { module } => {
                state.dbg(format!("load preview {module}"));
                if let Some(tx) = &state.tx {
                    loader::spawn_load_preview(
                        state.config.shell.clone(),
                        state.config.details_cmd.clone(),
                        module,
                        tx.clone(),
                    );
                }
            }
            Effect::RefreshModules => {
                state.dbg("refresh modules");
                if let Some(tx) = &state.tx {
                    loader::spawn_refresh_modules(
                        state.config.shell.clone(),
                        state.config.list_cmd.clone(),
                        tx.clone(),
                    );
                }
            }
            Effect::LoadPanelText { panel, cmdline } => {
                state.dbg(format!("load {} panel -> {cmdline}", panel.name()));
                if let Some(tx) = &state.tx {
                    loader::spawn_load_panel_text(
                        state.config.shell.clone(),
                        panel,
                        cmdline,
                        tx.clone(),
                    );
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
            Effect::Quit => state.quit = true,
        }
    }
}

/// Apply every completion that has arrived, in arrival order.
fn pump_loader(state: &mut AppState) {
    let mut drained: Vec<LoadMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    for msg in drained {
        let effects = update(state, load_msg_to_app(msg));
        run_effects(state, effects);
    }
}

fn pump_debounce(state: &mut AppState) {
    if let Some(module) = state.preview_debounce.poll(Instant::now()) {
        let effects = update(state, AppMsg::PreviewDue(module));
        run_effects(state, effects);
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

fn env_num<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn init_state(config: DashboardConfig) -> Result<AppState> {
    let modules = discover_modules(&config.shell, &config.list_cmd)
        .context("initial module discovery failed")?;
    let (tx, rx) = mpsc::channel::<LoadMsg>();
    let mut state = AppState {
        preview_debounce: Debouncer::new(Duration::from_millis(config.debounce_ms)),
        search_term: config.search.clone(),
        theme: crate::theme::Theme::synthwave_dark(),
        modules,
        config,
        tx: Some(tx),
        rx: Some(rx),
        ..Default::default()
    };
    state.sync_selected();
    state.dbg(format!(
        "discovered {} modules, templates: {}",
        state.modules.len(),
        state.registry.names().collect::<Vec<_>>().join(",")
    ));
    if let Some(name) = state.current_module().map(|m| m.name.clone()) {
        state.preview_debounce.schedule(name, Instant::now());
    }
    let mut effects = Vec::new();
    push_panel_loads(&state, &mut effects);
    run_effects(&mut state, effects);
    Ok(state)
}

pub fn run() -> Result<()> {
    let config = DashboardConfig::load()?;
    crate::logging::init(&config)?;
    let mut state = init_state(config)?;

    // Headless smoke mode
    if env_flag("NCC_TUI_HEADLESS") {
        let width = env_num("NCC_TUI_WIDTH", 120u16);
        let height = env_num("NCC_TUI_HEIGHT", 30u16);
        let ticks = env_num("NCC_TUI_TICKS", 10u64);
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend)?;
        for _ in 0..ticks {
            terminal.draw(|f| draw(f, &mut state))?;
            pump_debounce(&mut state);
            pump_loader(&mut state);
            state.tick = state.tick.wrapping_add(1);
            std::thread::sleep(TICK_RATE);
        }
        terminal.draw(|f| draw(f, &mut state))?;
        println!("{}", buffer_to_string(terminal.backend().buffer()));
        return Ok(());
    }

    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut last_tick = Instant::now();
    let res = loop {
        terminal.draw(|f| draw(f, &mut state))?;
        if state.too_small() && state.config.small_terminal == SmallTerminalPolicy::Exit {
            break Err(anyhow!(
                "terminal too small: {}x{} (need {}x{})",
                state.width,
                state.height,
                state.config.min_width,
                state.config.min_height
            ));
        }
        let mut timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if let Some(due) = state.preview_debounce.time_until(Instant::now()) {
            timeout = timeout.min(due);
        }
        if event::poll(timeout)? {
            let msg = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppMsg::Key(key)),
                Event::Resize(width, height) => Some(AppMsg::Resize { width, height }),
                _ => None,
            };
            if let Some(msg) = msg {
                let effects = update(&mut state, msg);
                run_effects(&mut state, effects);
            }
        }
        if state.quit {
            break Ok(());
        }
        pump_debounce(&mut state);
        pump_loader(&mut state);
        if last_tick.elapsed() >= TICK_RATE {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };
    // Restore
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    res
}

pub(crate) fn buffer_to_string(buf: &Buffer) -> String {
    let mut out = String::new();
    for y in 0..buf.area.height {
        let line: String = (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Panel whose text a placement shows. Templates without an actions panel hand the
/// dialog and prompt to their main text panel.
fn panel_source(template: TemplateKind, panel: PanelKind, ui_state: UiState) -> PanelKind {
    if ui_state != UiState::Normal && template.actions_host() == Some(panel) {
        PanelKind::Actions
    } else {
        panel
    }
}

fn draw(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }
    let screen = f.area();
    state.width = screen.width;
    state.height = screen.height;
    let bg = Block::default().style(Style::default().bg(state.theme.bg));
    f.render_widget(bg, screen);
    if state.too_small() {
        draw_too_small(f, screen, state);
        return;
    }

    f.render_widget(outer_frame(&state.theme), screen);
    let dims = LayoutDimensions::resolve(screen.width, screen.height, Inset::outer_border());
    let (header, body, footer) = dims.regions(screen);
    let template = state.active_template();
    draw_header(f, header.intersection(screen), state, template);

    let provider = ContentProvider::new(state);
    for p in template.place(body) {
        let area = p.area.intersection(screen);
        if area.is_empty() {
            continue;
        }
        let source = panel_source(template, p.panel, state.ui_state);
        let scroll = match source {
            PanelKind::Menu => state.menu_scroll,
            PanelKind::Content | PanelKind::Preview => state.content_scroll,
            _ => 0,
        };
        let focused = match state.ui_state {
            UiState::Normal => source == PanelKind::Menu,
            _ => source == PanelKind::Actions,
        };
        let view = PanelView::new(p.title, provider.content(source), p.style, &state.theme)
            .scroll(scroll)
            .focused(focused);
        f.render_widget(view, area);
    }

    draw_footer_combined(f, footer.intersection(screen), state);
}

fn draw_too_small(f: &mut Frame, area: Rect, state: &AppState) {
    let lines = vec![
        Line::styled("Terminal too small", state.theme.text_error()),
        Line::raw(format!(
            "Need {}x{}, have {}x{}",
            state.config.min_width, state.config.min_height, state.width, state.height
        )),
    ];
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let inner = Rect::new(area.x, area.y + top, area.width, area.height - top);
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(p, inner);
}
