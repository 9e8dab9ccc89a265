use crate::layout::PanelKind;
use crate::model::{ActionArg, ActionDef, ModuleItem};
use crate::nav::keys::{is_quit, normal_action, KeyAction};
use crate::services::loader::ActionRequest;
use crate::ui::{AppState, ToastLevel, UiState};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::Instant;
use tui_textarea::{CursorMove, TextArea};

/// Rows moved by PgUp/PgDn in the menu and by J/K in the content panel.
const MENU_PAGE: usize = 10;
const CONTENT_STEP: usize = 3;

pub enum AppMsg {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    /// The debounce deadline for this module passed.
    PreviewDue(String),
    PreviewLoaded {
        module: String,
        outcome: Result<String, String>,
    },
    ActionExecuted {
        key: String,
        outcome: Result<String, String>,
    },
    ModulesRefreshed(Result<Vec<ModuleItem>, String>),
    PanelLoaded {
        panel: PanelKind,
        outcome: Result<String, String>,
    },
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    RunAction(ActionRequest),
    LoadPreview {
        module: String,
    },
    RefreshModules,
    LoadPanelText {
        panel: PanelKind,
        cmdline: String,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
    Quit,
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        Key(key) => {
            if is_quit(&key) {
                effects.push(Effect::Quit);
                return effects;
            }
            match state.ui_state {
                UiState::Normal if state.search_editing => handle_search_key(state, key),
                UiState::Normal => handle_normal_key(state, key, &mut effects),
                UiState::ActionDialog => handle_dialog_key(state, key, &mut effects),
                UiState::Prompt => handle_prompt_key(state, key, &mut effects),
            }
        }
        Resize { width, height } => {
            state.width = width;
            state.height = height;
            state.dbg(format!("resize {width}x{height}"));
        }
        PreviewDue(module) => {
            if state.preview_cache.contains_key(&module)
                || state.preview_loading.as_deref() == Some(module.as_str())
            {
                return effects;
            }
            // Selection may have moved on since the deadline was set
            if state.current_module().map(|m| m.name.as_str()) != Some(module.as_str()) {
                return effects;
            }
            if state.config.details_cmd.is_none() {
                return effects;
            }
            state.preview_loading = Some(module.clone());
            effects.push(Effect::LoadPreview { module });
        }
        PreviewLoaded { module, outcome } => {
            let text = match outcome {
                Ok(t) => t,
                Err(e) => {
                    state.dbg(format!("preview {module} failed: {e}"));
                    format!("Error: {e}")
                }
            };
            state.preview_cache.insert(module.clone(), text);
            if state.preview_loading.as_deref() == Some(module.as_str()) {
                state.preview_loading = None;
            }
        }
        ActionExecuted { key, outcome } => {
            state.status_text = None;
            reset_to_normal(state);
            match outcome {
                Ok(output) => {
                    state.last_error = None;
                    state.dbg(format!("action {key} ok"));
                    let text = match output.lines().next() {
                        Some(first) if !first.trim().is_empty() => first.trim().to_string(),
                        _ => format!("Executed {key}"),
                    };
                    effects.push(Effect::ShowToast {
                        text,
                        level: ToastLevel::Success,
                        seconds: 3,
                    });
                    effects.push(Effect::RefreshModules);
                    push_panel_loads(state, &mut effects);
                }
                Err(e) => {
                    state.dbg(format!("action {key} failed: {e}"));
                    effects.push(Effect::ShowToast {
                        text: format!("{key} failed"),
                        level: ToastLevel::Error,
                        seconds: 5,
                    });
                    state.last_error = Some(e);
                }
            }
        }
        ModulesRefreshed(outcome) => match outcome {
            Ok(modules) => {
                state.status_text = None;
                let keep = state.selected_module.as_ref().map(|m| m.name.clone());
                state.dbg(format!("refreshed {} modules", modules.len()));
                state.modules = modules;
                restore_selection(state, keep.as_deref());
            }
            Err(e) => {
                state.status_text = None;
                state.dbg(format!("refresh failed: {e}"));
                effects.push(Effect::ShowToast {
                    text: "Refresh failed".to_string(),
                    level: ToastLevel::Error,
                    seconds: 5,
                });
                state.last_error = Some(e);
            }
        },
        PanelLoaded { panel, outcome } => {
            if let Err(e) = &outcome {
                state.dbg(format!("{} panel failed: {e}", panel.name()));
            }
            state.panel_text.insert(panel, outcome);
        }
    }
    effects
}

/// Filter/stats command loads for the configured panels.
pub fn push_panel_loads(state: &AppState, effects: &mut Vec<Effect>) {
    let cmds = [
        (PanelKind::Filter, state.config.filter_cmd.as_ref()),
        (PanelKind::Stats, state.config.stats_cmd.as_ref()),
    ];
    for (panel, cmd) in cmds {
        if let Some(cmdline) = cmd {
            effects.push(Effect::LoadPanelText {
                panel,
                cmdline: cmdline.clone(),
            });
        }
    }
}

fn handle_normal_key(state: &mut AppState, key: KeyEvent, effects: &mut Vec<Effect>) {
    let Some(action) = normal_action(&key) else {
        return;
    };
    let len = state.visible_modules().len();
    let cur = state.selected;
    match action {
        KeyAction::Up => select_index(state, cur.saturating_sub(1)),
        KeyAction::Down => select_index(state, cur + 1),
        KeyAction::Top => select_index(state, 0),
        KeyAction::Bottom => select_index(state, len.saturating_sub(1)),
        KeyAction::MenuPageUp => state.menu_scroll = state.menu_scroll.saturating_sub(MENU_PAGE),
        KeyAction::MenuPageDown => {
            state.menu_scroll = (state.menu_scroll + MENU_PAGE).min(len.saturating_sub(1));
        }
        KeyAction::ContentUp => {
            state.content_scroll = state.content_scroll.saturating_sub(CONTENT_STEP);
        }
        KeyAction::ContentDown => state.content_scroll += CONTENT_STEP,
        KeyAction::RunAction => start_module_action(state, effects),
        KeyAction::Shortcut(name) => run_named_action(state, name, false, effects),
        KeyAction::Enable => run_named_action(state, "enable", true, effects),
        KeyAction::Disable => run_named_action(state, "disable", true, effects),
        KeyAction::ToggleDetails => state.show_details = !state.show_details,
        KeyAction::CycleFilter => {
            state.filter_status = state.filter_status.next();
            after_visible_change(state);
        }
        KeyAction::StartSearch => state.search_editing = true,
        KeyAction::Refresh => {
            state.status_text = Some("Refreshing...".to_string());
            effects.push(Effect::RefreshModules);
            push_panel_loads(state, effects);
        }
        KeyAction::Quit => effects.push(Effect::Quit),
    }
}

fn handle_search_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => state.search_editing = false,
        KeyCode::Esc => {
            state.search_editing = false;
            state.search_term.clear();
            after_visible_change(state);
        }
        KeyCode::Backspace => {
            state.search_term.pop();
            after_visible_change(state);
        }
        KeyCode::Char(c) => {
            state.search_term.push(c);
            after_visible_change(state);
        }
        _ => {}
    }
}

fn handle_dialog_key(state: &mut AppState, key: KeyEvent, effects: &mut Vec<Effect>) {
    let count = state
        .selected_module
        .as_ref()
        .map(|m| m.actions.len())
        .unwrap_or(0);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            state.action_index = state.action_index.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.action_index + 1 < count {
                state.action_index += 1;
            }
        }
        KeyCode::Enter => {
            let picked = state
                .selected_module
                .as_ref()
                .and_then(|m| m.actions.get(state.action_index))
                .cloned();
            match picked {
                Some(action) => begin_action(state, action, effects),
                None => reset_to_normal(state),
            }
        }
        KeyCode::Esc => reset_to_normal(state),
        _ => {}
    }
}

fn handle_prompt_key(state: &mut AppState, key: KeyEvent, effects: &mut Vec<Effect>) {
    let last = state.prompt_inputs.len().saturating_sub(1);
    match key.code {
        KeyCode::Esc => reset_to_normal(state),
        KeyCode::Enter if state.prompt_index < last => state.prompt_index += 1,
        KeyCode::Enter => submit_prompt(state, effects),
        KeyCode::Tab | KeyCode::Down => {
            state.prompt_index = (state.prompt_index + 1).min(last);
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.prompt_index = state.prompt_index.saturating_sub(1);
        }
        _ => {
            if let Some(input) = state.prompt_inputs.get_mut(state.prompt_index) {
                input.input(key);
            }
        }
    }
}

/// Enter/`a` on the selected module.
fn start_module_action(state: &mut AppState, effects: &mut Vec<Effect>) {
    let Some(module) = state.current_module().cloned() else {
        return;
    };
    state.selected_module = Some(module.clone());
    match module.actions.len() {
        0 => {
            if let Some(action) = module.default_action() {
                dispatch(state, &module.name, action, module.args.clone(), effects);
            }
        }
        1 => begin_action(state, module.actions[0].clone(), effects),
        _ => {
            state.action_index = 0;
            state.ui_state = UiState::ActionDialog;
            state.dbg(format!("action dialog for {}", module.name));
        }
    }
}

/// Shortcut lookup by action name. With `bare_fallback` an undeclared action is still
/// dispatched without arguments.
fn run_named_action(state: &mut AppState, name: &str, bare_fallback: bool, effects: &mut Vec<Effect>) {
    let Some(module) = state.current_module().cloned() else {
        return;
    };
    state.selected_module = Some(module.clone());
    match module.find_action(name) {
        Some(action) => begin_action(state, action.clone(), effects),
        None if bare_fallback => dispatch(state, &module.name, name, Vec::new(), effects),
        None => effects.push(Effect::ShowToast {
            text: format!("{} has no '{name}' action", module.name),
            level: ToastLevel::Info,
            seconds: 2,
        }),
    }
}

/// Execute immediately when the action takes no input, otherwise open the prompt.
fn begin_action(state: &mut AppState, action: ActionDef, effects: &mut Vec<Effect>) {
    let Some(module) = state.selected_module.clone() else {
        reset_to_normal(state);
        return;
    };
    if action.args.is_empty() {
        reset_to_normal(state);
        dispatch(state, &module.name, &action.name, Vec::new(), effects);
        return;
    }
    state.prompt_inputs = action.args.iter().map(prompt_input).collect();
    state.prompt_args = action.args.clone();
    state.prompt_index = 0;
    state.selected_action = Some(action);
    state.ui_state = UiState::Prompt;
}

fn prompt_input(arg: &ActionArg) -> TextArea<'static> {
    let mut input = TextArea::new(vec![arg.default.clone()]);
    if arg.secret {
        input.set_mask_char('•');
    }
    input.move_cursor(CursorMove::End);
    input
}

fn submit_prompt(state: &mut AppState, effects: &mut Vec<Effect>) {
    let (Some(module), Some(action)) = (state.selected_module.clone(), state.selected_action.clone())
    else {
        reset_to_normal(state);
        return;
    };
    let args: Vec<ActionArg> = state
        .prompt_args
        .iter()
        .zip(&state.prompt_inputs)
        .map(|(arg, input)| ActionArg {
            default: input.lines().first().cloned().unwrap_or_default(),
            ..arg.clone()
        })
        .collect();
    remember_inputs(state, &module.name, &action.name, &args);
    reset_to_normal(state);
    dispatch(state, &module.name, &action.name, args, effects);
}

fn remember_inputs(state: &mut AppState, module: &str, action: &str, args: &[ActionArg]) {
    let Some(def) = state
        .modules
        .iter_mut()
        .find(|m| m.name == module)
        .and_then(|m| m.actions.iter_mut().find(|a| a.name == action))
    else {
        return;
    };
    for (slot, arg) in def.args.iter_mut().zip(args) {
        if !slot.secret {
            slot.default = arg.default.clone();
        }
    }
}

fn dispatch(state: &mut AppState, module: &str, action: &str, args: Vec<ActionArg>, effects: &mut Vec<Effect>) {
    state.status_text = Some(format!("Running {action} on {module}..."));
    state.dbg(format!("dispatch {module}:{action} ({} args)", args.len()));
    effects.push(Effect::RunAction(ActionRequest {
        module: module.to_string(),
        action: action.to_string(),
        args,
    }));
}

fn reset_to_normal(state: &mut AppState) {
    state.ui_state = UiState::Normal;
    state.action_index = 0;
    state.selected_action = None;
    state.prompt_args.clear();
    state.prompt_inputs.clear();
    state.prompt_index = 0;
}

fn select_index(state: &mut AppState, idx: usize) {
    let len = state.visible_modules().len();
    let before = state.current_module().map(|m| m.name.clone());
    state.selected = idx.min(len.saturating_sub(1));
    state.sync_selected();
    let after = state.current_module().map(|m| m.name.clone());
    if before != after {
        state.content_scroll = 0;
        match after {
            Some(name) => state.preview_debounce.schedule(name, Instant::now()),
            None => state.preview_debounce.cancel(),
        }
    }
}

fn after_visible_change(state: &mut AppState) {
    let keep = state.selected_module.as_ref().map(|m| m.name.clone());
    restore_selection(state, keep.as_deref());
}

/// Re-point the selection at `name` in the visible list, or clamp it when the module is gone.
fn restore_selection(state: &mut AppState, name: Option<&str>) {
    let (pos, len) = {
        let visible = state.visible_modules();
        let pos = name.and_then(|n| visible.iter().position(|m| m.name == n));
        (pos, visible.len())
    };
    state.selected = pos.unwrap_or(state.selected).min(len.saturating_sub(1));
    state.sync_selected();
    let now = state.current_module().map(|m| m.name.clone());
    if now.as_deref() != name {
        if state.ui_state != UiState::Normal {
            reset_to_normal(state);
        }
        state.content_scroll = 0;
        match now {
            Some(n) => state.preview_debounce.schedule(n, Instant::now()),
            None => state.preview_debounce.cancel(),
        }
    }
}

#[cfg(test)]
mod tests;
