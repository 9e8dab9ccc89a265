use super::*;
use crate::model::{ModuleStatus, StatusFilter};
use crate::services::cli_runner::render_action_command;
use crate::services::loader::execute_action;
use crate::ui::UiState;
use crossterm::event::KeyModifiers;
use serde_json::json;

fn key(code: KeyCode) -> AppMsg {
    AppMsg::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn chars(st: &mut AppState, s: &str) {
    for c in s.chars() {
        let _ = update(st, key(KeyCode::Char(c)));
    }
}

fn state_with(modules: serde_json::Value) -> AppState {
    let mut st = AppState::default();
    st.modules = serde_json::from_value(modules).unwrap();
    st.sync_selected();
    st
}

#[test]
fn action_key_without_actions_changes_nothing() {
    let mut st = state_with(json!([{"name": "plain", "status": "enabled"}]));
    let effects = update(&mut st, key(KeyCode::Enter));
    assert!(effects.is_empty());
    assert_eq!(st.ui_state, UiState::Normal);
    assert!(st.status_text.is_none());
}

#[test]
fn single_zero_arg_action_executes_directly() {
    let mut st = state_with(json!([{"name": "audio", "actions": [{"name": "enable"}]}]));
    let effects = update(&mut st, key(KeyCode::Char('a')));
    assert_eq!(
        effects,
        vec![Effect::RunAction(ActionRequest {
            module: "audio".into(),
            action: "enable".into(),
            args: vec![],
        })]
    );
    assert_eq!(st.ui_state, UiState::Normal);
}

#[test]
fn legacy_default_action_uses_module_args() {
    let mut st = state_with(json!([{
        "name": "old",
        "action": "toggle",
        "args": [{"name": "force", "default": "yes"}]
    }]));
    let effects = update(&mut st, key(KeyCode::Enter));
    match effects.as_slice() {
        [Effect::RunAction(req)] => {
            assert_eq!(req.action, "toggle");
            assert_eq!(req.args[0].default, "yes");
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn dialog_navigation_clamps_and_escape_returns_to_normal() {
    let mut st = state_with(json!([{
        "name": "svc",
        "actions": [{"name": "start"}, {"name": "stop"}]
    }]));
    assert!(update(&mut st, key(KeyCode::Enter)).is_empty());
    assert_eq!(st.ui_state, UiState::ActionDialog);
    assert_eq!(st.action_index, 0);

    let _ = update(&mut st, key(KeyCode::Up));
    assert_eq!(st.action_index, 0);
    for _ in 0..5 {
        let _ = update(&mut st, key(KeyCode::Char('j')));
    }
    assert_eq!(st.action_index, 1);

    let _ = update(&mut st, key(KeyCode::Esc));
    assert_eq!(st.ui_state, UiState::Normal);
    assert_eq!(st.action_index, 0);
}

#[test]
fn dialog_confirm_runs_highlighted_action() {
    let mut st = state_with(json!([{
        "name": "svc",
        "actions": [{"name": "start"}, {"name": "stop"}]
    }]));
    let _ = update(&mut st, key(KeyCode::Enter));
    let _ = update(&mut st, key(KeyCode::Down));
    let effects = update(&mut st, key(KeyCode::Enter));
    assert!(matches!(
        effects.as_slice(),
        [Effect::RunAction(req)] if req.action == "stop"
    ));
    assert_eq!(st.ui_state, UiState::Normal);
}

#[test]
fn prompt_round_trip_fills_template() {
    let mut st = state_with(json!([{
        "name": "ssh",
        "actions": [{"name": "connect", "args": [
            {"name": "host", "prompt": "Host"},
            {"name": "port", "prompt": "Port", "default": "2"}
        ]}]
    }]));
    let _ = update(&mut st, key(KeyCode::Char('c')));
    assert_eq!(st.ui_state, UiState::Prompt);
    assert_eq!(st.prompt_index, 0);

    chars(&mut st, "h");
    let _ = update(&mut st, key(KeyCode::Enter));
    assert_eq!(st.prompt_index, 1);
    chars(&mut st, "2");
    let effects = update(&mut st, key(KeyCode::Enter));
    assert_eq!(st.ui_state, UiState::Normal);

    let [Effect::RunAction(req)] = effects.as_slice() else {
        panic!("expected a single RunAction");
    };
    let cmd = render_action_command(
        "ssh-tool {name} {action} --host {arg:host} --port {arg:port}",
        &req.module,
        &req.action,
        &req.args,
    )
    .unwrap();
    assert_eq!(cmd, "ssh-tool ssh connect --host h --port 22");

    // Non-secret answers pre-fill the next prompt
    let def = st.modules[0].find_action("connect").unwrap();
    assert_eq!(def.args[0].default, "h");
    assert_eq!(def.args[1].default, "22");
}

#[test]
fn secret_prompt_input_is_masked_and_not_remembered() {
    let mut st = state_with(json!([{
        "name": "vault",
        "actions": [{"name": "add", "args": [{"name": "token", "secret": true}]}]
    }]));
    let _ = update(&mut st, key(KeyCode::Char('n')));
    assert_eq!(st.prompt_inputs[0].mask_char(), Some('•'));
    chars(&mut st, "s3cr3t");
    let effects = update(&mut st, key(KeyCode::Enter));
    assert!(matches!(
        effects.as_slice(),
        [Effect::RunAction(req)] if req.args[0].default == "s3cr3t"
    ));
    assert_eq!(st.modules[0].actions[0].args[0].default, "");
}

#[test]
fn prompt_escape_discards_input() {
    let mut st = state_with(json!([{
        "name": "ssh",
        "actions": [{"name": "connect", "args": [{"name": "host"}]}]
    }]));
    let _ = update(&mut st, key(KeyCode::Enter));
    chars(&mut st, "abc");
    assert!(update(&mut st, key(KeyCode::Esc)).is_empty());
    assert_eq!(st.ui_state, UiState::Normal);
    assert!(st.prompt_inputs.is_empty());
}

#[test]
fn missing_shortcut_action_shows_info_toast() {
    let mut st = state_with(json!([{"name": "audio"}]));
    let effects = update(&mut st, key(KeyCode::Char('x')));
    assert!(matches!(
        effects.as_slice(),
        [Effect::ShowToast { level: ToastLevel::Info, .. }]
    ));
}

#[test]
fn enable_falls_back_to_bare_action_name() {
    let mut st = state_with(json!([{"name": "audio", "status": "disabled"}]));
    let effects = update(&mut st, key(KeyCode::Char('e')));
    assert!(matches!(
        effects.as_slice(),
        [Effect::RunAction(req)] if req.action == "enable" && req.args.is_empty()
    ));
}

#[test]
fn preview_cache_hit_emits_nothing() {
    let mut st = state_with(json!([{"name": "audio"}]));
    st.config.details_cmd = Some("details".into());
    st.preview_cache.insert("audio".into(), "cached".into());
    let effects = update(&mut st, AppMsg::PreviewDue("audio".into()));
    assert!(effects.is_empty());
    assert!(st.preview_loading.is_none());
}

#[test]
fn preview_miss_loads_and_stale_completion_keeps_loading_flag() {
    let mut st = state_with(json!([{"name": "audio"}, {"name": "net"}]));
    st.config.details_cmd = Some("details".into());
    let effects = update(&mut st, AppMsg::PreviewDue("audio".into()));
    assert_eq!(effects, vec![Effect::LoadPreview { module: "audio".into() }]);
    assert_eq!(st.preview_loading.as_deref(), Some("audio"));

    // User moved on and a newer load started
    let _ = update(&mut st, key(KeyCode::Down));
    st.preview_loading = Some("net".into());
    let _ = update(
        &mut st,
        AppMsg::PreviewLoaded {
            module: "audio".into(),
            outcome: Ok("ALSA".into()),
        },
    );
    assert_eq!(st.preview_cache.get("audio").map(String::as_str), Some("ALSA"));
    assert_eq!(st.preview_loading.as_deref(), Some("net"));

    let _ = update(
        &mut st,
        AppMsg::PreviewLoaded {
            module: "net".into(),
            outcome: Err("boom".into()),
        },
    );
    assert_eq!(st.preview_cache.get("net").map(String::as_str), Some("Error: boom"));
    assert!(st.preview_loading.is_none());
}

#[test]
fn second_due_while_loading_same_module_is_ignored() {
    let mut st = state_with(json!([{"name": "audio"}]));
    st.config.details_cmd = Some("details".into());
    let effects = update(&mut st, AppMsg::PreviewDue("audio".into()));
    assert_eq!(effects, vec![Effect::LoadPreview { module: "audio".into() }]);
    let effects = update(&mut st, AppMsg::PreviewDue("audio".into()));
    assert!(effects.is_empty());
    assert_eq!(st.preview_loading.as_deref(), Some("audio"));
}

#[test]
fn refresh_keeps_cached_previews() {
    let mut st = state_with(json!([{"name": "alpha"}]));
    st.config.details_cmd = Some("details".into());
    let effects = update(&mut st, AppMsg::PreviewDue("alpha".into()));
    assert_eq!(effects, vec![Effect::LoadPreview { module: "alpha".into() }]);
    let _ = update(
        &mut st,
        AppMsg::PreviewLoaded {
            module: "alpha".into(),
            outcome: Ok("A".into()),
        },
    );
    let fresh = serde_json::from_value(json!([{"name": "alpha", "status": "enabled"}])).unwrap();
    let _ = update(&mut st, AppMsg::ModulesRefreshed(Ok(fresh)));
    assert_eq!(st.preview_cache.get("alpha").map(String::as_str), Some("A"));

    let effects = update(&mut st, AppMsg::PreviewDue("alpha".into()));
    assert!(effects.is_empty());
    assert!(st.preview_loading.is_none());
}

#[test]
fn selection_change_schedules_debounced_preview() {
    let mut st = state_with(json!([{"name": "audio"}, {"name": "net"}]));
    st.content_scroll = 6;
    let _ = update(&mut st, key(KeyCode::Char('j')));
    assert_eq!(st.preview_debounce.pending(), Some("net"));
    assert_eq!(st.content_scroll, 0);
    // Bottom of the list: no change, nothing rescheduled
    st.preview_debounce.cancel();
    let _ = update(&mut st, key(KeyCode::Char('j')));
    assert_eq!(st.preview_debounce.pending(), None);
}

#[test]
fn menu_scroll_only_moves_with_page_keys() {
    let list: Vec<_> = (0..30).map(|i| json!({"name": format!("m{i}")})).collect();
    let mut st = state_with(serde_json::Value::Array(list));
    for _ in 0..15 {
        let _ = update(&mut st, key(KeyCode::Down));
    }
    assert_eq!(st.menu_scroll, 0);
    let _ = update(&mut st, key(KeyCode::PageDown));
    assert_eq!(st.menu_scroll, 10);
    let _ = update(&mut st, key(KeyCode::PageUp));
    assert_eq!(st.menu_scroll, 0);
}

#[test]
fn filter_and_search_narrow_the_visible_list() {
    let mut st = state_with(json!([
        {"name": "audio", "status": "enabled"},
        {"name": "bluetooth", "status": "disabled"},
        {"name": "net", "status": "broken"}
    ]));
    let _ = update(&mut st, key(KeyCode::Char('f')));
    assert_eq!(st.filter_status, StatusFilter::Enabled);
    assert_eq!(st.visible_modules().len(), 1);
    let _ = update(&mut st, key(KeyCode::Char('f')));
    assert_eq!(st.current_module().unwrap().name, "bluetooth");

    for _ in 0..2 {
        let _ = update(&mut st, key(KeyCode::Char('f')));
    }
    assert_eq!(st.filter_status, StatusFilter::All);
    let _ = update(&mut st, key(KeyCode::Char('/')));
    assert!(st.search_editing);
    chars(&mut st, "ne");
    assert_eq!(st.search_term, "ne");
    assert_eq!(st.current_module().unwrap().name, "net");
    // Typed characters never trigger commands while editing
    assert_eq!(st.ui_state, UiState::Normal);
    let _ = update(&mut st, key(KeyCode::Esc));
    assert!(!st.search_editing);
    assert!(st.search_term.is_empty());
    assert_eq!(st.visible_modules().len(), 3);
}

#[test]
fn refresh_keeps_selection_by_name() {
    let mut st = state_with(json!([{"name": "a"}, {"name": "b"}, {"name": "c"}]));
    let _ = update(&mut st, key(KeyCode::End));
    assert_eq!(st.current_module().unwrap().name, "c");
    let fresh = serde_json::from_value(json!([
        {"name": "c", "status": "enabled"},
        {"name": "a"}
    ]))
    .unwrap();
    let _ = update(&mut st, AppMsg::ModulesRefreshed(Ok(fresh)));
    assert_eq!(st.selected, 0);
    assert_eq!(st.current_module().unwrap().status, ModuleStatus::Enabled);
}

#[test]
fn failed_refresh_keeps_previous_list() {
    let mut st = state_with(json!([{"name": "a"}]));
    let effects = update(&mut st, AppMsg::ModulesRefreshed(Err("exit 1".into())));
    assert_eq!(st.modules.len(), 1);
    assert_eq!(st.last_error.as_deref(), Some("exit 1"));
    assert!(matches!(
        effects.as_slice(),
        [Effect::ShowToast { level: ToastLevel::Error, .. }]
    ));
}

#[test]
fn action_failure_reports_error_and_returns_to_normal() {
    let mut st = state_with(json!([{"name": "a", "actions": [{"name": "x"}, {"name": "y"}]}]));
    let _ = update(&mut st, key(KeyCode::Enter));
    let effects = update(
        &mut st,
        AppMsg::ActionExecuted {
            key: "a:x".into(),
            outcome: Err("Command failed (exit 2)".into()),
        },
    );
    assert_eq!(st.ui_state, UiState::Normal);
    assert_eq!(st.last_error.as_deref(), Some("Command failed (exit 2)"));
    assert!(!effects.contains(&Effect::RefreshModules));
}

#[test]
fn audio_enable_end_to_end() {
    let mut st = state_with(json!([{
        "name": "audio",
        "status": "disabled",
        "actions": [{"name": "enable"}]
    }]));
    st.config.action_cmd = Some("echo {name} {action}".into());
    st.config.stats_cmd = Some("echo stats".into());

    let effects = update(&mut st, key(KeyCode::Enter));
    let [Effect::RunAction(req)] = effects.as_slice() else {
        panic!("expected RunAction");
    };
    let out = execute_action("sh", st.config.action_cmd.as_deref(), req).unwrap();
    assert_eq!(out.trim(), "audio enable");

    let effects = update(
        &mut st,
        AppMsg::ActionExecuted {
            key: "audio:enable".into(),
            outcome: Ok(out.trim().to_string()),
        },
    );
    assert_eq!(st.ui_state, UiState::Normal);
    assert!(st.status_text.is_none());
    assert!(effects.contains(&Effect::RefreshModules));
    assert!(effects.contains(&Effect::LoadPanelText {
        panel: PanelKind::Stats,
        cmdline: "echo stats".into(),
    }));
    assert!(matches!(
        effects.first(),
        Some(Effect::ShowToast { text, level: ToastLevel::Success, .. }) if text == "audio enable"
    ));
}

#[test]
fn ctrl_c_quits_from_any_state() {
    let mut st = state_with(json!([{"name": "a", "actions": [{"name": "x", "args": [{"name": "v"}]}]}]));
    let _ = update(&mut st, key(KeyCode::Enter));
    assert_eq!(st.ui_state, UiState::Prompt);
    let effects = update(
        &mut st,
        AppMsg::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
    );
    assert_eq!(effects, vec![Effect::Quit]);
}
