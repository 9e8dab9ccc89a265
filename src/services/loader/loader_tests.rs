use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn req(module: &str, action: &str) -> ActionRequest {
    ActionRequest {
        module: module.into(),
        action: action.into(),
        args: Vec::new(),
    }
}

#[test]
fn execute_action_requires_template() {
    let err = execute_action("sh", None, &req("audio", "enable")).unwrap_err();
    assert_eq!(err.to_string(), "NCC_TUI_ACTION_CMD not set");
}

#[test]
fn execute_action_renders_and_runs() {
    let out = execute_action("sh", Some("echo {name} {action}"), &req("audio", "enable")).unwrap();
    assert_eq!(out.trim(), "audio enable");
}

#[test]
fn load_details_trims_output() {
    let out = load_details("sh", Some("printf '  info for %s\\n\\n'"), "audio").unwrap();
    assert_eq!(out, "info for audio");
    assert!(load_details("sh", None, "audio").is_err());
}

#[test]
fn spawned_action_reports_through_channel() {
    let (tx, rx) = mpsc::channel();
    spawn_run_action(
        "sh".into(),
        Some("echo {name} {action}".into()),
        req("audio", "enable"),
        tx,
    );
    let msg = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(msg.kind, LoadKind::Action));
    match msg.outcome {
        Ok(LoadOutcome::Executed { module, action, output }) => {
            assert_eq!(module, "audio");
            assert_eq!(action, "enable");
            assert_eq!(output, "audio enable");
        }
        _ => panic!("expected executed outcome"),
    }
}

#[test]
fn spawned_preview_failure_is_an_error_string() {
    let (tx, rx) = mpsc::channel();
    spawn_load_preview("sh".into(), Some("false".into()), "audio".into(), tx);
    let msg = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(msg.key, "audio");
    assert!(matches!(msg.kind, LoadKind::Preview));
    assert!(msg.outcome.is_err());
}

#[test]
fn spawned_panel_text_is_keyed_by_panel() {
    let (tx, rx) = mpsc::channel();
    spawn_load_panel_text("sh".into(), PanelKind::Stats, "echo 3 modules".into(), tx);
    let msg = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(msg.kind, LoadKind::Panel(PanelKind::Stats)));
    assert!(matches!(msg.outcome, Ok(LoadOutcome::Text(ref t)) if t == "3 modules"));
}
