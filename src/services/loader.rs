use crate::layout::PanelKind;
use crate::model::ActionArg;
use crate::services::cli_runner::{details_cmdline, discover_modules, render_action_command, run_shell};
use crate::ui::{LoadKind, LoadMsg, LoadOutcome};
use anyhow::{anyhow, Result};
use std::sync::mpsc::Sender;
use std::thread;

/// Everything a worker needs to run one action; owned so it can cross the thread boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub module: String,
    pub action: String,
    pub args: Vec<ActionArg>,
}

pub fn execute_action(shell: &str, template: Option<&str>, req: &ActionRequest) -> Result<String> {
    let template = template.ok_or_else(|| anyhow!("NCC_TUI_ACTION_CMD not set"))?;
    let cmdline = render_action_command(template, &req.module, &req.action, &req.args)?;
    tracing::debug!(module = %req.module, action = %req.action, %cmdline, "running action");
    run_shell(shell, &cmdline)
}

pub fn load_details(shell: &str, details_cmd: Option<&str>, module: &str) -> Result<String> {
    let cmd = details_cmd.ok_or_else(|| anyhow!("no details command configured"))?;
    let cmdline = details_cmdline(cmd, module)?;
    Ok(run_shell(shell, &cmdline)?.trim().to_string())
}

pub fn spawn_run_action(
    shell: String,
    template: Option<String>,
    req: ActionRequest,
    tx: Sender<LoadMsg>,
) {
    thread::spawn(move || {
        let key = format!("{}:{}", req.module, req.action);
        let outcome = execute_action(&shell, template.as_deref(), &req)
            .map(|out| LoadOutcome::Executed {
                module: req.module.clone(),
                action: req.action.clone(),
                output: out.trim().to_string(),
            })
            .map_err(|e| format!("{e:#}"));
        let _ = tx.send(LoadMsg {
            key,
            outcome,
            kind: LoadKind::Action,
        });
    });
}

pub fn spawn_load_preview(
    shell: String,
    details_cmd: Option<String>,
    module: String,
    tx: Sender<LoadMsg>,
) {
    thread::spawn(move || {
        let outcome = load_details(&shell, details_cmd.as_deref(), &module)
            .map(LoadOutcome::Text)
            .map_err(|e| format!("{e:#}"));
        let _ = tx.send(LoadMsg {
            key: module,
            outcome,
            kind: LoadKind::Preview,
        });
    });
}

pub fn spawn_refresh_modules(shell: String, list_cmd: String, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let outcome = discover_modules(&shell, &list_cmd)
            .map(LoadOutcome::Modules)
            .map_err(|e| format!("{e:#}"));
        let _ = tx.send(LoadMsg {
            key: "modules".to_string(),
            outcome,
            kind: LoadKind::Modules,
        });
    });
}

/// Filter and stats panels backed by their own command.
pub fn spawn_load_panel_text(shell: String, panel: PanelKind, cmdline: String, tx: Sender<LoadMsg>) {
    thread::spawn(move || {
        let outcome = run_shell(&shell, &cmdline)
            .map(|s| LoadOutcome::Text(s.trim_end().to_string()))
            .map_err(|e| format!("{e:#}"));
        let _ = tx.send(LoadMsg {
            key: panel.name().to_string(),
            outcome,
            kind: LoadKind::Panel(panel),
        });
    });
}

#[cfg(test)]
mod loader_tests;
