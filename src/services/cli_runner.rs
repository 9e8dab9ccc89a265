use crate::model::{parse_module_list, ActionArg, ModuleItem};
use anyhow::{anyhow, Context, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::process::Command;
use std::sync::OnceLock;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> Result<&'static Regex> {
    if let Some(re) = PLACEHOLDER.get() {
        return Ok(re);
    }
    let re = Regex::new(r"\{(name|action|arg:([^{}]+))\}")?;
    Ok(PLACEHOLDER.get_or_init(|| re))
}

/// Fill `{name}`, `{action}` and `{arg:<name>}` in an action template.
/// Values are inserted verbatim; placeholders for unknown args are kept as-is.
pub fn render_action_command(
    template: &str,
    module: &str,
    action: &str,
    args: &[ActionArg],
) -> Result<String> {
    let values: HashMap<&str, &str> = args
        .iter()
        .map(|a| (a.name.as_str(), a.default.as_str()))
        .collect();
    let re = placeholder()?;
    let out = re.replace_all(template, |caps: &Captures| match &caps[1] {
        "name" => module.to_string(),
        "action" => action.to_string(),
        _ => caps
            .get(2)
            .and_then(|m| values.get(m.as_str()))
            .map(|v| v.to_string())
            .unwrap_or_else(|| caps[0].to_string()),
    });
    Ok(out.into_owned())
}

pub fn details_cmdline(details_cmd: &str, module: &str) -> Result<String> {
    let quoted = shlex::try_quote(module).map_err(|e| anyhow!("cannot quote {module:?}: {e}"))?;
    Ok(format!("{details_cmd} {quoted}"))
}

/// Run through `<shell> -c`; stdout on exit 0, an error carrying stderr otherwise.
pub fn run_shell(shell: &str, cmdline: &str) -> Result<String> {
    let output = Command::new(shell)
        .arg("-c")
        .arg(cmdline)
        .output()
        .with_context(|| format!("spawning {shell} -c {cmdline}"))?;
    if !output.status.success() {
        let err = String::from_utf8_lossy(&output.stderr);
        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(anyhow!(
            "Command failed (exit {code}): {cmdline}\n{}",
            err.trim_end()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

pub fn discover_modules(shell: &str, list_cmd: &str) -> Result<Vec<ModuleItem>> {
    let text = run_shell(shell, list_cmd)?;
    parse_module_list(&text).with_context(|| format!("parsing module list from {list_cmd}"))
}
