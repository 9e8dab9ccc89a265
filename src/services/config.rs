use crate::layout::TemplateKind;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_TITLE: &str = "Module Manager";
pub const DEFAULT_FOOTER: &str =
    "↑/↓ Navigate • Enter Actions • / Search • e Enable • d Disable • r Refresh • t Details • q Quit";
pub const DEFAULT_LOG_FILE: &str = "/tmp/tui-debug.log";
pub const MAX_DEBOUNCE_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmallTerminalPolicy {
    #[default]
    Wait,
    Exit,
}

impl SmallTerminalPolicy {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wait" => Some(Self::Wait),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Runtime settings. Later sources win: defaults, YAML file, positional args, environment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub list_cmd: String,
    pub filter_cmd: Option<String>,
    pub details_cmd: Option<String>,
    pub action_cmd: Option<String>,
    pub stats_cmd: Option<String>,
    pub title: String,
    pub footer: String,
    pub layout: Option<String>,
    pub min_width: u16,
    pub min_height: u16,
    pub small_terminal: SmallTerminalPolicy,
    pub debounce_ms: u64,
    pub shell: String,
    pub search: String,
    pub debug: bool,
    pub log_file: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        // The smallest template decides when the guard screen takes over.
        let (min_width, min_height) = TemplateKind::Emergency.min_size();
        Self {
            list_cmd: String::new(),
            filter_cmd: None,
            details_cmd: None,
            action_cmd: None,
            stats_cmd: None,
            title: DEFAULT_TITLE.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
            layout: None,
            min_width,
            min_height,
            small_terminal: SmallTerminalPolicy::Wait,
            debounce_ms: 300,
            shell: "sh".to_string(),
            search: String::new(),
            debug: false,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

impl DashboardConfig {
    /// Resolve from the process: `$NCC_TUI_CONFIG`, argv and environment.
    pub fn load() -> Result<Self> {
        let file_text = match std::env::var("NCC_TUI_CONFIG").ok().and_then(non_empty) {
            Some(path) => Some(
                std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?,
            ),
            None => None,
        };
        let args: Vec<String> = std::env::args().skip(1).collect();
        let cfg = Self::from_sources(file_text.as_deref(), &args, |k| std::env::var(k).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_sources(
        file_text: Option<&str>,
        args: &[String],
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut cfg = match file_text {
            Some(text) => serde_yaml::from_str::<Self>(text).context("parsing YAML config")?,
            None => Self::default(),
        };
        cfg.apply_positional(args);
        cfg.apply_env(env)?;
        Ok(cfg)
    }

    // list filter details actions [stats]
    fn apply_positional(&mut self, args: &[String]) {
        let mut it = args.iter().cloned();
        if let Some(v) = it.next().and_then(non_empty) {
            self.list_cmd = v;
        }
        let slots: [&mut Option<String>; 4] = [
            &mut self.filter_cmd,
            &mut self.details_cmd,
            &mut self.action_cmd,
            &mut self.stats_cmd,
        ];
        for slot in slots {
            match it.next() {
                Some(v) => {
                    if let Some(v) = non_empty(v) {
                        *slot = Some(v);
                    }
                }
                None => break,
            }
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |k: &str| env(k).and_then(non_empty);
        if let Some(v) = get("NCC_TUI_LIST_CMD") {
            self.list_cmd = v;
        }
        for (key, slot) in [
            ("NCC_TUI_FILTER_CMD", &mut self.filter_cmd),
            ("NCC_TUI_DETAILS_CMD", &mut self.details_cmd),
            ("NCC_TUI_ACTION_CMD", &mut self.action_cmd),
            ("NCC_TUI_STATS_CMD", &mut self.stats_cmd),
            ("NCC_TUI_LAYOUT", &mut self.layout),
        ] {
            if let Some(v) = get(key) {
                *slot = Some(v);
            }
        }
        if let Some(v) = get("NCC_TUI_TITLE") {
            self.title = v;
        }
        if let Some(v) = get("NCC_TUI_FOOTER") {
            self.footer = v;
        }
        if let Some(v) = get("NCC_TUI_SHELL") {
            self.shell = v;
        }
        if let Some(v) = env("NCC_TUI_SEARCH") {
            self.search = v;
        }
        if let Some(v) = get("NCC_TUI_MIN_WIDTH") {
            self.min_width = v
                .parse()
                .with_context(|| format!("NCC_TUI_MIN_WIDTH={v}"))?;
        }
        if let Some(v) = get("NCC_TUI_MIN_HEIGHT") {
            self.min_height = v
                .parse()
                .with_context(|| format!("NCC_TUI_MIN_HEIGHT={v}"))?;
        }
        if let Some(v) = get("NCC_TUI_DEBOUNCE_MS") {
            self.debounce_ms = v
                .parse()
                .with_context(|| format!("NCC_TUI_DEBOUNCE_MS={v}"))?;
        }
        if let Some(v) = get("NCC_TUI_SMALL_TERMINAL") {
            self.small_terminal = SmallTerminalPolicy::parse(&v)
                .ok_or_else(|| anyhow!("NCC_TUI_SMALL_TERMINAL must be wait or exit, got {v}"))?;
        }
        if let Some(v) = get("NCC_TUI_DEBUG") {
            self.debug = truthy(&v);
        }
        if let Some(v) = get("NCC_TUI_LOG_FILE") {
            self.log_file = PathBuf::from(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.list_cmd.trim().is_empty() {
            bail!("no list command: pass it as the first argument or set NCC_TUI_LIST_CMD");
        }
        if let Some(name) = &self.layout {
            if TemplateKind::from_name(name).is_none() {
                let known: Vec<&str> = TemplateKind::ALL.iter().map(|k| k.name()).collect();
                bail!("unknown layout {name:?}; expected one of {}", known.join(", "));
            }
        }
        if self.min_width == 0 || self.min_height == 0 {
            bail!("minimum terminal size must be non-zero");
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            bail!("debounce_ms must be at most {MAX_DEBOUNCE_MS}, got {}", self.debounce_ms);
        }
        Ok(())
    }
}
