use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Enabled,
    Disabled,
    Broken,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ModuleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleStatus::Enabled => "enabled",
            ModuleStatus::Disabled => "disabled",
            ModuleStatus::Broken => "broken",
            ModuleStatus::Unknown => "unknown",
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            ModuleStatus::Enabled => "●",
            ModuleStatus::Disabled => "○",
            ModuleStatus::Broken => "✗",
            ModuleStatus::Unknown => "?",
        }
    }
}

fn status_or_unknown<'de, D>(deserializer: D) -> Result<ModuleStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ModuleStatus>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ActionArg {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secret: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default: String,
}

impl ActionArg {
    /// Label shown next to the prompt input.
    pub fn prompt_label(&self) -> &str {
        if self.prompt.is_empty() {
            &self.name
        } else {
            &self.prompt
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ActionDef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<ActionArg>,
}

impl ActionDef {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// One entry of the discovery command's JSON array.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ModuleItem {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "status_or_unknown")]
    pub status: ModuleStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    // Legacy single default action
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<ActionArg>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<ActionDef>,
}

impl ModuleItem {
    pub fn find_action(&self, name: &str) -> Option<&ActionDef> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn default_action(&self) -> Option<&str> {
        self.action.as_deref().filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Enabled,
    Disabled,
    Broken,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Enabled,
        StatusFilter::Disabled,
        StatusFilter::Broken,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Enabled => "enabled",
            StatusFilter::Disabled => "disabled",
            StatusFilter::Broken => "broken",
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Enabled,
            StatusFilter::Enabled => StatusFilter::Disabled,
            StatusFilter::Disabled => StatusFilter::Broken,
            StatusFilter::Broken => StatusFilter::All,
        }
    }

    pub fn matches(self, status: ModuleStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Enabled => status == ModuleStatus::Enabled,
            StatusFilter::Disabled => status == ModuleStatus::Disabled,
            StatusFilter::Broken => status == ModuleStatus::Broken,
        }
    }
}

/// Case-insensitive match on name, description and category.
pub fn matches_search(m: &ModuleItem, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [&m.name, &m.description, &m.category]
        .iter()
        .any(|s| s.to_lowercase().contains(&needle))
}

pub fn parse_module_list(text: &str) -> serde_json::Result<Vec<ModuleItem>> {
    serde_json::from_str(text.trim())
}
