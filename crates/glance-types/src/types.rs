use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single head/body pair as produced by the decoder and held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub head: String,
    pub body: String,
}

impl DictionaryEntry {
    pub fn new(head: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            body: body.into(),
        }
    }
}

/// Progress emitted while a dictionary source is being ingested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestProgress {
    Reading { loaded_bytes: u64, total_bytes: u64 },
    Loaded { count: usize, last_head: String },
}

impl fmt::Display for IngestProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestProgress::Reading {
                loaded_bytes,
                total_bytes,
            } => write!(f, "{loaded_bytes} / {total_bytes} Byte"),
            IngestProgress::Loaded { count, last_head } => {
                write!(f, "{count} words registered ({last_head})")
            }
        }
    }
}

/// Literal search/replace applied to definition text before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub key: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub replace: String,
}

impl ReplaceRule {
    pub fn new(
        key: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Rules with an empty side do nothing and are not persisted
    pub fn is_inert(&self) -> bool {
        self.search.is_empty() || self.replace.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    Search,
    Replace,
}

impl FromStr for RuleField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown rule field: {other}")),
        }
    }
}

/// Typed value for a named settings option
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Every way the settings can be mutated from the outside
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsCommand {
    UpdateOption { name: String, value: OptionValue },
    AddRule,
    UpdateRule {
        index: usize,
        field: RuleField,
        value: String,
    },
    MoveRule { index: usize, offset: isize },
    RemoveRule { index: usize },
    ResetToDefaults,
}

/// Rendered preview markup. An empty `html` is the placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    pub html: String,
    pub head: Option<String>,
}

impl Preview {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Settings(SettingsCommand),
    TrialText(String),
    SaveSettings,
    ShowPreview(Preview),
    Shutdown,
}
