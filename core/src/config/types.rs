use serde::{Deserialize, Serialize};

use crate::content::VariantId;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub recovery: RecoveryConfig,

    #[serde(default)]
    pub panel: PanelConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.recovery.validate()?;
        self.panel.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "calcpanel_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Stored entries above this count trigger a prune.
    #[serde(default = "default_hard_cap")]
    pub hard_cap: usize,

    /// Entries kept after a prune.
    #[serde(default = "default_retain")]
    pub retain: usize,

    /// Key the log is stored under in the durable store.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Backing file for the durable store. Resolved to
    /// `~/.calcpanel/recovery.json` when unset.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_hard_cap() -> usize {
    1000
}

fn default_retain() -> usize {
    100
}

fn default_storage_key() -> String {
    "calcpanel.unsavedStates".to_string()
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            hard_cap: default_hard_cap(),
            retain: default_retain(),
            storage_key: default_storage_key(),
            path: None,
        }
    }
}

impl RecoveryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.retain == 0 {
            return Err("recovery.retain must be at least 1".to_string());
        }
        if self.retain > self.hard_cap {
            return Err(format!(
                "recovery.retain ({}) must not exceed recovery.hard_cap ({})",
                self.retain, self.hard_cap
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err("recovery.storage_key must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Ask whether to reopen a panel that was closed with unsaved work.
    #[serde(default = "default_confirm_on_close")]
    pub confirm_on_close: bool,

    #[serde(default = "default_variants")]
    pub variants: Vec<VariantConfig>,
}

fn default_confirm_on_close() -> bool {
    true
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            confirm_on_close: default_confirm_on_close(),
            variants: default_variants(),
        }
    }
}

impl PanelConfig {
    pub fn variant(&self, id: &VariantId) -> Option<&VariantConfig> {
        self.variants.iter().find(|v| &v.id == id)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.variants.is_empty() {
            return Err("panel.variants must list at least one variant".to_string());
        }
        for (i, v) in self.variants.iter().enumerate() {
            if self.variants[..i].iter().any(|other| other.id == v.id) {
                return Err(format!("panel.variants: duplicate id '{}'", v.id));
            }
        }
        Ok(())
    }
}

/// One flavor of the calculator surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    pub id: VariantId,
    pub title: String,
    /// Calculator script: a path bundled with the host or a remote URL.
    pub script: String,
}

fn default_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig {
            id: VariantId::from("offline"),
            title: "Calculator".to_string(),
            script: "calculator.js".to_string(),
        },
        VariantConfig {
            id: VariantId::from("online"),
            title: "Calculator Online".to_string(),
            script: "https://www.desmos.com/api/v1.10/calculator.js".to_string(),
        },
    ]
}
