use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default data directory: ~/.calcpanel
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".calcpanel"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    let data_dir = get_data_dir()?;
    load_from(&data_dir, Path::new("config.toml"))
}

/// Resolve configuration: `<data_dir>/config.toml`, then `local_config`,
/// then defaults, with environment overrides on top.
pub fn load_from(data_dir: &Path, local_config: &Path) -> anyhow::Result<AppConfig> {
    let user_config = data_dir.join("config.toml");

    let mut cfg: AppConfig = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    if cfg
        .recovery
        .path
        .as_deref()
        .map(str::trim)
        .map_or(true, str::is_empty)
    {
        cfg.recovery.path = Some(
            data_dir
                .join("recovery.json")
                .to_string_lossy()
                .to_string(),
        );
    }

    if cfg
        .logging
        .directory
        .as_deref()
        .map(str::trim)
        .map_or(true, str::is_empty)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    // Environment variable overrides (highest priority)
    if let Ok(v) = std::env::var("CALCPANEL_RECOVERY_PATH") {
        if !v.trim().is_empty() {
            cfg.recovery.path = Some(v);
        }
    }
    if let Ok(v) = std::env::var("CALCPANEL_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }

    cfg.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(cfg)
}
