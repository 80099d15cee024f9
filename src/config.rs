use crate::model::Settings;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "tapedeck";
const SETTINGS_FILE: &str = "settings.json";
const LOG_FILE: &str = "tapedeck.log";

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("TAPEDECK_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(config_root()?.join(SETTINGS_FILE))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_root()?.join(LOG_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse settings file {}", path.display()))?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    ensure_config_dir()?;
    let path = settings_path()?;
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::AmbienceKind;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().expect("tempdir");
        unsafe {
            env::set_var("TAPEDECK_CONFIG_DIR", dir.path().to_string_lossy().as_ref());
        }
        assert!(!settings_path().expect("path").exists());
        assert_eq!(load_settings().expect("defaults").lookahead, 2);

        let mut settings = Settings {
            keep_loaded: false,
            ..Settings::default()
        };
        settings.controls.set_ambience(AmbienceKind::Radio, 35);
        save_settings(&settings).expect("save");

        let loaded = load_settings().expect("load");
        assert!(!loaded.keep_loaded);
        assert_eq!(loaded.controls.ambience(AmbienceKind::Radio), 35);
        assert_eq!(log_path().expect("log"), dir.path().join(LOG_FILE));
    }
}
