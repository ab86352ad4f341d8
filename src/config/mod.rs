use crate::models::UserConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;

/// File name of the settings file inside the data directory.
pub const USER_CONFIG_FILE: &str = "CheatHub Config.yaml";

/// Reads and writes `CheatHub Config.yaml` inside a data directory
/// (normally `CheatHub Data/` next to the binary).
#[derive(Debug, Clone)]
pub struct ConfigManager {
    data_dir: Utf8PathBuf,
}

impl ConfigManager {
    /// Open `data_dir`, creating it if needed.
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir))?;
        Ok(Self { data_dir })
    }

    /// Settings from disk, or defaults when the file has not been written yet.
    pub fn load_user_config(&self) -> Result<UserConfig> {
        let path = self.user_config_path();
        if !path.is_file() {
            tracing::warn!("No settings file at {}, using defaults", path);
            return Ok(UserConfig::default());
        }

        let config = read_yaml(&path)?;
        tracing::info!("Loaded settings from {}", path);
        Ok(config)
    }

    /// Like [`load_user_config`](Self::load_user_config), but writes the
    /// defaults out on first run so the file can be edited by hand.
    pub fn load_or_init_user_config(&self) -> Result<UserConfig> {
        if self.user_config_path().is_file() {
            return self.load_user_config();
        }
        let config = UserConfig::default();
        self.save_user_config(&config)?;
        Ok(config)
    }

    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let path = self.user_config_path();
        write_yaml(&path, config)?;
        tracing::info!("Saved settings to {}", path);
        Ok(())
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    pub fn user_config_path(&self) -> Utf8PathBuf {
        self.data_dir.join(USER_CONFIG_FILE)
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read settings: {}", path))?;
    serde_yaml_ng::from_str(&text).with_context(|| format!("Failed to parse settings: {}", path))
}

fn write_yaml<T: Serialize>(path: &Utf8Path, value: &T) -> Result<()> {
    let text = serde_yaml_ng::to_string(value).context("Failed to serialize settings to YAML")?;
    fs::write(path, text).with_context(|| format!("Failed to write settings: {}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager_in_tempdir() -> (ConfigManager, TempDir) {
        let temp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        (ConfigManager::new(dir).unwrap(), temp)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (manager, _temp) = manager_in_tempdir();

        let config = manager.load_user_config().unwrap();
        assert_eq!(config.cheathub_settings.notification_secs, 5);
        assert!(!manager.user_config_path().exists());
    }

    #[test]
    fn test_init_writes_defaults_once() {
        let (manager, _temp) = manager_in_tempdir();

        manager.load_or_init_user_config().unwrap();
        assert!(manager.user_config_path().is_file());

        let mut edited = UserConfig::default();
        edited.cheathub_settings.copy_feedback_millis = 1500;
        manager.save_user_config(&edited).unwrap();

        // Existing file is left alone
        let config = manager.load_or_init_user_config().unwrap();
        assert_eq!(config.cheathub_settings.copy_feedback_millis, 1500);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let (manager, _temp) = manager_in_tempdir();
        fs::write(manager.user_config_path(), "CheatHub_Settings: [unclosed").unwrap();

        let err = manager.load_user_config().unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings"));
    }
}
