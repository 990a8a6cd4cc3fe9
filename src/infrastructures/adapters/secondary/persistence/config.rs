use super::write_atomic;
use crate::domain::errors::ConfigError;
use crate::domain::models::config::{ConfigKey, DEFAULT_CHECK_INTERVAL_SECS, MonitorConfig};
use crate::domain::repositories::config::ConfigStore;
use serde_json::Value;
use std::path::PathBuf;

/// `config.json`, merged over the defaults on load.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn parse(&self, contents: &str) -> MonitorConfig {
        let mut config = MonitorConfig::default();
        let fields = match serde_json::from_str::<Value>(contents) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                tracing::warn!("Ignoring {}: not a JSON object", self.path.display());
                return config;
            }
            Err(e) => {
                tracing::warn!("Ignoring invalid {}: {e}", self.path.display());
                return config;
            }
        };

        for (name, raw) in &fields {
            let Ok(key) = name.parse::<ConfigKey>() else {
                tracing::warn!("Ignoring unknown config key '{name}'");
                continue;
            };
            if let Err(e) = apply(&mut config, key, raw.clone()) {
                tracing::warn!("Ignoring invalid {key} in {}: {e}", self.path.display());
            }
        }

        if config.check_interval == 0 {
            tracing::warn!(
                "check_interval must be positive, using {DEFAULT_CHECK_INTERVAL_SECS}s"
            );
            config.check_interval = DEFAULT_CHECK_INTERVAL_SECS;
        }
        config
    }
}

/// Stores one field. A bad value leaves the field at its current value.
fn apply(config: &mut MonitorConfig, key: ConfigKey, raw: Value) -> Result<(), serde_json::Error> {
    match key {
        ConfigKey::CheckInterval => config.check_interval = serde_json::from_value(raw)?,
        ConfigKey::SpeechEnabled => config.speech_enabled = serde_json::from_value(raw)?,
        ConfigKey::SpeechCommand => config.speech_command = serde_json::from_value(raw)?,
        ConfigKey::NotifySuccess => config.notify_success = serde_json::from_value(raw)?,
        ConfigKey::NotifyFailure => config.notify_failure = serde_json::from_value(raw)?,
    }
    Ok(())
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(self.parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MonitorConfig::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        let mut json = serde_json::to_string_pretty(config)?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::SpeechCommand;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonConfigStore {
        JsonConfigStore::new(dir.path().join("config.json"))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load().unwrap(), MonitorConfig::default());
    }

    #[test]
    fn test_partial_file_is_merged_over_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"check_interval": 300, "notify_success": false, "volume": 11}"#,
        )
        .unwrap();

        let config = store(&dir).load().unwrap();
        assert_eq!(config.check_interval, 300);
        assert!(!config.notify_success);
        assert!(config.notify_failure);
        assert!(config.speech_enabled);
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        assert_eq!(store(&dir).load().unwrap(), MonitorConfig::default());

        std::fs::write(dir.path().join("config.json"), "[1, 2]").unwrap();
        assert_eq!(store(&dir).load().unwrap(), MonitorConfig::default());
    }

    #[test]
    fn test_mistyped_field_keeps_the_other_overrides() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"speech_enabled": false, "notify_success": false, "check_interval": -5,
                "notify_failure": "loud", "speech_command": ["spd-say", "-w"]}"#,
        )
        .unwrap();

        let config = store(&dir).load().unwrap();
        assert!(!config.speech_enabled);
        assert!(!config.notify_success);
        assert_eq!(config.check_interval, DEFAULT_CHECK_INTERVAL_SECS);
        assert!(config.notify_failure);
        assert_eq!(
            config.speech_command,
            Some(SpeechCommand::Argv(vec!["spd-say".to_string(), "-w".to_string()]))
        );
    }

    #[test]
    fn test_zero_interval_is_replaced() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{"check_interval": 0}"#).unwrap();
        assert_eq!(
            store(&dir).load().unwrap().check_interval,
            DEFAULT_CHECK_INTERVAL_SECS
        );
    }

    #[test]
    fn test_save_then_load_keeps_every_key() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let config = MonitorConfig {
            check_interval: 90,
            speech_enabled: false,
            speech_command: Some(SpeechCommand::Argv(vec![
                "festival".to_string(),
                "--tts".to_string(),
            ])),
            notify_success: false,
            notify_failure: true,
        };

        store.save(&config).unwrap();

        assert_eq!(store.load().unwrap(), config);
        assert!(!dir.path().join("config.json.tmp").exists());
        let raw = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(raw.contains("\"check_interval\": 90"));
    }
}
