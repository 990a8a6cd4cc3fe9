use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// User override for the speech backend.
///
/// A bare string names a program that receives the message as its only
/// argument; a list is a program plus leading arguments, message appended last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeechCommand {
    Program(String),
    Argv(Vec<String>),
}

impl SpeechCommand {
    /// Splits the override into program and leading arguments.
    pub fn argv(&self) -> Option<(&str, &[String])> {
        match self {
            Self::Program(program) if !program.trim().is_empty() => Some((program.as_str(), &[])),
            Self::Program(_) => None,
            Self::Argv(parts) => parts
                .split_first()
                .map(|(program, args)| (program.as_str(), args)),
        }
    }
}

impl fmt::Display for SpeechCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Program(program) => f.write_str(program),
            Self::Argv(parts) => f.write_str(&parts.join(" ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub check_interval: u64,
    pub speech_enabled: bool,
    pub speech_command: Option<SpeechCommand>,
    pub notify_success: bool,
    pub notify_failure: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL_SECS,
            speech_enabled: true,
            speech_command: None,
            notify_success: true,
            notify_failure: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    CheckInterval,
    SpeechEnabled,
    SpeechCommand,
    NotifySuccess,
    NotifyFailure,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        Self::CheckInterval,
        Self::SpeechEnabled,
        Self::SpeechCommand,
        Self::NotifySuccess,
        Self::NotifyFailure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CheckInterval => "check_interval",
            Self::SpeechEnabled => "speech_enabled",
            Self::SpeechCommand => "speech_command",
            Self::NotifySuccess => "notify_success",
            Self::NotifyFailure => "notify_failure",
        }
    }

    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|key| key.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.check_interval.max(1))
    }

    /// Human-readable value of a single key, as shown by `config`.
    pub fn display_value(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::CheckInterval => format!("{}s", self.check_interval),
            ConfigKey::SpeechEnabled => self.speech_enabled.to_string(),
            ConfigKey::SpeechCommand => self
                .speech_command
                .as_ref()
                .map_or_else(|| "(auto-detect)".to_string(), ToString::to_string),
            ConfigKey::NotifySuccess => self.notify_success.to_string(),
            ConfigKey::NotifyFailure => self.notify_failure.to_string(),
        }
    }

    /// Parses `raw` for `key` and stores it.
    pub fn set(&mut self, key: ConfigKey, raw: &str) -> Result<(), ConfigError> {
        match key {
            ConfigKey::CheckInterval => {
                self.check_interval = raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: key.name(),
                        value: raw.to_string(),
                        expected: "a positive integer number of seconds",
                    })?;
            }
            ConfigKey::SpeechEnabled => self.speech_enabled = parse_bool(key, raw)?,
            ConfigKey::NotifySuccess => self.notify_success = parse_bool(key, raw)?,
            ConfigKey::NotifyFailure => self.notify_failure = parse_bool(key, raw)?,
            ConfigKey::SpeechCommand => self.speech_command = parse_speech_command(raw)?,
        }
        Ok(())
    }
}

fn parse_bool(key: ConfigKey, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.name(),
            value: raw.to_string(),
            expected: "true/false, yes/no, on/off or 1/0",
        }),
    }
}

fn parse_speech_command(raw: &str) -> Result<Option<SpeechCommand>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if trimmed.starts_with('[') {
        let parts: Vec<String> =
            serde_json::from_str(trimmed).map_err(|_| ConfigError::InvalidValue {
                key: ConfigKey::SpeechCommand.name(),
                value: raw.to_string(),
                expected: "a program name or a JSON array of strings",
            })?;
        if parts.is_empty() {
            return Ok(None);
        }
        return Ok(Some(SpeechCommand::Argv(parts)));
    }
    Ok(Some(SpeechCommand::Program(trimmed.to_string())))
}
