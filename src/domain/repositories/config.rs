use crate::domain::errors::ConfigError;
use crate::domain::models::config::MonitorConfig;

pub trait ConfigStore: Send + Sync {
    /// Stored config merged over defaults. Never fails on a missing file.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;
    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError>;
}
