use crate::domain::models::config::SpeechCommand;
use anyhow::Error;
use async_trait::async_trait;
use std::time::Duration;

pub const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait SpeechNotifier: Send + Sync {
    /// Speaks `message`, preferring `command_override` over the detected backend.
    ///
    /// Returns `Ok(false)` when no backend is available. Callers log errors
    /// and carry on.
    async fn speak(
        &self,
        message: &str,
        command_override: Option<&SpeechCommand>,
    ) -> Result<bool, Error>;
}
