use crate::domain::external_apis::speech::{SPEECH_TIMEOUT, SpeechNotifier};
use crate::domain::models::config::SpeechCommand;
use crate::infrastructures::adapters::secondary::process::command::{
    find_on_path, output_with_input, output_with_timeout,
};
use anyhow::{Error, bail};
use async_trait::async_trait;
use std::time::Duration;

const POWERSHELL_SPEAK: &str = "Add-Type -AssemblyName System.Speech; \
     (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak";

/// How the message reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVia {
    /// Appended as the last argument.
    Argument,
    Stdin,
    /// Embedded in a PowerShell `System.Speech` script.
    PowerShellScript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechBackend {
    pub program: String,
    pub args: Vec<String>,
    pub via: MessageVia,
}

struct Candidate {
    os: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    via: MessageVia,
}

/// Candidate backends per platform, in order of preference.
const CANDIDATES: &[Candidate] = &[
    Candidate { os: "macos", program: "mysay", args: &[], via: MessageVia::Argument },
    Candidate { os: "macos", program: "say", args: &[], via: MessageVia::Argument },
    Candidate { os: "linux", program: "espeak", args: &[], via: MessageVia::Argument },
    Candidate { os: "linux", program: "espeak-ng", args: &[], via: MessageVia::Argument },
    Candidate { os: "linux", program: "festival", args: &["--tts"], via: MessageVia::Stdin },
    Candidate { os: "linux", program: "spd-say", args: &[], via: MessageVia::Argument },
];

/// First available backend for `os`. PowerShell is assumed present on Windows.
pub fn detect_backend(os: &str, is_available: impl Fn(&str) -> bool) -> Option<SpeechBackend> {
    if os == "windows" {
        return Some(SpeechBackend {
            program: "powershell".to_string(),
            args: vec!["-NoProfile".to_string(), "-Command".to_string()],
            via: MessageVia::PowerShellScript,
        });
    }
    CANDIDATES
        .iter()
        .filter(|candidate| candidate.os == os)
        .find(|candidate| is_available(candidate.program))
        .map(|candidate| SpeechBackend {
            program: candidate.program.to_string(),
            args: candidate.args.iter().map(ToString::to_string).collect(),
            via: candidate.via,
        })
}

/// A user override wins; otherwise the first detected backend.
pub fn resolve_backend(
    command_override: Option<&SpeechCommand>,
    os: &str,
    is_available: impl Fn(&str) -> bool,
) -> Option<SpeechBackend> {
    command_override
        .and_then(SpeechCommand::argv)
        .map(|(program, args)| SpeechBackend {
            program: program.to_string(),
            args: args.to_vec(),
            via: MessageVia::Argument,
        })
        .or_else(|| detect_backend(os, is_available))
}

fn powershell_script(message: &str) -> String {
    format!("{POWERSHELL_SPEAK}('{}')", message.replace('\'', "''"))
}

/// Speaks through a local text-to-speech command.
pub struct CommandSpeechNotifier {
    os: &'static str,
    timeout: Duration,
}

impl CommandSpeechNotifier {
    pub fn new() -> Self {
        Self {
            os: std::env::consts::OS,
            timeout: SPEECH_TIMEOUT,
        }
    }
}

impl Default for CommandSpeechNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechNotifier for CommandSpeechNotifier {
    #[tracing::instrument(name = "CommandSpeechNotifier::speak", skip(self, command_override))]
    async fn speak(
        &self,
        message: &str,
        command_override: Option<&SpeechCommand>,
    ) -> Result<bool, Error> {
        let Some(backend) = resolve_backend(command_override, self.os, |program| {
            find_on_path(program).is_some()
        }) else {
            tracing::debug!("No speech backend available on {}", self.os);
            return Ok(false);
        };

        let output = match backend.via {
            MessageVia::Argument => {
                let args = backend.args.iter().map(String::as_str).chain([message]);
                output_with_timeout(&backend.program, args, self.timeout).await?
            }
            MessageVia::Stdin => {
                output_with_input(&backend.program, &backend.args, message, self.timeout).await?
            }
            MessageVia::PowerShellScript => {
                let script = powershell_script(message);
                let args = backend.args.iter().map(String::as_str).chain([script.as_str()]);
                output_with_timeout(&backend.program, args, self.timeout).await?
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` exited with {}: {}",
                backend.program,
                output.status,
                stderr.trim()
            );
        }
        Ok(true)
    }
}
