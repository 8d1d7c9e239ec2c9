use crate::adapters::speech::{DEFAULT_SPEECH_COMMAND, DEFAULT_SPEECH_RATE};
use crate::config::validate_provider;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "voice-mandi")]
#[command(about = "Voice-assisted multilingual price negotiation for mandi sellers")]
pub struct CliConfig {
    #[arg(long, default_value = super::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value_t = super::DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, help = "Preselect a language (name, code or locale tag)")]
    pub language: Option<String>,

    #[arg(long, default_value = DEFAULT_SPEECH_COMMAND)]
    pub speech_command: String,

    #[arg(long, default_value_t = DEFAULT_SPEECH_RATE)]
    pub speech_rate: f32,

    #[arg(long, help = "Disable speech output")]
    pub mute: bool,

    #[arg(long, help = "Disable voice input")]
    pub no_voice_input: bool,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn pricing_endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn default_language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn speech_command(&self) -> Option<&str> {
        (!self.mute).then_some(self.speech_command.as_str())
    }

    fn speech_args(&self) -> Option<&[String]> {
        None
    }

    fn speech_rate(&self) -> f32 {
        self.speech_rate
    }

    fn voice_input_enabled(&self) -> bool {
        !self.no_voice_input
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
