#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::domain::language::Language;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// 所有配置來源共用的檢查
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("pricing.endpoint", config.pricing_endpoint())?;

    validate_range(
        "pricing.timeout_seconds",
        config.request_timeout().as_secs(),
        1,
        120,
    )?;

    validate_range("speech.rate", config.speech_rate(), 0.1, 10.0)?;

    if let Some(command) = config.speech_command() {
        validate_non_empty_string("speech.command", command)?;
    }

    if let Some(name) = config.default_language() {
        name.parse::<Language>()?;
    }

    Ok(())
}
