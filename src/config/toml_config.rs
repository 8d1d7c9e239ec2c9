use crate::adapters::speech::{DEFAULT_SPEECH_COMMAND, DEFAULT_SPEECH_RATE};
use crate::config::{validate_provider, DEFAULT_TIMEOUT_SECONDS};
use crate::core::ConfigProvider;
use crate::utils::error::{MandiError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pricing: PricingConfig,
    pub speech: Option<SpeechConfig>,
    pub ui: Option<UiConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub enabled: Option<bool>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub rate: Option<f32>,
    pub voice_input: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MandiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MandiError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MANDI_ENDPOINT})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref()?.log_level.as_deref()
    }

    fn speech_enabled(&self) -> bool {
        self.speech
            .as_ref()
            .and_then(|s| s.enabled)
            .unwrap_or(true)
    }
}

impl ConfigProvider for TomlConfig {
    fn pricing_endpoint(&self) -> &str {
        &self.pricing.endpoint
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.pricing.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn default_language(&self) -> Option<&str> {
        self.ui.as_ref()?.default_language.as_deref()
    }

    fn speech_command(&self) -> Option<&str> {
        if !self.speech_enabled() {
            return None;
        }
        Some(
            self.speech
                .as_ref()
                .and_then(|s| s.command.as_deref())
                .unwrap_or(DEFAULT_SPEECH_COMMAND),
        )
    }

    fn speech_args(&self) -> Option<&[String]> {
        self.speech.as_ref()?.args.as_deref()
    }

    fn speech_rate(&self) -> f32 {
        self.speech
            .as_ref()
            .and_then(|s| s.rate)
            .unwrap_or(DEFAULT_SPEECH_RATE)
    }

    fn voice_input_enabled(&self) -> bool {
        self.speech
            .as_ref()
            .and_then(|s| s.voice_input)
            .unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
