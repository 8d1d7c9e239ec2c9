use thiserror::Error;

#[derive(Error, Debug)]
pub enum MandiError {
    #[error("Pricing service connection failed: {0}")]
    ConnectionError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Speech {capability} is not available on this platform")]
    SpeechUnavailable { capability: String },

    #[error("A speech recognition session is already active")]
    ListenerBusy,

    #[error("Price range '{range}' does not contain two numeric bounds")]
    MalformedRange { range: String },

    #[error("Cannot {action} while on the {state} screen")]
    InvalidTransition { state: String, action: String },

    #[error("Unknown language: {name}")]
    UnknownLanguage { name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl MandiError {
    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            // 驗證訊息已經是當前語言的文字
            MandiError::ValidationError { message } => message.clone(),
            MandiError::ConnectionError(_) => "❌ Backend connection failed".to_string(),
            MandiError::SpeechUnavailable { .. } => "Speech recognition not supported".to_string(),
            MandiError::ListenerBusy => "Already listening, please wait".to_string(),
            other => other.to_string(),
        }
    }

    /// 互動流程可以繼續的錯誤
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            MandiError::ConfigError { .. } | MandiError::InvalidConfigValueError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MandiError>;
