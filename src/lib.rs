pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{CommandSpeaker, HttpPricingClient, LineRecognizer, SilentSpeaker, UnavailableRecognizer};
pub use app::TerminalApp;
pub use core::session::MandiSession;
pub use domain::language::Language;
pub use utils::error::{MandiError, Result};
