// Adapters layer: concrete implementations for external systems (pricing http, speech).

pub mod pricing_client;
pub mod speech;

pub use pricing_client::HttpPricingClient;
pub use speech::{CommandSpeaker, LineRecognizer, SilentSpeaker, UnavailableRecognizer};
