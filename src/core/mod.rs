pub mod estimator;
pub mod negotiation;
pub mod session;

pub use crate::domain::model::{NegotiationHistory, PriceQuoteRequest, PriceQuoteResult, ScreenState};
pub use crate::domain::ports::{ConfigProvider, PricingService, SpeechInput, SpeechOutput};
pub use crate::utils::error::Result;
