use crate::domain::model::{PriceQuoteRequest, PriceQuoteResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait PricingService: Send + Sync {
    /// Single attempt; every failure surfaces as `MandiError::ConnectionError`.
    async fn request_price(&self, request: &PriceQuoteRequest) -> Result<PriceQuoteResult>;
}

/// Fire-and-forget text-to-speech. Starting an utterance cancels the one in
/// progress; a platform without TTS makes this a no-op.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str, locale: &str);
}

#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// One non-continuous recognition session.
    ///
    /// `Ok(Some(_))` carries the final transcript, `Ok(None)` means the
    /// session ended without a result, and `Err(SpeechUnavailable)` is
    /// returned at once when the platform cannot recognize speech.
    async fn listen(&self, locale: &str) -> Result<Option<String>>;
}

pub trait ConfigProvider: Send + Sync {
    fn pricing_endpoint(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn default_language(&self) -> Option<&str>;
    fn speech_command(&self) -> Option<&str>;
    fn speech_args(&self) -> Option<&[String]>;
    fn speech_rate(&self) -> f32;
    fn voice_input_enabled(&self) -> bool;
}

impl<T: SpeechOutput + ?Sized> SpeechOutput for Box<T> {
    fn speak(&self, text: &str, locale: &str) {
        (**self).speak(text, locale)
    }
}

#[async_trait]
impl<T: SpeechInput + ?Sized> SpeechInput for Box<T> {
    async fn listen(&self, locale: &str) -> Result<Option<String>> {
        (**self).listen(locale).await
    }
}
