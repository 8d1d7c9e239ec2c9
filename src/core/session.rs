use crate::core::negotiation::{self, NegotiationReply};
use crate::domain::language::{Labels, Language};
use crate::domain::model::{
    FormField, NegotiationHistory, PriceQuoteResult, QuoteForm, ScreenState,
};
use crate::domain::ports::{PricingService, SpeechInput, SpeechOutput};
use crate::utils::error::{MandiError, Result};
use crate::utils::validation::validate_quote_input;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const CONNECTION_ERROR_MESSAGE: &str = "❌ Backend connection failed";
pub const SPEECH_UNAVAILABLE_MESSAGE: &str = "Speech recognition not supported";

/// At most one recognition session at a time.
#[derive(Debug, Clone, Default)]
pub struct ListeningFlag(Arc<AtomicBool>);

impl ListeningFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn engage(&self) -> Result<ListeningGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| MandiError::ListenerBusy)?;
        Ok(ListeningGuard(Arc::clone(&self.0)))
    }
}

/// Clears the flag when dropped, whichever way the session ends.
#[derive(Debug)]
pub struct ListeningGuard(Arc<AtomicBool>);

impl Drop for ListeningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// 報價結果只存在於 Result 畫面
#[derive(Debug, Clone)]
enum Screen {
    LanguageSelect,
    DataEntry,
    Result(PriceQuoteResult),
}

/// The screen controller: owns every piece of mutable UI state and only
/// changes it in response to a completed operation.
pub struct MandiSession<P, O, I> {
    pricing: P,
    speaker: O,
    recognizer: I,
    language: Language,
    screen: Screen,
    form: QuoteForm,
    history: NegotiationHistory,
    error: Option<String>,
    listening: ListeningFlag,
}

impl<P: PricingService, O: SpeechOutput, I: SpeechInput> MandiSession<P, O, I> {
    pub fn new(pricing: P, speaker: O, recognizer: I) -> Self {
        Self {
            pricing,
            speaker,
            recognizer,
            language: Language::default(),
            screen: Screen::LanguageSelect,
            form: QuoteForm::default(),
            history: NegotiationHistory::new(),
            error: None,
            listening: ListeningFlag::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn state(&self) -> ScreenState {
        match self.screen {
            Screen::LanguageSelect => ScreenState::LanguageSelect,
            Screen::DataEntry => ScreenState::DataEntry,
            Screen::Result(_) => ScreenState::Result,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn labels(&self) -> &'static Labels {
        self.language.labels()
    }

    pub fn form(&self) -> &QuoteForm {
        &self.form
    }

    pub fn result(&self) -> Option<&PriceQuoteResult> {
        match &self.screen {
            Screen::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn history(&self) -> &NegotiationHistory {
        &self.history
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.is_set()
    }

    pub fn listening_flag(&self) -> ListeningFlag {
        self.listening.clone()
    }

    fn speak(&self, text: &str) {
        self.speaker.speak(text, self.language.locale_tag());
    }

    fn require(&self, expected: ScreenState, action: &str) -> Result<()> {
        let state = self.state();
        if state != expected {
            return Err(MandiError::InvalidTransition {
                state: state.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    pub fn select_language(&mut self, language: Language) -> Result<()> {
        self.require(ScreenState::LanguageSelect, "change the language")?;
        self.language = language;
        tracing::debug!("🌐 Language selected: {} ({})", language, language.locale_tag());
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.require(ScreenState::LanguageSelect, "start")?;
        self.screen = Screen::DataEntry;
        tracing::info!("▶️ Session started in {}", self.language);
        Ok(())
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<()> {
        self.require(ScreenState::DataEntry, "edit the form")?;
        *self.form.field_mut(field) = value.into();
        Ok(())
    }

    async fn capture(&mut self) -> Result<Option<String>> {
        let outcome = {
            let _guard = self.listening.engage()?;
            self.recognizer.listen(self.language.locale_tag()).await
        };

        match outcome {
            Err(e @ MandiError::SpeechUnavailable { .. }) => {
                tracing::warn!("🎤 {}", e);
                self.error = Some(SPEECH_UNAVAILABLE_MESSAGE.to_string());
                Err(e)
            }
            other => other,
        }
    }

    /// Fills one form field from a spoken utterance.
    pub async fn listen_for(&mut self, field: FormField) -> Result<Option<String>> {
        self.require(ScreenState::DataEntry, "dictate a field")?;
        let transcript = self.capture().await?;
        if let Some(text) = &transcript {
            *self.form.field_mut(field) = text.clone();
        }
        Ok(transcript)
    }

    /// 驗證表單並向定價服務要求報價；只有成功時才進入 Result 畫面
    pub async fn submit(&mut self) -> Result<PriceQuoteResult> {
        self.require(ScreenState::DataEntry, "request a price")?;

        let labels = self.labels();
        if !validate_quote_input(&self.form.product, &self.form.quantity, &self.form.location) {
            tracing::warn!("⚠️ Quote form failed validation");
            self.error = Some(labels.error.to_string());
            self.speak(labels.error);
            return Err(MandiError::ValidationError {
                message: labels.error.to_string(),
            });
        }

        let request = self.form.to_request(self.language.backend_code());
        match self.pricing.request_price(&request).await {
            Ok(result) => {
                self.speak(&result.announcement());
                self.error = None;
                self.screen = Screen::Result(result.clone());
                tracing::info!("✅ Quote received for {}", request.product);
                Ok(result)
            }
            Err(e) => {
                tracing::error!("❌ Price request failed: {}", e);
                self.error = Some(CONNECTION_ERROR_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Evaluates a spoken offer against the current quote.
    ///
    /// Without a quote, or with a range that lacks two numbers, nothing is
    /// recorded or spoken and `None` is returned.
    pub fn negotiate(&mut self, spoken_text: &str) -> Option<NegotiationReply> {
        let Screen::Result(result) = &self.screen else {
            tracing::debug!("🤝 No quote yet, ignoring offer");
            return None;
        };

        let reply = match negotiation::evaluate(&result.price_range, spoken_text) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("⚠️ Negotiation skipped: {}", e);
                return None;
            }
        };

        let text = reply.to_string();
        self.history.record_round(spoken_text, &text);
        self.speak(&text);
        tracing::info!("🤝 Offer '{}' -> {}", spoken_text, text);
        Some(reply)
    }

    pub async fn negotiate_by_voice(&mut self) -> Result<Option<NegotiationReply>> {
        self.require(ScreenState::Result, "negotiate")?;
        let transcript = self.capture().await?;
        Ok(transcript.and_then(|text| self.negotiate(&text)))
    }

    /// Back to language selection with an empty form, quote, history and error.
    pub fn reset(&mut self) {
        self.screen = Screen::LanguageSelect;
        self.form = QuoteForm::default();
        self.history.clear();
        self.error = None;
        tracing::debug!("🔄 Session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PriceQuoteRequest, Speaker};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct MockPricing {
        fail: bool,
        requests: Arc<Mutex<Vec<PriceQuoteRequest>>>,
    }

    #[async_trait::async_trait]
    impl PricingService for MockPricing {
        async fn request_price(&self, request: &PriceQuoteRequest) -> Result<PriceQuoteResult> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                let err = reqwest::Client::new().get("not a url").build().unwrap_err();
                return Err(MandiError::ConnectionError(err));
            }
            Ok(PriceQuoteResult {
                price_range: "₹20–₹30".to_string(),
                negotiation_tip: "Start negotiation near ₹21 for a fair deal.".to_string(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSpeaker {
        spoken: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingSpeaker {
        fn spoken(&self) -> Vec<(String, String)> {
            self.spoken.lock().unwrap().clone()
        }
    }

    impl SpeechOutput for RecordingSpeaker {
        fn speak(&self, text: &str, locale: &str) {
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), locale.to_string()));
        }
    }

    /// 依序回傳預先準備的辨識結果，並記錄辨識期間旗標是否已設定
    #[derive(Default)]
    struct ScriptedRecognizer {
        transcripts: Mutex<VecDeque<Option<String>>>,
        probe: Mutex<Option<ListeningFlag>>,
        flag_seen: Mutex<Vec<bool>>,
    }

    impl ScriptedRecognizer {
        fn with(transcripts: &[Option<&str>]) -> Self {
            Self {
                transcripts: Mutex::new(
                    transcripts.iter().map(|t| t.map(str::to_string)).collect(),
                ),
                ..Default::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl SpeechInput for ScriptedRecognizer {
        async fn listen(&self, _locale: &str) -> Result<Option<String>> {
            if let Some(flag) = self.probe.lock().unwrap().as_ref() {
                self.flag_seen.lock().unwrap().push(flag.is_set());
            }
            Ok(self.transcripts.lock().unwrap().pop_front().flatten())
        }
    }

    struct NeverRecognizer;

    #[async_trait::async_trait]
    impl SpeechInput for NeverRecognizer {
        async fn listen(&self, _locale: &str) -> Result<Option<String>> {
            std::future::pending().await
        }
    }

    fn session_with(
        pricing: MockPricing,
        recognizer: ScriptedRecognizer,
    ) -> (MandiSession<MockPricing, RecordingSpeaker, ScriptedRecognizer>, RecordingSpeaker) {
        let speaker = RecordingSpeaker::default();
        (MandiSession::new(pricing, speaker.clone(), recognizer), speaker)
    }

    fn fill(session: &mut MandiSession<MockPricing, RecordingSpeaker, ScriptedRecognizer>) {
        session.set_field(FormField::Product, "wheat").unwrap();
        session.set_field(FormField::Quantity, "5").unwrap();
        session.set_field(FormField::Location, "Pune").unwrap();
    }

    #[tokio::test]
    async fn test_happy_path_reaches_result_and_announces_quote() {
        let pricing = MockPricing::default();
        let (mut session, speaker) = session_with(pricing.clone(), ScriptedRecognizer::default());

        assert_eq!(session.state(), ScreenState::LanguageSelect);
        session.select_language(Language::Hindi).unwrap();
        session.start().unwrap();
        fill(&mut session);

        let result = session.submit().await.unwrap();

        assert_eq!(session.state(), ScreenState::Result);
        assert_eq!(session.result(), Some(&result));
        assert_eq!(session.error(), None);

        let requests = pricing.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].language, "hi");

        assert_eq!(
            speaker.spoken(),
            vec![(
                "₹20–₹30. Start negotiation near ₹21 for a fair deal.".to_string(),
                "hi-IN".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_validation_failure_is_shown_spoken_and_keeps_data_entry() {
        let pricing = MockPricing::default();
        let (mut session, speaker) = session_with(pricing.clone(), ScriptedRecognizer::default());
        session.select_language(Language::Tamil).unwrap();
        session.start().unwrap();
        session.set_field(FormField::Product, "rice").unwrap();
        session.set_field(FormField::Quantity, "0").unwrap();
        session.set_field(FormField::Location, "Chennai").unwrap();

        let err = session.submit().await.unwrap_err();

        assert!(matches!(err, MandiError::ValidationError { .. }));
        assert_eq!(session.state(), ScreenState::DataEntry);
        assert_eq!(session.error(), Some(Language::Tamil.labels().error));
        assert_eq!(speaker.spoken()[0].0, Language::Tamil.labels().error);
        assert!(pricing.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_spoken_quantity_with_unit_is_accepted() {
        let pricing = MockPricing::default();
        let recognizer = ScriptedRecognizer::with(&[Some("2 किलो")]);
        let (mut session, _speaker) = session_with(pricing.clone(), recognizer);
        session.select_language(Language::Hindi).unwrap();
        session.start().unwrap();
        session.set_field(FormField::Product, "प्याज").unwrap();
        session.listen_for(FormField::Quantity).await.unwrap();
        session.set_field(FormField::Location, "Nashik").unwrap();

        session.submit().await.unwrap();

        assert_eq!(session.state(), ScreenState::Result);
        // 原文照送，單位交給服務端解析
        assert_eq!(pricing.requests.lock().unwrap()[0].quantity, "2 किलो");
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_data_entry() {
        let pricing = MockPricing {
            fail: true,
            ..Default::default()
        };
        let (mut session, speaker) = session_with(pricing, ScriptedRecognizer::default());
        session.start().unwrap();
        fill(&mut session);

        let err = session.submit().await.unwrap_err();

        assert!(matches!(err, MandiError::ConnectionError(_)));
        assert_eq!(session.state(), ScreenState::DataEntry);
        assert_eq!(session.result(), None);
        assert_eq!(session.error(), Some(CONNECTION_ERROR_MESSAGE));
        assert!(speaker.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_negotiation_rounds_append_alternating_turns() {
        let (mut session, speaker) = session_with(MockPricing::default(), ScriptedRecognizer::default());
        session.start().unwrap();
        fill(&mut session);
        session.submit().await.unwrap();

        let offers = ["15", "25", "40", "please"];
        for offer in offers {
            assert!(session.negotiate(offer).is_some());
        }

        let turns = session.history().turns();
        assert_eq!(turns.len(), 2 * offers.len());
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Speaker::User } else { Speaker::Assistant };
            assert_eq!(turn.speaker, expected);
        }
        assert_eq!(turns[0].text, "15");
        assert_eq!(turns[1].text, "₹15 is too low. Minimum is ₹21.");
        assert_eq!(turns[3].text, "₹25 is acceptable. Deal finalized.");
        assert_eq!(turns[5].text, "₹40 is above market price.");
        assert_eq!(turns[7].text, "Market price is ₹20–₹30. Please say a number.");

        // 報價朗讀一次，加上每一輪的回覆
        assert_eq!(speaker.spoken().len(), 1 + offers.len());
    }

    #[tokio::test]
    async fn test_negotiate_without_quote_is_a_no_op() {
        let (mut session, speaker) = session_with(MockPricing::default(), ScriptedRecognizer::default());
        session.start().unwrap();

        assert_eq!(session.negotiate("25"), None);
        assert!(session.history().is_empty());
        assert!(speaker.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_voice_negotiation_uses_recognizer_transcript() {
        let recognizer = ScriptedRecognizer::with(&[Some("maybe 22 rupees"), None]);
        let (mut session, _speaker) = session_with(MockPricing::default(), recognizer);
        session.start().unwrap();
        fill(&mut session);
        session.submit().await.unwrap();

        let reply = session.negotiate_by_voice().await.unwrap();
        assert_eq!(reply, Some(NegotiationReply::Accepted { offered: 22 }));
        assert_eq!(session.history().turns()[0].text, "maybe 22 rupees");

        // 沒有辨識結果時不做任何事
        assert_eq!(session.negotiate_by_voice().await.unwrap(), None);
        assert_eq!(session.history().len(), 2);
        assert!(!session.is_listening());
    }

    #[tokio::test]
    async fn test_listen_for_fills_field_and_clears_flag() {
        let recognizer = ScriptedRecognizer::with(&[Some("onion"), None]);
        let (mut session, _speaker) = session_with(MockPricing::default(), recognizer);
        *session.recognizer.probe.lock().unwrap() = Some(session.listening_flag());
        session.start().unwrap();

        let heard = session.listen_for(FormField::Product).await.unwrap();
        assert_eq!(heard.as_deref(), Some("onion"));
        assert_eq!(session.form().product, "onion");
        assert!(!session.is_listening());

        assert_eq!(session.listen_for(FormField::Location).await.unwrap(), None);
        assert_eq!(session.form().location, "");
        assert!(!session.is_listening());

        assert_eq!(*session.recognizer.flag_seen.lock().unwrap(), vec![true, true]);
    }

    #[tokio::test]
    async fn test_unavailable_recognizer_sets_notice() {
        let mut session = MandiSession::new(
            MockPricing::default(),
            RecordingSpeaker::default(),
            crate::adapters::speech::UnavailableRecognizer,
        );
        session.start().unwrap();

        let err = session.listen_for(FormField::Product).await.unwrap_err();
        assert!(matches!(err, MandiError::SpeechUnavailable { .. }));
        assert_eq!(session.error(), Some(SPEECH_UNAVAILABLE_MESSAGE));
        assert!(!session.is_listening());
    }

    #[tokio::test]
    async fn test_abandoned_listen_releases_flag() {
        let mut session =
            MandiSession::new(MockPricing::default(), RecordingSpeaker::default(), NeverRecognizer);
        session.start().unwrap();
        let flag = session.listening_flag();

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            session.listen_for(FormField::Quantity),
        )
        .await;

        assert!(outcome.is_err());
        assert!(!flag.is_set());
    }

    #[test]
    fn test_listening_flag_refuses_second_session() {
        let flag = ListeningFlag::default();
        let guard = flag.engage().unwrap();
        assert!(flag.is_set());
        assert!(matches!(flag.engage(), Err(MandiError::ListenerBusy)));
        drop(guard);
        assert!(!flag.is_set());
        assert!(flag.engage().is_ok());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let (mut session, _speaker) = session_with(MockPricing::default(), ScriptedRecognizer::default());
        session.select_language(Language::Bengali).unwrap();
        session.start().unwrap();
        fill(&mut session);
        session.submit().await.unwrap();
        session.negotiate("25");

        session.reset();

        assert_eq!(session.state(), ScreenState::LanguageSelect);
        assert_eq!(session.form(), &QuoteForm::default());
        assert_eq!(session.result(), None);
        assert!(session.history().is_empty());
        assert_eq!(session.error(), None);
        assert_eq!(session.language(), Language::Bengali);
    }

    #[tokio::test]
    async fn test_operations_in_wrong_state_are_rejected() {
        let (mut session, _speaker) = session_with(MockPricing::default(), ScriptedRecognizer::default());

        assert!(matches!(
            session.submit().await,
            Err(MandiError::InvalidTransition { .. })
        ));
        assert!(session.set_field(FormField::Product, "wheat").is_err());
        assert!(session.negotiate_by_voice().await.is_err());

        session.start().unwrap();
        assert!(session.select_language(Language::Hindi).is_err());
        assert!(session.start().is_err());
        assert_eq!(session.state(), ScreenState::DataEntry);
    }
}
