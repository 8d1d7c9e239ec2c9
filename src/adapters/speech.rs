use crate::domain::ports::{ConfigProvider, SpeechInput, SpeechOutput};
use crate::utils::error::{MandiError, Result};
use async_trait::async_trait;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub const DEFAULT_SPEECH_COMMAND: &str = "espeak-ng";
pub const DEFAULT_SPEECH_RATE: f32 = 0.95;

/// espeak 的預設語速 (words per minute)
const BASE_WPM: f32 = 175.0;

pub fn default_speech_args() -> Vec<String> {
    ["-v", "{voice}", "-s", "{wpm}", "{text}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Speaks through an external TTS program, one child process per utterance.
///
/// Argument placeholders: `{voice}` (primary language subtag, e.g. `hi`),
/// `{locale}` (full tag, e.g. `hi-IN`), `{wpm}` and `{text}`.
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    rate: f32,
    current: Mutex<Option<Child>>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>, rate: f32) -> Self {
        Self {
            program: program.into(),
            args,
            rate,
            current: Mutex::new(None),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::new(
            config.speech_command().unwrap_or(DEFAULT_SPEECH_COMMAND),
            config
                .speech_args()
                .map(|args| args.to_vec())
                .unwrap_or_else(default_speech_args),
            config.speech_rate(),
        )
    }

    fn render_args(&self, text: &str, locale: &str) -> Vec<String> {
        let voice = locale.split('-').next().unwrap_or(locale).to_lowercase();
        let wpm = ((BASE_WPM * self.rate).round() as u32).to_string();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{voice}", &voice)
                    .replace("{locale}", locale)
                    .replace("{wpm}", &wpm)
                    .replace("{text}", text)
            })
            .collect()
    }

    /// Stops the utterance in progress, if any.
    pub fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut child) = current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    pub fn is_speaking(&self) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl SpeechOutput for CommandSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        // 同一時間只播放一段語音
        if let Some(mut previous) = current.take() {
            let _ = previous.kill();
            let _ = previous.wait();
        }

        let spawned = Command::new(&self.program)
            .args(self.render_args(text, locale))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                tracing::debug!("🔊 Speaking ({}): {}", locale, text);
                *current = Some(child);
            }
            Err(e) => {
                tracing::debug!("🔇 Speech output unavailable ({}): {}", self.program, e);
            }
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Used when the platform has no speech output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeaker;

impl SpeechOutput for SilentSpeaker {
    fn speak(&self, text: &str, locale: &str) {
        tracing::trace!("🔇 ({}) {}", locale, text);
    }
}

pub type SharedLines<R> = Arc<tokio::sync::Mutex<Lines<R>>>;

pub fn shared_lines<R: AsyncBufRead + Unpin>(reader: R) -> SharedLines<R> {
    Arc::new(tokio::sync::Mutex::new(reader.lines()))
}

/// Treats the next line of terminal input as the recognized utterance.
pub struct LineRecognizer<R> {
    lines: SharedLines<R>,
}

impl<R> LineRecognizer<R> {
    pub fn new(lines: SharedLines<R>) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> SpeechInput for LineRecognizer<R> {
    async fn listen(&self, locale: &str) -> Result<Option<String>> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => {
                tracing::debug!("🎤 Recognized ({}): {}", locale, line.trim());
                Ok(Some(line.trim().to_string()))
            }
            Ok(_) => {
                tracing::debug!("🎤 Session ended without a result");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("🎤 Recognition error: {}", e);
                Ok(None)
            }
        }
    }
}

/// Used when the platform has no speech recognition.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

#[async_trait]
impl SpeechInput for UnavailableRecognizer {
    async fn listen(&self, _locale: &str) -> Result<Option<String>> {
        Err(MandiError::SpeechUnavailable {
            capability: "recognition".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_render_args_fills_placeholders() {
        let speaker = CommandSpeaker::new("espeak-ng", default_speech_args(), 0.95);
        let args = speaker.render_args("₹25 is acceptable. Deal finalized.", "hi-IN");
        assert_eq!(
            args,
            vec!["-v", "hi", "-s", "166", "₹25 is acceptable. Deal finalized."]
        );

        let speaker = CommandSpeaker::new("say", vec!["--lang={locale}".to_string()], 1.0);
        assert_eq!(speaker.render_args("hi", "ta-IN"), vec!["--lang=ta-IN"]);
    }

    #[test]
    fn test_missing_program_is_a_silent_no_op() {
        let speaker = CommandSpeaker::new("definitely-not-a-tts-binary", default_speech_args(), 1.0);
        speaker.speak("hello", "en-IN");
        assert!(!speaker.is_speaking());
        SilentSpeaker.speak("hello", "en-IN");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_utterance_replaces_the_one_in_progress() {
        let speaker = CommandSpeaker::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string()],
            1.0,
        );
        speaker.speak("first", "en-IN");
        assert!(speaker.is_speaking());

        speaker.speak("second", "en-IN");
        assert!(speaker.is_speaking());

        speaker.cancel();
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn test_line_recognizer_returns_one_utterance_per_session() {
        let lines = shared_lines(Cursor::new(b"  twenty five 25 \n\n".to_vec()));
        let recognizer = LineRecognizer::new(lines);

        let first = tokio_test::block_on(recognizer.listen("en-IN")).unwrap();
        assert_eq!(first.as_deref(), Some("twenty five 25"));

        // 空白行與 EOF 都視為沒有結果
        assert_eq!(tokio_test::block_on(recognizer.listen("en-IN")).unwrap(), None);
        assert_eq!(tokio_test::block_on(recognizer.listen("en-IN")).unwrap(), None);
    }

    #[tokio::test]
    async fn test_unavailable_recognizer_reports_unavailability() {
        let err = UnavailableRecognizer.listen("bn-IN").await.unwrap_err();
        assert!(matches!(err, MandiError::SpeechUnavailable { .. }));
    }
}
