use crate::adapters::speech::SharedLines;
use crate::core::session::MandiSession;
use crate::domain::language::Language;
use crate::domain::model::{FormField, ScreenState, Speaker};
use crate::domain::ports::{PricingService, SpeechInput, SpeechOutput};
use crate::utils::error::Result;
use std::io::Write;
use tokio::io::AsyncBufRead;

const FIELDS: [FormField; 3] = [FormField::Product, FormField::Quantity, FormField::Location];

/// Line-based rendering of the single mandi screen.
///
/// The same line source feeds both the prompts and the `LineRecognizer`,
/// so a spoken utterance is simply the next line after `!` or `v`.
pub struct TerminalApp<P, O, I, R, W> {
    session: MandiSession<P, O, I>,
    lines: SharedLines<R>,
    out: W,
    header_printed: bool,
    rendered_turns: usize,
}

impl<P, O, I, R, W> TerminalApp<P, O, I, R, W>
where
    P: PricingService,
    O: SpeechOutput,
    I: SpeechInput,
    R: AsyncBufRead + Unpin + Send,
    W: Write,
{
    pub fn new(session: MandiSession<P, O, I>, lines: SharedLines<R>, out: W) -> Self {
        Self {
            session,
            lines,
            out,
            header_printed: false,
            rendered_turns: 0,
        }
    }

    pub fn session(&self) -> &MandiSession<P, O, I> {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.out
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let mut lines = self.lines.lock().await;
        Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let keep_going = match self.session.state() {
                ScreenState::LanguageSelect => self.language_screen().await?,
                ScreenState::DataEntry => self.data_entry_screen().await?,
                ScreenState::Result => self.result_screen().await?,
            };
            if !keep_going {
                break;
            }
        }

        writeln!(self.out, "👋")?;
        Ok(())
    }

    async fn language_screen(&mut self) -> Result<bool> {
        writeln!(self.out, "\n== {} ==", self.session.labels().title)?;
        for (index, language) in Language::ALL.iter().enumerate() {
            let marker = if *language == self.session.language() { "*" } else { " " };
            writeln!(self.out, " {} {}. {}", marker, index + 1, language)?;
        }

        let Some(choice) = self.prompt("> ").await? else {
            return Ok(false);
        };
        if choice.eq_ignore_ascii_case("q") {
            return Ok(false);
        }

        if !choice.is_empty() {
            let selected = match choice.parse::<usize>() {
                Ok(n) if (1..=Language::ALL.len()).contains(&n) => Language::ALL[n - 1],
                _ => match choice.parse::<Language>() {
                    Ok(language) => language,
                    Err(e) => {
                        writeln!(self.out, "⚠️ {}", e.user_friendly_message())?;
                        return Ok(true);
                    }
                },
            };
            self.session.select_language(selected)?;
        }

        writeln!(self.out, "▶ {}", self.session.labels().start)?;
        self.session.start()?;
        Ok(true)
    }

    async fn data_entry_screen(&mut self) -> Result<bool> {
        let labels = self.session.labels();
        writeln!(self.out, "\n== {} ==", labels.title)?;
        if let Some(error) = self.session.error() {
            writeln!(self.out, "⚠️ {}", error)?;
        }

        for field in FIELDS {
            let label = match field {
                FormField::Product => labels.product,
                FormField::Quantity => labels.quantity,
                FormField::Location => labels.location,
            };
            let current = match field {
                FormField::Product => &self.session.form().product,
                FormField::Quantity => &self.session.form().quantity,
                FormField::Location => &self.session.form().location,
            };
            let prompt = if current.is_empty() {
                format!("{} (! = 🎤): ", label)
            } else {
                format!("{} [{}] (! = 🎤): ", label, current)
            };

            let Some(input) = self.prompt(&prompt).await? else {
                return Ok(false);
            };

            match input.as_str() {
                ":quit" => return Ok(false),
                ":back" => {
                    self.session.reset();
                    return Ok(true);
                }
                "!" => {
                    writeln!(self.out, "🎤 ...")?;
                    match self.session.listen_for(field).await {
                        Ok(Some(heard)) => writeln!(self.out, "🎤 {}", heard)?,
                        Ok(None) => {}
                        Err(e) if e.is_recoverable() => {
                            writeln!(self.out, "⚠️ {}", e.user_friendly_message())?
                        }
                        Err(e) => return Err(e),
                    }
                }
                "" => {}
                text => self.session.set_field(field, text)?,
            }
        }

        writeln!(self.out, "⏳ {}", labels.get_price)?;
        match self.session.submit().await {
            Ok(_) => {}
            // 錯誤訊息會在下一輪畫面頂端顯示
            Err(e) if e.is_recoverable() => {
                tracing::debug!("Quote request not completed: {}", e);
            }
            Err(e) => return Err(e),
        }
        Ok(true)
    }

    fn render_new_turns(&mut self) -> Result<()> {
        let turns = self.session.history().turns();
        for turn in &turns[self.rendered_turns..] {
            let who = match turn.speaker {
                Speaker::User => "🧑 You:",
                Speaker::Assistant => "🤖 AI:",
            };
            writeln!(self.out, "{} {}", who, turn.text)?;
        }
        self.rendered_turns = turns.len();
        Ok(())
    }

    async fn result_screen(&mut self) -> Result<bool> {
        if !self.header_printed {
            if let Some(result) = self.session.result() {
                writeln!(self.out, "\n💰 {}", result.price_range)?;
                writeln!(self.out, "🤖 {}", result.negotiation_tip)?;
            }
            self.header_printed = true;
        }

        let Some(input) = self
            .prompt("[v] 🎤 Voice Negotiate  [b] back  [q] quit > ")
            .await?
        else {
            return Ok(false);
        };

        match input.as_str() {
            "q" => return Ok(false),
            "b" => {
                self.session.reset();
                self.header_printed = false;
                self.rendered_turns = 0;
                return Ok(true);
            }
            "v" | "" => {
                writeln!(self.out, "🎤 ...")?;
                match self.session.negotiate_by_voice().await {
                    Ok(Some(_)) => {}
                    Ok(None) => writeln!(self.out, "🎤 (no speech detected)")?,
                    Err(e) if e.is_recoverable() => {
                        writeln!(self.out, "⚠️ {}", e.user_friendly_message())?
                    }
                    Err(e) => return Err(e),
                }
            }
            // 直接輸入的出價
            offer => {
                self.session.negotiate(offer);
            }
        }

        self.render_new_turns()?;
        Ok(true)
    }
}
