use clap::Parser;
use tokio::io::BufReader;
use voice_mandi::adapters::speech::shared_lines;
use voice_mandi::core::{ConfigProvider, SpeechInput, SpeechOutput};
use voice_mandi::utils::logger;
use voice_mandi::utils::validation::Validate;
use voice_mandi::{
    CliConfig, CommandSpeaker, HttpPricingClient, Language, LineRecognizer, MandiSession,
    SilentSpeaker, TerminalApp, TomlConfig, UnavailableRecognizer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.config.as_deref() {
        Some(path) => {
            let config = match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ {}", e.user_friendly_message());
                    std::process::exit(1);
                }
            };
            let level = config
                .log_level()
                .or(if cli.verbose { Some("debug") } else { None });
            logger::init_cli_logger_with_level(level);
            tracing::info!("Loaded configuration from {}", path);
            run(&config).await
        }
        None => {
            logger::init_cli_logger(cli.verbose);
            if cli.verbose {
                tracing::debug!("CLI config: {:?}", cli);
            }
            run(&cli).await
        }
    }
}

async fn run<C: ConfigProvider + Validate>(config: &C) -> anyhow::Result<()> {
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let language = match config.default_language() {
        Some(name) => name.parse::<Language>()?,
        None => Language::default(),
    };

    let pricing = HttpPricingClient::from_config(config)?;

    let speaker: Box<dyn SpeechOutput> = match config.speech_command() {
        Some(_) => Box::new(CommandSpeaker::from_config(config)),
        None => Box::new(SilentSpeaker),
    };

    let lines = shared_lines(BufReader::new(tokio::io::stdin()));
    let recognizer: Box<dyn SpeechInput> = if config.voice_input_enabled() {
        Box::new(LineRecognizer::new(lines.clone()))
    } else {
        Box::new(UnavailableRecognizer)
    };

    tracing::info!(
        "Starting voice-mandi (pricing: {}, language: {})",
        config.pricing_endpoint(),
        language
    );

    let session = MandiSession::new(pricing, speaker, recognizer).with_language(language);
    let mut app = TerminalApp::new(session, lines, std::io::stdout());
    app.run().await?;

    Ok(())
}
