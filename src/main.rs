use anyhow::Result;
use clerk::integration::{AppConfig, DispatchLoop, SpeechMode};
use clerk::llm::AzureChatClient;
use clerk::speech::{ConsoleSpeech, SpeechInterface};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Logs go to stderr so console dialogue on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clerk=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Clerk hardware store assistant");

    let config = AppConfig::from_env()?;
    config.validate()?;
    info!(mode = %config.mode, model = %config.agent.model_id, "Configuration loaded");

    let runtime = Arc::new(
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?,
    );

    let client = Arc::new(AzureChatClient::new(&config.chat, Arc::clone(&runtime)));
    let speech = build_speech(&config, runtime)?;

    let dispatch = DispatchLoop::from_config(&config, client, speech);
    match dispatch.run() {
        Ok(summary) => {
            info!(turns = summary.turns, "Goodbye");
            Ok(())
        }
        Err(e) => {
            error!("Session ended by fault: {}", e);
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}

fn build_speech(config: &AppConfig, runtime: Arc<tokio::runtime::Runtime>) -> Result<Box<dyn SpeechInterface>> {
    match config.mode {
        SpeechMode::Console => Ok(Box::new(ConsoleSpeech::stdio())),
        SpeechMode::Voice => voice_speech(config, runtime),
    }
}

#[cfg(feature = "audio-io")]
fn voice_speech(config: &AppConfig, runtime: Arc<tokio::runtime::Runtime>) -> Result<Box<dyn SpeechInterface>> {
    use clerk::speech::VoiceSpeech;

    let speech = config
        .speech
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Voice mode needs speech service credentials"))?;
    Ok(Box::new(VoiceSpeech::new(speech, config.capture.clone(), runtime)?))
}

#[cfg(not(feature = "audio-io"))]
fn voice_speech(_config: &AppConfig, _runtime: Arc<tokio::runtime::Runtime>) -> Result<Box<dyn SpeechInterface>> {
    anyhow::bail!("Voice mode needs a build with the `audio-io` feature")
}
