use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use voicekey::audio::classifier::FrameClassifier;
use voicekey::audio::recorder::AudioSource;
use voicekey::audio::wav::WavAudioSource;
use voicekey::cli::{Cli, Commands};
use voicekey::command::CommandResolver;
use voicekey::config::Config;
use voicekey::defaults;
use voicekey::inject::keystroke::KeystrokeExecutor;
use voicekey::monitor::{MonitorSession, SessionConfig};
use voicekey::stt::whisper::{WhisperConfig, WhisperTranscriber};
use voicekey::stt::Transcriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_monitor(cli).await,
        Some(Commands::Devices) => list_audio_devices(),
        Some(Commands::Commands) => show_commands(cli.config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}

async fn run_monitor(cli: Cli) -> Result<()> {
    #[cfg(feature = "cpal-audio")]
    voicekey::audio::capture::suppress_audio_warnings();

    let mut config = load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(device) = cli.device {
        config.audio.device = Some(device);
    }
    if let Some(model) = cli.model {
        config.stt.model = model;
    }
    if let Some(language) = cli.language {
        config.stt.language = language;
    }
    if let Some(aggressiveness) = cli.aggressiveness {
        config.vad.aggressiveness = aggressiveness;
    }

    let resolver = CommandResolver::new(config.command_table());

    if !cli.quiet {
        eprintln!("voicekey {}", voicekey::version_string());
        eprintln!("Listening for commands:");
        for entry in resolver.table().entries() {
            eprintln!("  \"{}\" -> {}", entry.phrase(), entry.action());
        }
        eprintln!("Speak to trigger commands or dictation. Ctrl+C to stop.");
    }

    let wav_mode = cli.wav.is_some();
    let source: Box<dyn AudioSource> = match &cli.wav {
        Some(path) => Box::new(WavAudioSource::from_path(path)?),
        None => live_source(config.audio.device.as_deref())?,
    };

    let frame_samples = defaults::frame_samples(config.audio.sample_rate, config.audio.frame_ms);
    let classifier = frame_classifier(config.vad.aggressiveness, frame_samples)?;

    let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::new(WhisperConfig {
        model_path: PathBuf::from(&config.stt.model),
        language: config.stt.language.clone(),
        threads: None,
    })?);

    let executor = Box::new(
        KeystrokeExecutor::system().with_dictation_keycode(config.dispatch.dictation_keycode),
    );

    let session_config = SessionConfig {
        accumulator: config.accumulator_config(),
        sample_rate: config.audio.sample_rate,
        frame_ms: config.audio.frame_ms,
        debounce_ms: config.dispatch.debounce_ms,
        quiet: cli.quiet,
        verbosity: cli.verbose,
    };

    let handle = MonitorSession::new(session_config).start(
        source,
        classifier,
        transcriber,
        resolver,
        executor,
    )?;

    if wav_mode {
        // Finite source: the session ends when the file is exhausted
        handle.wait();
    } else {
        tokio::signal::ctrl_c().await?;
        if !cli.quiet {
            eprintln!("\nShutting down...");
        }
        handle.stop();
    }

    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn live_source(device: Option<&str>) -> Result<Box<dyn AudioSource>> {
    use voicekey::audio::capture::CpalAudioSource;
    Ok(Box::new(CpalAudioSource::new(device)?))
}

#[cfg(not(feature = "cpal-audio"))]
fn live_source(_device: Option<&str>) -> Result<Box<dyn AudioSource>> {
    anyhow::bail!(
        "this build has no microphone support (cpal-audio feature disabled); use --wav"
    )
}

#[cfg(feature = "vad-earshot")]
fn frame_classifier(aggressiveness: u8, frame_samples: usize) -> Result<Box<dyn FrameClassifier>> {
    use voicekey::audio::classifier::EarshotClassifier;
    Ok(Box::new(EarshotClassifier::new(
        aggressiveness,
        frame_samples,
    )))
}

#[cfg(not(feature = "vad-earshot"))]
fn frame_classifier(
    _aggressiveness: u8,
    _frame_samples: usize,
) -> Result<Box<dyn FrameClassifier>> {
    anyhow::bail!("this build has no frame classifier (vad-earshot feature disabled)")
}

#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = voicekey::audio::capture::list_devices()?;
    if devices.is_empty() {
        eprintln!("No audio input devices found");
    } else {
        println!("Available audio input devices:");
        for device in devices {
            println!("  {}", device);
        }
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!("this build has no microphone support (cpal-audio feature disabled)")
}

fn show_commands(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let table = config.command_table();

    println!("Keyword commands (first match wins):");
    for entry in table.entries() {
        println!("  \"{}\" -> {}", entry.phrase(), entry.action());
    }
    println!("No match -> dictate (debounced {} ms)", config.dispatch.debounce_ms);
    Ok(())
}
