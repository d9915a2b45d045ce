//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "voicekey",
    about = "Voice keyword commands for Linux desktops",
    version = crate::version_string()
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Audio input device name (see `voicekey devices`)
    #[arg(long)]
    pub device: Option<String>,

    /// Path to the Whisper model file
    #[arg(long)]
    pub model: Option<String>,

    /// Transcription language code, or "auto"
    #[arg(long)]
    pub language: Option<String>,

    /// Monitor a WAV file instead of the microphone
    #[arg(long)]
    pub wav: Option<PathBuf>,

    /// Classifier aggressiveness (0 = permissive, 3 = strict)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub aggressiveness: Option<u8>,

    /// Suppress status messages
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v segment diagnostics)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available audio input devices
    Devices,
    /// Show the active keyword command table
    Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_invocation() {
        let cli = Cli::try_parse_from(["voicekey"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "voicekey",
            "--device",
            "pipewire",
            "--aggressiveness",
            "3",
            "-q",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.device.as_deref(), Some("pipewire"));
        assert_eq!(cli.aggressiveness, Some(3));
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn rejects_out_of_range_aggressiveness() {
        let result = Cli::try_parse_from(["voicekey", "--aggressiveness", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["voicekey", "devices"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Devices)));

        let cli = Cli::try_parse_from(["voicekey", "commands"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Commands)));
    }

    #[test]
    fn parses_wav_path() {
        let cli = Cli::try_parse_from(["voicekey", "--wav", "/tmp/sample.wav"]).unwrap();
        assert_eq!(cli.wav, Some(PathBuf::from("/tmp/sample.wav")));
    }

    #[test]
    fn cli_asserts_valid_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
