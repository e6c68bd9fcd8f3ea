//! Application configuration and CLI argument parsing.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use super::env_file::{VOICE_KEY, load_env_file};

/// Sentence synthesized when `--text` is not given.
pub const DEFAULT_TEXT: &str = "Hello! This is a test of the Wyoming Piper text to speech system. \
     I am demonstrating the current voice model configuration. \
     Can you hear the difference in voice characteristics?";

const EXAMPLES: &str = "\
Examples:
  piper-voice-test                                 # Basic test
  piper-voice-test --play                          # Test and play audio
  piper-voice-test --text \"Hello!\"                 # Custom text
  piper-voice-test --host 192.168.1.100 --port 10201  # Custom server";

/// Voice test configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "piper-voice-test")]
#[command(author, version, about = "Test Wyoming Piper TTS voice output", long_about = None, after_help = EXAMPLES)]
pub struct AppConfig {
    /// Wyoming Piper server hostname
    #[arg(long, env = "WYOMING_HOST", default_value = "localhost")]
    pub host: String,

    /// Wyoming Piper server port
    #[arg(long, env = "WYOMING_PORT", default_value = "10200")]
    pub port: u16,

    /// Text to synthesize
    #[arg(long, default_value = DEFAULT_TEXT)]
    pub text: String,

    /// Output WAV file
    #[arg(long, short = 'o', default_value = "test_output.wav")]
    pub output: PathBuf,

    /// Automatically play the generated audio
    #[arg(long)]
    pub play: bool,

    /// Override voice model (uses PIPER_VOICE from the env file by default)
    #[arg(long)]
    pub voice: Option<String>,

    /// Local KEY=VALUE file read for PIPER_VOICE
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Voice found in the env file, if any
    #[arg(skip)]
    pub env_voice: Option<String>,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    ///
    /// The env file is merged separately with [`AppConfig::with_env_file`].
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Merge values from `env_file` into the configuration.
    pub fn with_env_file(self) -> Self {
        let values = load_env_file(&self.env_file);
        self.with_env_values(&values)
    }

    fn with_env_values(mut self, values: &HashMap<String, String>) -> Self {
        self.env_voice = values.get(VOICE_KEY).filter(|v| !v.is_empty()).cloned();
        self.voice = self.voice.filter(|v| !v.trim().is_empty());
        self
    }

    /// Voice to request: `--voice`, then the env file, then the server default.
    pub fn target_voice(&self) -> Option<&str> {
        self.voice.as_deref().or(self.env_voice.as_deref())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        debug!("Configuration:");
        debug!("  Server: {}:{}", self.host, self.port);
        debug!("  Output: {}", self.output.display());
        debug!("  Env file: {}", self.env_file.display());
        debug!("  Voice: {}", self.target_voice().unwrap_or("(server default)"));
        debug!("  Play: {}", self.play);
    }
}
