//! Piper Voice Test - checks a Wyoming Piper TTS server end to end.
//!
//! Connects to the server, lists its installed voices, synthesizes a test
//! sentence into a WAV file and optionally plays it with a system audio player.

mod audio;
mod config;
mod protocol;
mod report;
mod tts;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tokio::signal;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use audio::{PlaybackError, Player};
use config::{AppConfig, VOICE_KEY};
use tts::{get_server_info, synthesize_to_wav};

/// Play the generated file, reporting the outcome.
///
/// # Returns
/// `true` if a player succeeded.
async fn play_audio(path: &Path) -> bool {
    let player = Player::default();

    if path.exists() {
        println!("🔊 Attempting to play audio...");
    }

    match player.play(path).await {
        Ok(used) => {
            println!("✓ Played audio using: {}", used.program);
            true
        }
        Err(e @ PlaybackError::FileNotFound(_)) => {
            println!("✗ {}", e);
            false
        }
        Err(e @ PlaybackError::NoPlayer) => {
            println!("✗ {}", e);
            println!("   Install one of: {}", player.candidate_names().join(", "));
            println!("   Or manually play: {}", path.display());
            false
        }
    }
}

/// Run the describe → synthesize → play sequence.
async fn run(config: &AppConfig) -> Result<ExitCode> {
    report::banner();

    if let Some(ref env_voice) = config.env_voice {
        println!("🔧 Configuration from {}:", config.env_file.display());
        println!("   {} = {}", VOICE_KEY, env_voice);
    }

    let target_voice = config.target_voice();
    if let Some(voice) = target_voice {
        println!("🎯 Target voice: {}", voice);
    }
    println!();
    config.log_config();

    println!("🔍 Checking server information...");
    let Some(server_info) = get_server_info(&config.host, config.port).await else {
        println!("❌ Cannot connect to Wyoming Piper server");
        println!("   Make sure container is running: docker-compose ps");
        println!("   Check logs: docker-compose logs wyoming-piper");
        return Ok(ExitCode::FAILURE);
    };

    report::server_info(&server_info);
    println!();

    if !synthesize_to_wav(&config.host, config.port, &config.text, &config.output, target_voice).await? {
        println!("\n❌ Test failed");
        return Ok(ExitCode::FAILURE);
    }

    println!("\n✅ Test completed successfully!");
    if config.play {
        println!();
        play_audio(&config.output).await;
    } else {
        println!("\n💡 To hear the voice, run: {} --play", env!("CARGO_PKG_NAME"));
        println!("   Or manually play: {}", config.output.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Wait for Ctrl+C or SIGTERM.
async fn wait_for_cancel() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            debug!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                debug!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to warnings only
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("warn") })
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    debug!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    // Merge the local env file once logging is up
    let config = config.with_env_file();

    tokio::select! {
        result = run(&config) => match result {
            Ok(code) => code,
            Err(e) => {
                println!("\n💥 Unexpected error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = wait_for_cancel() => {
            println!("\n⏹️  Test cancelled by user");
            ExitCode::SUCCESS
        }
    }
}
