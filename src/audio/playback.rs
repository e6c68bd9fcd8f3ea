//! Best-effort playback through external audio players.
//!
//! Candidates are tried in a fixed order until one starts and exits cleanly
//! within the wait limit. Nothing is played in-process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Result;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Maximum time a single player may run before it is killed.
pub const PLAYER_TIMEOUT: Duration = Duration::from_secs(10);

/// Playback failures worth reporting to the user.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No compatible audio player found")]
    NoPlayer,
}

/// An external player invocation; the file path is appended to `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PlayerCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self { program: program.to_string(), args: args.iter().map(|a| a.to_string()).collect() }
    }
}

/// Known players in priority order.
pub fn default_players() -> Vec<PlayerCommand> {
    vec![
        PlayerCommand::new("paplay", &[]),                                    // PulseAudio
        PlayerCommand::new("aplay", &[]),                                     // ALSA
        PlayerCommand::new("ffplay", &["-nodisp", "-autoexit"]),              // FFmpeg
        PlayerCommand::new("cvlc", &["--play-and-exit", "--intf", "dummy"]), // VLC
        PlayerCommand::new("mpg123", &[]),
        PlayerCommand::new("play", &[]), // SoX
    ]
}

/// Plays a file with the first working external player.
pub struct Player {
    candidates: Vec<PlayerCommand>, // Tried in order
    wait_limit: Duration,           // Per-candidate bound
}

impl Default for Player {
    fn default() -> Self {
        Self::new(default_players(), PLAYER_TIMEOUT)
    }
}

impl Player {
    pub fn new(candidates: Vec<PlayerCommand>, wait_limit: Duration) -> Self {
        Self { candidates, wait_limit }
    }

    /// Program names of all candidates, for hints.
    pub fn candidate_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.program.as_str()).collect()
    }

    /// Play `path`, returning the candidate that succeeded.
    ///
    /// # Errors
    /// `FileNotFound` if `path` does not exist (no player is started),
    /// `NoPlayer` if every candidate failed.
    pub async fn play(&self, path: &Path) -> Result<&PlayerCommand, PlaybackError> {
        if !path.exists() {
            return Err(PlaybackError::FileNotFound(path.to_path_buf()));
        }

        for candidate in &self.candidates {
            match self.try_candidate(candidate, path).await {
                Ok(()) => return Ok(candidate),
                Err(e) => debug!("Player {} failed: {:#}", candidate.program, e),
            }
        }

        Err(PlaybackError::NoPlayer)
    }

    async fn try_candidate(&self, candidate: &PlayerCommand, path: &Path) -> Result<()> {
        let mut child = Command::new(&candidate.program)
            .args(&candidate.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        match timeout(self.wait_limit, child.wait()).await {
            Ok(status) => {
                let status = status?;
                if !status.success() {
                    anyhow::bail!("exited with {}", status);
                }
                Ok(())
            }
            Err(_) => {
                child.kill().await?;
                anyhow::bail!("timed out after {:?}", self.wait_limit)
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn audio_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("test.wav");
        std::fs::write(&path, b"RIFF").unwrap();
        path
    }

    #[tokio::test]
    async fn test_falls_through_to_working_player() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let player = Player::new(
            vec![
                PlayerCommand::new("definitely-not-an-audio-player", &[]),
                PlayerCommand::new("false", &[]),
                PlayerCommand::new("true", &[]),
            ],
            PLAYER_TIMEOUT,
        );

        let used = player.play(&path).await.unwrap();
        assert_eq!(used.program, "true");
    }

    #[tokio::test]
    async fn test_slow_player_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let player = Player::new(
            vec![PlayerCommand::new("sh", &["-c", "sleep 5", "sh"]), PlayerCommand::new("true", &[])],
            Duration::from_millis(200),
        );

        let used = player.play(&path).await.unwrap();
        assert_eq!(used.program, "true");
    }

    #[tokio::test]
    async fn test_all_players_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(&dir);
        let player = Player::new(vec![PlayerCommand::new("false", &[])], PLAYER_TIMEOUT);

        assert!(matches!(player.play(&path).await, Err(PlaybackError::NoPlayer)));
    }

    #[tokio::test]
    async fn test_missing_file_runs_no_player() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("player-ran");
        let missing = dir.path().join("missing.wav");
        let player = Player::new(vec![PlayerCommand::new("touch", &[marker.to_str().unwrap()])], PLAYER_TIMEOUT);

        let result = player.play(&missing).await;

        assert!(matches!(result, Err(PlaybackError::FileNotFound(ref p)) if p == &missing));
        assert!(!marker.exists());
    }

    #[test]
    fn test_default_player_order() {
        let player = Player::default();
        assert_eq!(player.candidate_names(), vec!["paplay", "aplay", "ffplay", "cvlc", "mpg123", "play"]);
    }
}
