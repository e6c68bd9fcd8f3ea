//! Text-to-speech synthesis over a Wyoming connection.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, warn};

use crate::audio::{AudioFormat, write_wav};
use crate::protocol::{AudioChunk, ProtocolError, ServerEvent, Synthesize, WyomingClient};

/// Why a synthesis attempt produced no audio.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Connection lost during synthesis")]
    ConnectionLost,

    #[error("Server returned no audio")]
    NoAudio,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Audio accumulated from one synthesis response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub format: AudioFormat, // Taken from the first chunk
    pub audio: Vec<u8>,      // Concatenated chunk payloads
    pub chunk_count: usize,  // Audio chunks received
}

impl SynthesizedAudio {
    /// Playback length of the accumulated audio.
    pub fn duration_secs(&self) -> f64 {
        self.format.duration_secs(self.audio.len())
    }
}

/// Accumulates audio chunks; the first chunk fixes the format.
#[derive(Debug, Default)]
struct ChunkCollector {
    format: Option<AudioFormat>,
    audio: Vec<u8>,
    chunk_count: usize,
}

impl ChunkCollector {
    /// Append a chunk, returning the format if this chunk established it.
    fn push(&mut self, chunk: AudioChunk) -> Option<AudioFormat> {
        let format = AudioFormat { rate: chunk.rate, width: chunk.width, channels: chunk.channels };
        self.chunk_count += 1;
        self.audio.extend_from_slice(&chunk.audio);

        match self.format {
            None => {
                self.format = Some(format);
                Some(format)
            }
            Some(first) => {
                if first != format {
                    warn!("Chunk {} format {} differs from first chunk {}; keeping the first", self.chunk_count, format, first);
                }
                None
            }
        }
    }

    fn finish(self) -> Result<SynthesizedAudio, SynthesisError> {
        match self.format {
            Some(format) if !self.audio.is_empty() => {
                Ok(SynthesizedAudio { format, audio: self.audio, chunk_count: self.chunk_count })
            }
            _ => Err(SynthesisError::NoAudio),
        }
    }
}

/// Request synthesis of `text` and drain the audio stream until `audio-stop`.
///
/// # Errors
/// `ConnectionLost` if the server hangs up before `audio-stop` (partial audio is dropped),
/// `NoAudio` if the stream ended without any samples, or a protocol error.
pub async fn receive_audio(client: &mut WyomingClient, text: &str, voice: Option<&str>) -> Result<SynthesizedAudio, SynthesisError> {
    client.write_event(Synthesize::new(text, voice).event()?).await?;

    let mut collector = ChunkCollector::default();
    print!("📥 Receiving audio data... ");
    flush_stdout();

    loop {
        let Some(event) = client.read_event().await? else {
            println!();
            return Err(SynthesisError::ConnectionLost);
        };

        match ServerEvent::try_from(event)? {
            ServerEvent::AudioStop => {
                println!("\n✓ Received {} audio chunks", collector.chunk_count);
                break;
            }
            ServerEvent::AudioChunk(chunk) => {
                if let Some(format) = collector.push(chunk) {
                    println!("\n📊 Audio format: {}", format);
                }
                print!(".");
                flush_stdout();
            }
            other => debug!("Ignoring event during synthesis: {:?}", other),
        }
    }

    collector.finish()
}

/// Synthesize `text` and save it to `output`, reporting progress.
///
/// Returns `Ok(false)` for connection and synthesis failures, which are reported here.
/// The output file is only written once the full stream has arrived.
///
/// # Errors
/// Returns an error if the WAV file cannot be written.
pub async fn synthesize_to_wav(host: &str, port: u16, text: &str, output: &Path, voice: Option<&str>) -> Result<bool> {
    let mut client = match WyomingClient::connect(host, port).await {
        Ok(client) => client,
        Err(e) => {
            println!("✗ Synthesis failed: {}", e);
            return Ok(false);
        }
    };

    println!("🎵 Synthesizing: \"{}\"", text);
    if let Some(voice) = voice {
        println!("🎤 Using voice: {}", voice);
    }

    let synthesized = match receive_audio(&mut client, text, voice).await {
        Ok(synthesized) => synthesized,
        Err(SynthesisError::ConnectionLost) => {
            println!("✗ Connection lost during synthesis");
            return Ok(false);
        }
        Err(e) => {
            println!("✗ Synthesis failed: {}", e);
            return Ok(false);
        }
    };
    drop(client);
    debug!("Synthesized {} chunks, {} bytes of {}", synthesized.chunk_count, synthesized.audio.len(), synthesized.format);

    write_wav(output, synthesized.format, &synthesized.audio)?;

    println!("💾 Audio saved to: {}", output.display());
    println!("📏 Duration: {:.1}s, Size: {} bytes", synthesized.duration_secs(), group_thousands(synthesized.audio.len()));
    Ok(true)
}

fn flush_stdout() {
    if let Err(e) = std::io::stdout().flush() {
        debug!("Failed to flush stdout: {}", e);
    }
}

/// Format a count with comma thousands separators.
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
