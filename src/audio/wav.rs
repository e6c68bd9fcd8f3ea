//! WAV file output for raw PCM received from the server.

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

/// PCM format announced by the server's audio chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub rate: u32,     // Samples per second
    pub width: u16,    // Bytes per sample
    pub channels: u16, // Interleaved channels
}

impl AudioFormat {
    /// Bytes consumed by one second of audio.
    pub fn bytes_per_second(&self) -> u64 {
        u64::from(self.rate) * u64::from(self.width) * u64::from(self.channels)
    }

    /// Playback duration of `byte_len` bytes in this format.
    pub fn duration_secs(&self, byte_len: usize) -> f64 {
        match self.bytes_per_second() {
            0 => 0.0,
            bps => byte_len as f64 / bps as f64,
        }
    }

    /// Sample size in bits.
    pub fn bits_per_sample(&self) -> u16 {
        self.width * 8
    }

    fn spec(&self) -> Result<WavSpec> {
        if !(1..=4).contains(&self.width) {
            anyhow::bail!("Unsupported sample width: {} bytes", self.width);
        }
        if self.rate == 0 || self.channels == 0 {
            anyhow::bail!("Invalid audio format: {} Hz, {} channel(s)", self.rate, self.channels);
        }

        Ok(WavSpec {
            channels: self.channels,
            sample_rate: self.rate,
            bits_per_sample: self.bits_per_sample(),
            sample_format: SampleFormat::Int,
        })
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Hz, {}-bit, {} channel(s)", self.rate, self.bits_per_sample(), self.channels)
    }
}

/// Write little-endian PCM bytes to a WAV file at `path`.
///
/// The file carries exactly the rate, width and channel count of `format`.
/// A trailing partial frame (fewer bytes than one sample for every channel) is dropped.
///
/// # Errors
/// Returns an error for an unsupported format or if the file cannot be written.
pub fn write_wav(path: &Path, format: AudioFormat, audio: &[u8]) -> Result<()> {
    let spec = format.spec()?;
    let mut writer = WavWriter::create(path, spec).with_context(|| format!("Failed to create WAV file {}", path.display()))?;

    let width = usize::from(format.width);
    let frame = width * usize::from(format.channels);
    let whole = audio.len() - audio.len() % frame;
    for sample in audio[..whole].chunks_exact(width) {
        match *sample {
            // 8-bit WAV is unsigned; hound offsets signed samples by 128 on write
            [b] => writer.write_sample((b ^ 0x80) as i8)?,
            [lo, hi] => writer.write_sample(i16::from_le_bytes([lo, hi]))?,
            [b0, b1, b2] => {
                let sign = if b2 & 0x80 != 0 { 0xff } else { 0x00 };
                writer.write_sample(i32::from_le_bytes([b0, b1, b2, sign]))?
            }
            [b0, b1, b2, b3] => writer.write_sample(i32::from_le_bytes([b0, b1, b2, b3]))?,
            _ => unreachable!("sample width validated by spec()"),
        }
    }

    writer.finalize().with_context(|| format!("Failed to finalize WAV file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let format = AudioFormat { rate: 22050, width: 2, channels: 1 };
        assert_eq!(format.duration_secs(44100), 1.0);
        assert_eq!(format.to_string(), "22050Hz, 16-bit, 1 channel(s)");
    }

    #[test]
    fn test_write_16bit_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let format = AudioFormat { rate: 16000, width: 2, channels: 2 };
        let samples: [i16; 4] = [0, -1, i16::MAX, i16::MIN];
        let audio: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        write_wav(&path, format, &audio).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!((spec.sample_rate, spec.bits_per_sample, spec.channels), (16000, 16, 2));
        assert_eq!(reader.duration(), 2);
        let read: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn test_write_8bit_preserves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let audio = [0u8, 127, 128, 255];

        write_wav(&path, AudioFormat { rate: 8000, width: 1, channels: 1 }, &audio).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[bytes.len() - audio.len()..], &audio);
    }

    #[test]
    fn test_write_24bit_sign_extends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let audio = [0xff, 0xff, 0xff, 0x01, 0x00, 0x00];

        write_wav(&path, AudioFormat { rate: 48000, width: 3, channels: 1 }, &audio).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 24);
        let read: Vec<i32> = reader.samples::<i32>().map(Result::unwrap).collect();
        assert_eq!(read, vec![-1, 1]);
    }

    #[test]
    fn test_trailing_partial_sample_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        write_wav(&path, AudioFormat { rate: 16000, width: 2, channels: 1 }, &[1, 0, 2]).unwrap();

        assert_eq!(hound::WavReader::open(&path).unwrap().duration(), 1);
    }

    #[test]
    fn test_trailing_partial_frame_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        std::fs::write(&path, b"previous run").unwrap();
        let format = AudioFormat { rate: 16000, width: 2, channels: 2 };

        // Three 16-bit samples: one full stereo frame plus a lone left sample
        write_wav(&path, format, &[1, 0, 2, 0, 3, 0]).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), 1);
        let read: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(read, vec![1, 2]);
    }

    #[test]
    fn test_unsupported_width_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        assert!(write_wav(&path, AudioFormat { rate: 16000, width: 5, channels: 1 }, &[0; 10]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        assert!(write_wav(&path, AudioFormat { rate: 16000, width: 2, channels: 1 }, &[0, 0]).is_err());
    }
}
