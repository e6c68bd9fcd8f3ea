//! Audio output: WAV files and external playback.

mod playback;
mod wav;

pub use playback::{PlaybackError, Player};
pub use wav::{AudioFormat, write_wav};
