//! Text-to-speech client steps: capability query and synthesis.

mod info;
mod synthesizer;

pub use info::{ServerInfo, Voice, get_server_info};
pub use synthesizer::synthesize_to_wav;
