//! Server capability description returned for a `describe` request.
//!
//! Only the text-to-speech section is modelled; other capability lists
//! (asr, wake, intent, ...) are ignored on decode.

use serde::{Deserialize, Deserializer, Serialize};

/// Decoded `info` event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tts: Vec<TtsProgram>,
}

/// A text-to-speech program advertised by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsProgram {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub installed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub voices: Vec<TtsVoice>,
}

/// A voice offered by a TTS program.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsVoice {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub installed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
