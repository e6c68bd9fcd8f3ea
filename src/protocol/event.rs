//! Wyoming events and the typed messages carried by them.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ProtocolError;
use super::info::Info;

/// Protocol version announced on outgoing events.
pub const PROTOCOL_VERSION: &str = "1.5.2";

const TYPE_DESCRIBE: &str = "describe";
const TYPE_INFO: &str = "info";
const TYPE_SYNTHESIZE: &str = "synthesize";
const TYPE_AUDIO_START: &str = "audio-start";
const TYPE_AUDIO_CHUNK: &str = "audio-chunk";
const TYPE_AUDIO_STOP: &str = "audio-stop";

/// A raw protocol event: type tag, JSON data and optional binary payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    pub event_type: String,
    pub data: Map<String, Value>,
    pub payload: Option<Bytes>,
}

impl Event {
    /// Create an event with no data and no payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self { event_type: event_type.into(), ..Default::default() }
    }

    /// Attach JSON data. Non-object values are ignored.
    pub fn with_data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.data = map;
        }
        self
    }

    fn decode_data<T: for<'de> Deserialize<'de>>(&self) -> Result<T, ProtocolError> {
        serde_json::from_value(Value::Object(self.data.clone()))
            .map_err(|source| ProtocolError::InvalidEvent { event_type: self.event_type.clone(), source })
    }
}

/// Request for the server's capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Describe;

impl Describe {
    pub fn event(&self) -> Event {
        Event::new(TYPE_DESCRIBE)
    }
}

/// Voice selector for a synthesis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizeVoice {
    pub name: String,
}

/// Request to synthesize `text`, optionally with a specific voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synthesize {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<SynthesizeVoice>,
}

impl Synthesize {
    pub fn new(text: impl Into<String>, voice: Option<&str>) -> Self {
        Self { text: text.into(), voice: voice.map(|name| SynthesizeVoice { name: name.to_string() }) }
    }

    pub fn event(&self) -> Result<Event, ProtocolError> {
        Ok(Event::new(TYPE_SYNTHESIZE).with_data(serde_json::to_value(self)?))
    }
}

/// Format metadata of an audio chunk; the samples travel in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct AudioChunkData {
    rate: u32,
    width: u16,
    channels: u16,
}

/// One unit of streamed audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub rate: u32,     // Sample rate (Hz)
    pub width: u16,    // Bytes per sample
    pub channels: u16, // Interleaved channel count
    pub audio: Bytes,  // Raw PCM samples
}

/// Events a client can receive, keyed by their type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Info(Info),
    AudioStart,
    AudioChunk(AudioChunk),
    AudioStop,
    Other(String),
}

impl TryFrom<Event> for ServerEvent {
    type Error = ProtocolError;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        let decoded = match event.event_type.as_str() {
            TYPE_INFO => ServerEvent::Info(event.decode_data()?),
            TYPE_AUDIO_START => ServerEvent::AudioStart,
            TYPE_AUDIO_STOP => ServerEvent::AudioStop,
            TYPE_AUDIO_CHUNK => {
                let AudioChunkData { rate, width, channels } = event.decode_data()?;
                ServerEvent::AudioChunk(AudioChunk { rate, width, channels, audio: event.payload.unwrap_or_default() })
            }
            _ => ServerEvent::Other(event.event_type),
        };
        Ok(decoded)
    }
}

/// Builders for server-side events, used by the test server.
#[cfg(test)]
impl Event {
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn info(data: Value) -> Self {
        Event::new(TYPE_INFO).with_data(data)
    }

    pub fn audio_start(rate: u32, width: u16, channels: u16) -> Self {
        Event::new(TYPE_AUDIO_START).with_data(serde_json::json!({ "rate": rate, "width": width, "channels": channels }))
    }

    pub fn audio_chunk(rate: u32, width: u16, channels: u16, audio: Vec<u8>) -> Self {
        Event::new(TYPE_AUDIO_CHUNK)
            .with_data(serde_json::json!({ "rate": rate, "width": width, "channels": channels, "timestamp": null }))
            .with_payload(audio)
    }

    pub fn audio_stop() -> Self {
        Event::new(TYPE_AUDIO_STOP)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_synthesize_with_voice() {
        let event = Synthesize::new("Hello", Some("joe")).event().unwrap();
        assert_eq!(event.event_type, "synthesize");
        assert_eq!(Value::Object(event.data), json!({ "text": "Hello", "voice": { "name": "joe" } }));
    }

    #[test]
    fn test_synthesize_without_voice_omits_selector() {
        let event = Synthesize::new("Hello", None).event().unwrap();
        assert!(!event.data.contains_key("voice"));
    }

    #[test]
    fn test_audio_chunk_takes_payload() {
        let event = Event::audio_chunk(22050, 2, 1, vec![1, 2, 3, 4]);
        match ServerEvent::try_from(event).unwrap() {
            ServerEvent::AudioChunk(chunk) => {
                assert_eq!((chunk.rate, chunk.width, chunk.channels), (22050, 2, 1));
                assert_eq!(chunk.audio.as_ref(), &[1, 2, 3, 4]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_audio_chunk_missing_format_is_rejected() {
        let event = Event::new("audio-chunk").with_data(json!({ "rate": 22050 }));
        let err = ServerEvent::try_from(event).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidEvent { ref event_type, .. } if event_type == "audio-chunk"));
    }

    #[test]
    fn test_unknown_event_is_other() {
        let event = Event::new("transcript");
        assert_eq!(ServerEvent::try_from(event).unwrap(), ServerEvent::Other("transcript".to_string()));
    }
}
