//! Framing codec for Wyoming events.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

use super::error::ProtocolError;
use super::event::{Event, PROTOCOL_VERSION};

/// Upper bound for a single header line.
const MAX_HEADER_LEN: usize = 64 * 1024;

/// Upper bound for the data block plus payload announced by one header.
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// JSON header line preceding every event.
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload_length: Option<usize>,
}

/// Stateful decoder/encoder for Wyoming events.
///
/// A header that announces more bytes than are buffered is kept until
/// the rest of the frame arrives.
#[derive(Debug, Default)]
pub struct WyomingCodec {
    pending: Option<Header>,
}

impl WyomingCodec {
    fn decode_header(src: &mut BytesMut) -> Result<Option<Header>, ProtocolError> {
        loop {
            let Some(newline) = src.iter().position(|b| *b == b'\n') else {
                if src.len() > MAX_HEADER_LEN {
                    return Err(ProtocolError::HeaderTooLong { limit: MAX_HEADER_LEN });
                }
                return Ok(None);
            };
            if newline > MAX_HEADER_LEN {
                return Err(ProtocolError::HeaderTooLong { limit: MAX_HEADER_LEN });
            }

            let line = src.split_to(newline + 1);
            let line = line[..newline].trim_ascii();
            if line.is_empty() {
                continue;
            }
            return Ok(Some(serde_json::from_slice(line)?));
        }
    }
}

impl Decoder for WyomingCodec {
    type Item = Event;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Event>, ProtocolError> {
        let header = match self.pending.take() {
            Some(header) => header,
            None => match Self::decode_header(src)? {
                Some(header) => header,
                None => return Ok(None),
            },
        };

        let data_len = header.data_length.unwrap_or(0);
        let payload_len = header.payload_length.unwrap_or(0);
        let frame_len = data_len
            .checked_add(payload_len)
            .filter(|len| *len <= MAX_FRAME_LEN)
            .ok_or(ProtocolError::FrameTooLong { limit: MAX_FRAME_LEN })?;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            self.pending = Some(header);
            return Ok(None);
        }

        let mut data = header.data.unwrap_or_default();
        if data_len > 0 {
            let extra: Map<String, Value> = serde_json::from_slice(&src.split_to(data_len))?;
            data.extend(extra);
        }
        let payload = (payload_len > 0).then(|| src.split_to(payload_len).freeze());

        Ok(Some(Event { event_type: header.event_type, data, payload }))
    }

    /// A frame cut short by the peer hanging up ends the stream like a clean close.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Event>, ProtocolError> {
        if let Some(event) = self.decode(src)? {
            return Ok(Some(event));
        }
        if !src.is_empty() || self.pending.is_some() {
            debug!("Discarding incomplete frame ({} bytes buffered)", src.len());
            src.clear();
            self.pending = None;
        }
        Ok(None)
    }
}

impl Encoder<Event> for WyomingCodec {
    type Error = ProtocolError;

    fn encode(&mut self, event: Event, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let payload = event.payload.filter(|p| !p.is_empty()).unwrap_or_else(Bytes::new);
        let header = Header {
            event_type: event.event_type,
            version: Some(PROTOCOL_VERSION.to_string()),
            data: (!event.data.is_empty()).then_some(event.data),
            data_length: None,
            payload_length: (!payload.is_empty()).then_some(payload.len()),
        };

        let line = serde_json::to_vec(&header)?;
        dst.reserve(line.len() + 1 + payload.len());
        dst.extend_from_slice(&line);
        dst.put_u8(b'\n');
        dst.extend_from_slice(&payload);
        Ok(())
    }
}
