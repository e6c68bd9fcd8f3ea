//! TCP client for a Wyoming server.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::debug;

use super::codec::WyomingCodec;
use super::error::ProtocolError;
use super::event::Event;

/// A single short-lived connection to a Wyoming server.
///
/// The connection is closed when the client is dropped.
pub struct WyomingClient {
    framed: Framed<TcpStream, WyomingCodec>, // Event-framed TCP stream
    peer: String,                            // "host:port" for messages
}

impl WyomingClient {
    /// Connect to `host:port`.
    ///
    /// # Errors
    /// Returns an error if the address cannot be resolved or the connection is refused.
    pub async fn connect(host: &str, port: u16) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        debug!("Connected to {}:{} ({})", host, port, stream.peer_addr()?);

        Ok(Self { framed: Framed::new(stream, WyomingCodec::default()), peer: format!("{}:{}", host, port) })
    }

    /// Send one event and flush it.
    pub async fn write_event(&mut self, event: Event) -> Result<(), ProtocolError> {
        debug!("→ {} ({} data keys)", event.event_type, event.data.len());
        self.framed.send(event).await
    }

    /// Read the next event, or `None` once the server has closed the connection.
    pub async fn read_event(&mut self) -> Result<Option<Event>, ProtocolError> {
        let event = self.framed.next().await.transpose()?;
        if let Some(ref event) = event {
            debug!("← {} (payload: {} bytes)", event.event_type, event.payload.as_ref().map_or(0, |p| p.len()));
        }
        Ok(event)
    }

    /// The `host:port` this client is connected to.
    pub fn peer(&self) -> &str {
        &self.peer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::testing::{closed_port, serve_once};
    use crate::protocol::Describe;

    #[tokio::test]
    async fn test_read_until_server_hangs_up() {
        let (port, server) = serve_once(vec![Event::audio_stop()]).await;

        let mut client = WyomingClient::connect("127.0.0.1", port).await.unwrap();
        assert_eq!(client.peer(), format!("127.0.0.1:{}", port));
        client.write_event(Describe.event()).await.unwrap();

        let event = client.read_event().await.unwrap().unwrap();
        assert_eq!(event.event_type, "audio-stop");
        assert!(client.read_event().await.unwrap().is_none());

        let request = server.await.unwrap().unwrap();
        assert_eq!(request.event_type, "describe");
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let port = closed_port().await;
        let result = WyomingClient::connect("127.0.0.1", port).await;
        assert!(matches!(result, Err(ProtocolError::Io(_))));
    }
}
