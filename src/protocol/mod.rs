//! Wyoming protocol client.
//!
//! Events are framed as one JSON header line, followed by an optional JSON data
//! block and an optional binary payload whose sizes are announced in the header.

mod client;
mod codec;
mod error;
mod event;
mod info;

pub use client::WyomingClient;
pub use error::ProtocolError;
pub use event::{AudioChunk, Describe, Event, ServerEvent, Synthesize};
pub use info::Info;

/// Helpers for running a scripted in-process server in tests.
#[cfg(test)]
pub(crate) mod testing {
    use futures::{SinkExt, StreamExt};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use tokio_util::codec::Framed;

    use super::Event;
    use super::codec::WyomingCodec;

    /// Accept one connection, read a single request, reply with `replies` and hang up.
    ///
    /// The join handle yields the request the client sent.
    pub async fn serve_once(replies: Vec<Event>) -> (u16, JoinHandle<Option<Event>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, WyomingCodec::default());
            let request = framed.next().await.and_then(Result::ok);
            for reply in replies {
                framed.send(reply).await.unwrap();
            }
            request
        });

        (port, handle)
    }

    /// Like [`serve_once`], but the reply is written as raw bytes before hanging up.
    pub async fn serve_raw(reply: Vec<u8>) -> (u16, JoinHandle<Option<Event>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut framed = Framed::new(stream, WyomingCodec::default());
            let request = framed.next().await.and_then(Result::ok);
            let stream = framed.get_mut();
            stream.write_all(&reply).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        (port, handle)
    }

    /// A port that nothing is listening on.
    pub async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }
}
