//! Server capability query.

use tracing::debug;

use crate::protocol::{Describe, Info, ProtocolError, ServerEvent, WyomingClient};

/// An installed voice advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub languages: Vec<String>,
    pub description: Option<String>,
    pub installed: bool,
}

/// Summary of the server's TTS capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub voices: Vec<Voice>,
}

impl From<&Info> for ServerInfo {
    /// Identity comes from the first TTS program; voices from all of them.
    fn from(info: &Info) -> Self {
        let program = info.tts.first();
        Self {
            name: program.map(|p| p.name.clone()).filter(|n| !n.is_empty()).unwrap_or_else(|| "unknown".to_string()),
            version: program.and_then(|p| p.version.clone()).unwrap_or_default(),
            description: program.and_then(|p| p.description.clone()).filter(|d| !d.is_empty()),
            voices: extract_voices(info),
        }
    }
}

/// Collect installed voices across every TTS program.
pub fn extract_voices(info: &Info) -> Vec<Voice> {
    info.tts
        .iter()
        .flat_map(|program| program.voices.iter())
        .filter(|voice| voice.installed)
        .map(|voice| Voice {
            name: voice.name.clone(),
            languages: voice.languages.clone(),
            description: voice.description.clone().filter(|d| !d.is_empty()),
            installed: voice.installed,
        })
        .collect()
}

/// Send `describe` and wait for the first `info` event.
///
/// Returns `None` if the server hangs up before answering.
pub async fn describe(client: &mut WyomingClient) -> Result<Option<ServerInfo>, ProtocolError> {
    client.write_event(Describe.event()).await?;

    while let Some(event) = client.read_event().await? {
        match ServerEvent::try_from(event)? {
            ServerEvent::Info(info) => return Ok(Some(ServerInfo::from(&info))),
            other => debug!("Ignoring event while waiting for info: {:?}", other),
        }
    }

    debug!("Connection closed before info arrived");
    Ok(None)
}

/// Connect to the server and fetch its info, reporting progress.
///
/// Failures are reported and turned into `None`; the caller decides whether to abort.
pub async fn get_server_info(host: &str, port: u16) -> Option<ServerInfo> {
    let mut client = match WyomingClient::connect(host, port).await {
        Ok(client) => client,
        Err(e) => {
            println!("✗ Failed to connect to {}:{}: {}", host, port, e);
            return None;
        }
    };
    println!("✓ Connected to {}", client.peer());

    match describe(&mut client).await {
        Ok(Some(info)) => Some(info),
        Ok(None) => {
            println!("✗ No server info received from {}", client.peer());
            None
        }
        Err(e) => {
            println!("✗ Failed to query {}: {}", client.peer(), e);
            None
        }
    }
}
