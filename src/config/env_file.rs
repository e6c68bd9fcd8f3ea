//! Optional local `KEY=VALUE` file (usually `.env`).

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

/// Key naming the voice the server was deployed with.
pub const VOICE_KEY: &str = "PIPER_VOICE";

/// Read `path` into a key/value map without touching the process environment.
///
/// A missing file yields an empty map. Comment lines, blank lines and lines that
/// do not parse as `KEY=VALUE` are skipped. Values follow dotenv rules: surrounding
/// quotes are removed and `$NAME`/`${NAME}` are expanded (process environment first,
/// then earlier keys in the file), except inside single quotes.
pub fn load_env_file(path: &Path) -> HashMap<String, String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => {
            debug!("No env file at {}", path.display());
            return HashMap::new();
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
            Err(e) => {
                debug!("Skipping line in {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}
