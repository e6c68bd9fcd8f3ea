//! Human-readable progress output.

use crate::tts::{ServerInfo, Voice};

/// Width of the banner rule.
const RULE_WIDTH: usize = 60;

/// Voices listed before the remainder is summarized.
const MAX_LISTED_VOICES: usize = 5;

/// Print the start-up banner.
pub fn banner() {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("     Wyoming Piper Voice Test");
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Print server identity and the installed voices.
pub fn server_info(info: &ServerInfo) {
    if info.version.is_empty() {
        println!("📋 Server: {}", info.name);
    } else {
        println!("📋 Server: {} v{}", info.name, info.version);
    }
    if let Some(ref description) = info.description {
        println!("   {}", description);
    }

    if info.voices.is_empty() {
        println!("\n⚠️  No voices reported by server");
        return;
    }

    println!("\n🎤 Available voices ({}):", info.voices.len());
    for line in voice_lines(&info.voices) {
        println!("   {}", line);
    }
}

/// Listing lines for `voices`, truncated to the first few.
fn voice_lines(voices: &[Voice]) -> Vec<String> {
    let mut lines: Vec<String> = voices.iter().take(MAX_LISTED_VOICES).map(format_voice).collect();
    if voices.len() > MAX_LISTED_VOICES {
        lines.push(format!("... and {} more", voices.len() - MAX_LISTED_VOICES));
    }
    lines
}

fn format_voice(voice: &Voice) -> String {
    let languages = if voice.languages.is_empty() { "unknown".to_string() } else { voice.languages.join(", ") };
    match voice.description {
        Some(ref description) => format!("• {} ({}) - {}", voice.name, languages, description),
        None => format!("• {} ({})", voice.name, languages),
    }
}
